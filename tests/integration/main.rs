//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that runs whole vessel sessions against
//! the simulation adapter in virtual time.  All tests run on the host with
//! no real hardware required.  Needs the `sim` feature (on by default).

#![cfg(feature = "sim")]

mod rig;
mod pump_tests;
mod sessions_tests;
