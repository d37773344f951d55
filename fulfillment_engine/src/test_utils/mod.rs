//! Helpers for setting up throwaway databases in tests.
//!
//! These are compiled into the library (rather than behind `cfg(test)`) so that integration tests and the server's
//! tests can share them.
pub mod fixtures;
pub mod prepare_env;
