//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against a mock transport or a temporary directory. All tests run on the
//! host (x86_64) with no network or hardware required.

mod codec_tests;
mod correlation_tests;
mod dispatch_tests;
mod envelope_tests;
mod mock_transport;
mod storage_tests;
