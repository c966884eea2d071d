//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the rail core against
//! the recording mock in `mock_hw`. No board or chip is required.

mod layout_tests;
mod mock_hw;
mod scenario_tests;
