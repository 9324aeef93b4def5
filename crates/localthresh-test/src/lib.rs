//! localthresh-test - Regression harness shared by the workspace's `*_reg` tests
//!
//! `REGTEST_MODE` selects how image outputs are treated:
//!
//! - `generate`: outputs are copied into `tests/golden`
//! - `compare` (default): outputs must match their golden copies
//! - `display`: outputs are only written to `tests/regout`
//!
//! # Usage
//!
//! ```ignore
//! use localthresh_test::RegParams;
//!
//! let mut rp = RegParams::new("kernel");
//! rp.compare_values(1.0, table.weight(7, 7), 0.0);
//! assert!(rp.cleanup());
//! ```

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // localthresh-test is at crates/localthresh-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the golden files directory
pub fn golden_dir() -> String {
    format!("{}/tests/golden", workspace_root())
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
