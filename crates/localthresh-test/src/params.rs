//! Regression checks and golden-file bookkeeping

use crate::error::{TestError, TestResult};
use crate::{golden_dir, regout_dir};
use localthresh_core::{ImageFormat, Pix};
use std::fs;
use std::path::{Path, PathBuf};

/// How `write_pix_and_check` treats golden files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Overwrite golden files with the current outputs
    Generate,
    /// Compare outputs against existing golden files
    #[default]
    Compare,
    /// Only write outputs, for inspection by eye
    Display,
}

impl RegTestMode {
    /// Mode named by `REGTEST_MODE`, defaulting to `Compare`
    pub fn from_env() -> Self {
        std::env::var("REGTEST_MODE")
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }

    /// Case-insensitive; unrecognized names mean `Compare`
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("generate") {
            Self::Generate
        } else if s.eq_ignore_ascii_case("display") {
            Self::Display
        } else {
            Self::Compare
        }
    }
}

/// State of one regression test
///
/// Every check advances a counter, so each output file and each failure
/// message can be traced back to the check that produced it.
pub struct RegParams {
    pub test_name: String,
    pub mode: RegTestMode,
    index: usize,
    failures: Vec<String>,
}

impl RegParams {
    /// Start a regression test, creating the golden and regout directories
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();
        for dir in [golden_dir(), regout_dir()] {
            if let Err(e) = fs::create_dir_all(&dir) {
                eprintln!("{test_name}_reg: cannot create {dir}: {e}");
            }
        }
        eprintln!("==== {test_name}_reg ({mode:?}) ====");

        Self {
            test_name: test_name.to_string(),
            mode,
            index: 0,
            failures: Vec::new(),
        }
    }

    /// Number of checks run so far
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn next_index(&mut self) -> usize {
        self.index += 1;
        self.index
    }

    fn fail(&mut self, what: String) {
        let msg = format!("{}_reg check {}: {}", self.test_name, self.index, what);
        eprintln!("FAIL {msg}");
        self.failures.push(msg);
    }

    /// Check that `actual` is within `delta` of `expected`
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.next_index();
        let diff = (expected - actual).abs();
        // NaN never passes
        if diff <= delta {
            return true;
        }
        self.fail(format!(
            "expected {expected}, got {actual} (difference {diff}, allowed {delta})"
        ));
        false
    }

    /// Check a boolean property
    pub fn check(&mut self, condition: bool) -> bool {
        self.compare_values(1.0, f64::from(u8::from(condition)), 0.0)
    }

    /// Check that two images have the same size, depth and pixels
    pub fn compare_pix(&mut self, pix1: &Pix, pix2: &Pix) -> bool {
        self.next_index();

        if !pix1.sizes_equal(pix2) {
            self.fail(format!(
                "image {}x{} @ {} bpp differs in shape from {}x{} @ {} bpp",
                pix1.width(),
                pix1.height(),
                pix1.depth().bits(),
                pix2.width(),
                pix2.height(),
                pix2.depth().bits()
            ));
            return false;
        }

        let width = pix1.width() as usize;
        let mismatch = pix1
            .data()
            .iter()
            .zip(pix2.data())
            .position(|(a, b)| a != b);
        match mismatch {
            None => true,
            Some(pos) => {
                self.fail(format!(
                    "first pixel mismatch at ({}, {})",
                    pos % width,
                    pos / width
                ));
                false
            }
        }
    }

    /// Write `pix` to the regout directory, then handle its golden copy
    ///
    /// - `Generate`: the output becomes the golden file.
    /// - `Compare`: the output must match the golden file pixel for pixel.
    ///   A missing golden file is reported and skipped.
    /// - `Display`: nothing beyond writing the output.
    pub fn write_pix_and_check(&mut self, pix: &Pix, format: ImageFormat) -> TestResult<()> {
        let index = self.next_index();
        let name = format!("{}.{:02}.{}", self.test_name, index, format.extension());
        let local = PathBuf::from(regout_dir()).join(&name);
        let golden = PathBuf::from(golden_dir()).join(format!(
            "{}_golden.{:02}.{}",
            self.test_name,
            index,
            format.extension()
        ));

        localthresh_io::write_image(pix, &local, format).map_err(|e| TestError::ImageWrite {
            path: local.display().to_string(),
            message: e.to_string(),
        })?;

        match self.mode {
            RegTestMode::Generate => {
                fs::copy(&local, &golden)?;
                eprintln!("generated {}", golden.display());
            }
            RegTestMode::Compare if !golden.exists() => {
                eprintln!(
                    "{}_reg check {index}: no golden file {}, skipped",
                    self.test_name,
                    golden.display()
                );
            }
            RegTestMode::Compare => {
                if !same_image(&local, &golden)? {
                    self.fail(format!(
                        "{} does not match {}",
                        local.display(),
                        golden.display()
                    ));
                }
            }
            RegTestMode::Display => {}
        }
        Ok(())
    }

    /// Report the outcome; `true` if every check passed
    pub fn cleanup(self) -> bool {
        if self.failures.is_empty() {
            eprintln!("PASS {}_reg ({} checks)", self.test_name, self.index);
            return true;
        }
        eprintln!(
            "FAILED {}_reg: {} of {} checks",
            self.test_name,
            self.failures.len(),
            self.index
        );
        for failure in &self.failures {
            eprintln!("  {failure}");
        }
        false
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

/// Byte-identical files match; otherwise decode both and compare pixels
fn same_image(a: &Path, b: &Path) -> TestResult<bool> {
    if fs::read(a)? == fs::read(b)? {
        return Ok(true);
    }
    Ok(
        match (localthresh_io::read_image(a), localthresh_io::read_image(b)) {
            (Ok(p), Ok(q)) => p.sizes_equal(&q) && p.data() == q.data(),
            _ => false,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use localthresh_core::PixelDepth;

    #[test]
    fn test_mode_parse() {
        assert_eq!(RegTestMode::parse("GENERATE"), RegTestMode::Generate);
        assert_eq!(RegTestMode::parse("display"), RegTestMode::Display);
        assert_eq!(RegTestMode::parse(""), RegTestMode::Compare);
        assert_eq!(RegTestMode::parse("bogus"), RegTestMode::Compare);
    }

    #[test]
    fn test_compare_values_within_delta() {
        let mut rp = RegParams::new("params_values");
        assert!(rp.compare_values(100.0, 100.0, 0.0));
        assert!(rp.compare_values(100.0, 100.5, 1.0));
        assert!(rp.is_success());
        assert_eq!(rp.index(), 2);
    }

    #[test]
    fn test_failures_are_recorded() {
        let mut rp = RegParams::new("params_failures");
        assert!(!rp.compare_values(100.0, 200.0, 0.0));
        assert!(!rp.compare_values(0.0, f64::NAN, 1.0));
        assert!(!rp.check(false));
        assert!(!rp.is_success());
        assert_eq!(rp.failures().len(), 3);
        assert!(rp.failures()[2].contains("check 3"));
        assert!(!rp.cleanup());
    }

    #[test]
    fn test_compare_pix() {
        let mut rp = RegParams::new("params_pix");
        let a = Pix::from_raw(2, 2, PixelDepth::Bit1, vec![0, 1, 1, 0]).unwrap();
        let b = Pix::from_raw(2, 2, PixelDepth::Bit1, vec![0, 1, 1, 1]).unwrap();
        let c = Pix::from_raw(4, 1, PixelDepth::Bit1, vec![0, 1, 1, 0]).unwrap();
        assert!(rp.compare_pix(&a, &a.clone()));
        assert!(!rp.compare_pix(&a, &b));
        assert!(rp.failures()[0].contains("(1, 1)"));
        assert!(!rp.compare_pix(&a, &c));
    }
}
