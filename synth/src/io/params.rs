//! Validated invocation parameters.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use rand::{Rng, distributions::Alphanumeric};

/// Validated run input. Built once at startup, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunParams {
    pub input_test_file: PathBuf,
    pub output_directory: PathBuf,
}

impl RunParams {
    /// Sanitize raw arguments.
    ///
    /// The test file must exist and be readable; the output directory is
    /// created when missing. Without an output argument a fresh uniquely-named
    /// directory under the system temp dir is used.
    pub fn build(test_file: &Path, output_dir: Option<&Path>) -> Result<Self> {
        if !test_file.is_file() {
            bail!("test file {} does not exist", test_file.display());
        }
        fs::File::open(test_file)
            .with_context(|| format!("open test file {}", test_file.display()))?;

        let output_directory = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => default_output_directory(),
        };
        fs::create_dir_all(&output_directory).with_context(|| {
            format!("create output directory {}", output_directory.display())
        })?;

        Ok(Self {
            input_test_file: test_file.to_path_buf(),
            output_directory,
        })
    }

    /// File name of the input test file (e.g. `adder_test.rs`).
    pub fn test_file_name(&self) -> String {
        self.input_test_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Stem of the input test file, used to key compiled artifacts.
    pub fn test_stem(&self) -> String {
        self.input_test_file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn default_output_directory() -> PathBuf {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    std::env::temp_dir().join(format!("synth_{timestamp}_{}", generate_short_id()))
}

fn generate_short_id() -> String {
    let mut rng = rand::thread_rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .map(char::from)
        .take(6)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_rejects_a_missing_test_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = RunParams::build(&temp.path().join("absent_test.rs"), None).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn build_creates_the_output_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let test_file = temp.path().join("adder_test.rs");
        fs::write(&test_file, "mod adder;\n").expect("write");

        let out = temp.path().join("nested").join("out");
        let params = RunParams::build(&test_file, Some(&out)).expect("params");
        assert!(out.is_dir());
        assert_eq!(params.output_directory, out);
    }

    #[test]
    fn build_defaults_to_a_fresh_temp_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let test_file = temp.path().join("adder_test.rs");
        fs::write(&test_file, "mod adder;\n").expect("write");

        let params = RunParams::build(&test_file, None).expect("params");
        assert!(params.output_directory.is_dir());
        assert!(params.output_directory.starts_with(std::env::temp_dir()));
        fs::remove_dir_all(&params.output_directory).expect("cleanup");
    }

    #[test]
    fn exposes_test_file_name_and_stem() {
        let temp = tempfile::tempdir().expect("tempdir");
        let test_file = temp.path().join("adder_test.rs");
        fs::write(&test_file, "mod adder;\n").expect("write");

        let params = RunParams::build(&test_file, Some(&temp.path().join("out"))).expect("params");
        assert_eq!(params.test_file_name(), "adder_test.rs");
        assert_eq!(params.test_stem(), "adder_test");
    }
}
