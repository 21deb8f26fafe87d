//! Candidate persistence under the output directory.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::candidate::Candidate;
use crate::io::params::RunParams;

/// Paths written for one attempt. Later attempts overwrite them in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCandidate {
    pub solution_path: PathBuf,
    pub test_path: PathBuf,
}

/// Write the candidate source and copy the input test file next to it.
///
/// Layout: `output/<package-path>/<file_name>` for the candidate and
/// `output/<package-path>/<test file name>` for the test copy, both
/// overwriting any prior attempt's files.
pub fn persist_candidate(params: &RunParams, candidate: &Candidate) -> Result<PersistedCandidate> {
    let package_dir = params.output_directory.join(candidate.package_path());
    fs::create_dir_all(&package_dir)
        .with_context(|| format!("create package directory {}", package_dir.display()))?;

    let solution_path = package_dir.join(&candidate.file_name);
    fs::write(&solution_path, &candidate.content)
        .with_context(|| format!("write candidate {}", solution_path.display()))?;

    let test_path = package_dir.join(params.test_file_name());
    fs::copy(&params.input_test_file, &test_path)
        .with_context(|| format!("copy test file to {}", test_path.display()))?;

    Ok(PersistedCandidate {
        solution_path,
        test_path,
    })
}
