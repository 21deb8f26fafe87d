//! Candidate solutions produced by the generation backend.

use std::path::PathBuf;

/// One generated solution for a single outer attempt.
///
/// The next attempt's candidate supersedes this one wholesale; candidates are
/// never merged across attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// File name the solution is written under (e.g. `adder.rs`).
    pub file_name: String,
    /// `::`-separated namespace mapped to directories under the output root.
    /// Empty means the output root itself.
    pub package: String,
    /// Complete source text of the solution module.
    pub content: String,
    /// Retries the backend spent internally to produce this candidate.
    /// Independent of the outer loop's attempt counter.
    pub backend_attempts: u32,
}

impl Candidate {
    /// Map the package namespace to a relative directory path (`a::b` -> `a/b`).
    pub fn package_path(&self) -> PathBuf {
        if self.package.is_empty() {
            return PathBuf::new();
        }
        self.package.split("::").collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(package: &str) -> Candidate {
        Candidate {
            file_name: "adder.rs".to_string(),
            package: package.to_string(),
            content: String::new(),
            backend_attempts: 1,
        }
    }

    #[test]
    fn empty_package_maps_to_output_root() {
        assert_eq!(candidate("").package_path(), PathBuf::new());
    }

    #[test]
    fn single_segment_package_maps_to_one_directory() {
        assert_eq!(candidate("adder").package_path(), PathBuf::from("adder"));
    }

    #[test]
    fn nested_package_maps_to_nested_directories() {
        assert_eq!(
            candidate("math::adder").package_path(),
            PathBuf::from("math/adder")
        );
    }
}
