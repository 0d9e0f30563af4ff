//! Source file scanner for discovering controller files.
//!
//! Recursively scans the source root for TypeScript files matching the
//! configured glob patterns, respecting `.gitignore`. A missing root is
//! fatal; an empty result is not (zero controllers is a valid outcome).

use crate::error::{CliResult, ScanError};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// A discovered source file with its content.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path to the file.
    pub path: PathBuf,

    /// Path relative to the scan root.
    pub relative_path: PathBuf,

    /// File content.
    pub content: String,
}

/// Scanner for discovering controller source files.
#[derive(Debug)]
pub struct SourceScanner {
    /// Root directory to scan.
    root: PathBuf,

    /// Whether to respect .gitignore files.
    respect_gitignore: bool,

    /// Glob patterns selecting files under the root.
    patterns: Vec<glob::Pattern>,
}

impl SourceScanner {
    /// Create a scanner over the given root with the given glob patterns.
    pub fn new(root: impl Into<PathBuf>, globs: &[String]) -> Result<Self, ScanError> {
        let mut patterns = Vec::with_capacity(globs.len());
        for raw in globs {
            let pattern = glob::Pattern::new(raw)
                .map_err(|e| ScanError::invalid_pattern(raw, e.to_string()))?;
            patterns.push(pattern);
        }
        Ok(Self {
            root: root.into(),
            respect_gitignore: true,
            patterns,
        })
    }

    /// Set whether to respect .gitignore files.
    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Scan the root and return all matching TypeScript files.
    pub fn scan(&self) -> CliResult<Vec<SourceFile>> {
        if !self.root.exists() {
            return Err(ScanError::not_found(self.root.clone()).into());
        }

        let walker = WalkBuilder::new(&self.root)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .hidden(false)
            .sort_by_file_path(|a, b| a.cmp(b))
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(ScanError::Walk)?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            if path.extension().map_or(true, |ext| ext != "ts") {
                continue;
            }

            let relative = self.relative_path(path);
            if !self.patterns.iter().any(|p| p.matches_path(&relative)) {
                continue;
            }

            let content = std::fs::read_to_string(path).map_err(|e| ScanError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

            files.push(SourceFile {
                path: path.to_path_buf(),
                relative_path: relative,
                content,
            });
        }

        if files.is_empty() {
            return Err(ScanError::no_controller_files(self.root.clone()).into());
        }

        Ok(files)
    }

    /// Scan without failing on empty results.
    ///
    /// Returns an empty vector if no files match; a missing root still fails.
    pub fn scan_allow_empty(&self) -> CliResult<Vec<SourceFile>> {
        match self.scan() {
            Ok(files) => Ok(files),
            Err(crate::error::CliError::Scan(ScanError::NoControllerFiles { .. })) => {
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Read a single designated file under the root, if it exists.
    ///
    /// Used for the shared constants file; its absence triggers the
    /// documented prefix fallback, never a failure.
    pub fn read_file(&self, relative: &Path) -> Option<SourceFile> {
        let path = self.root.join(relative);
        let content = std::fs::read_to_string(&path).ok()?;
        Some(SourceFile {
            path,
            relative_path: relative.to_path_buf(),
            content,
        })
    }

    /// Get the relative path from root.
    fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
