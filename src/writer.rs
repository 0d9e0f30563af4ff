//! Output directory synchronizer.
//!
//! Owns the generated directory wholesale: every run clears the previous
//! contents and writes the fresh file set, so stale clients from renamed
//! or deleted controllers never survive. Supports dry-run mode, where the
//! planned file set is reported without touching the filesystem.

use crate::error::{CliResult, WriteError};
use crate::model::GeneratedFile;
use std::path::{Path, PathBuf};

/// Result of synchronizing one generated file.
#[derive(Debug)]
pub enum SyncResult {
    /// File was written successfully.
    Written {
        /// Path to the written file.
        path: PathBuf,
        /// Number of bytes written.
        bytes: usize,
    },
    /// Dry run, content was not written.
    DryRun {
        /// Path where content would have been written.
        path: PathBuf,
        /// Content that would have been written.
        content: String,
    },
}

impl SyncResult {
    /// Get the path associated with this result.
    pub fn path(&self) -> &Path {
        match self {
            SyncResult::Written { path, .. } => path,
            SyncResult::DryRun { path, .. } => path,
        }
    }

    /// Check if the file was actually written (not dry-run).
    pub fn was_written(&self) -> bool {
        matches!(self, SyncResult::Written { .. })
    }
}

/// Synchronizer replacing the output directory's contents atomically from
/// the caller's point of view: clear, then write everything.
#[derive(Debug)]
pub struct OutputSynchronizer {
    /// Generated output root; its contents belong to the generator.
    output_dir: PathBuf,

    /// Whether to run in dry-run mode.
    dry_run: bool,
}

impl OutputSynchronizer {
    pub fn new(output_dir: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            dry_run,
        }
    }

    /// Replace the output directory's contents with the given files.
    ///
    /// The directory itself is kept (and created if absent); only its
    /// contents are cleared, so editor watchers on the directory survive.
    pub fn sync(&self, files: &[GeneratedFile]) -> CliResult<Vec<SyncResult>> {
        if self.dry_run {
            return Ok(files
                .iter()
                .map(|f| SyncResult::DryRun {
                    path: self.output_dir.join(&f.relative_path),
                    content: f.contents.clone(),
                })
                .collect());
        }

        self.clear_output_dir()?;

        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let path = self.output_dir.join(&file.relative_path);

            if let Some(parent) = path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| WriteError::CreateDir {
                        path: parent.to_path_buf(),
                        source: e,
                    })?;
                }
            }

            std::fs::write(&path, &file.contents).map_err(|e| WriteError::WriteFile {
                path: path.clone(),
                source: e,
            })?;

            results.push(SyncResult::Written {
                path,
                bytes: file.contents.len(),
            });
        }

        Ok(results)
    }

    /// Remove everything under the output directory, keeping the directory.
    fn clear_output_dir(&self) -> Result<(), WriteError> {
        if !self.output_dir.exists() {
            std::fs::create_dir_all(&self.output_dir).map_err(|e| WriteError::CreateDir {
                path: self.output_dir.clone(),
                source: e,
            })?;
            return Ok(());
        }

        let entries = std::fs::read_dir(&self.output_dir).map_err(|e| WriteError::Clear {
            path: self.output_dir.clone(),
            source: e,
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| WriteError::Clear {
                path: self.output_dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            let removed = if entry
                .file_type()
                .map_err(|e| WriteError::Clear {
                    path: path.clone(),
                    source: e,
                })?
                .is_dir()
            {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            removed.map_err(|e| WriteError::Clear {
                path: path.clone(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Check if running in dry-run mode.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Get the output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
