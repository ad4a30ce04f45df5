//! Local staging area for pulled device content
//!
//! Layout under the staging root:
//!
//! ```text
//! <root>/
//!   Photos/ Documents/ Videos/ Audio/ Archives/   one dir per category
//!   UsageStats/usage_dump.txt                     pulled dumpsys output
//!   evidence_snapshot.json                        persisted snapshot
//! ```
//!
//! A category directory always mirrors the most recent extraction pass.
//! Pulls land in a temporary sibling directory first and are renamed into
//! place only when the pass finishes, so a failed listing or an interrupted
//! run never leaves a category emptied-but-unfilled.

use crate::core::category::Category;
use crate::core::error::{Result, TriageError};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// File name of the persisted evidence snapshot
const SNAPSHOT_FILE_NAME: &str = "evidence_snapshot.json";

/// File name of the pulled usage-stats dump
const USAGE_DUMP_FILE_NAME: &str = "usage_dump.txt";

/// The staging root and its fixed layout
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    /// Create a staging area rooted at `root` (nothing is created yet)
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The staging root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory mirroring the latest pass for a category
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.display_name())
    }

    /// Local path of the pulled usage-stats dump
    pub fn usage_dump_path(&self) -> PathBuf {
        self.root.join("UsageStats").join(USAGE_DUMP_FILE_NAME)
    }

    /// Path of the persisted evidence snapshot
    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(SNAPSHOT_FILE_NAME)
    }

    /// Create the staging root if missing
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .map_err(|e| TriageError::Persistence(format!("Failed to create staging root: {}", e)))
    }

    /// Begin an extraction pass for a category.
    ///
    /// Files are staged into a temporary directory inside the root and only
    /// replace the category directory on [`StagingPass::commit`].
    pub fn begin_pass(&self, category: Category) -> Result<StagingPass> {
        self.ensure_root()?;
        let temp = TempDir::with_prefix_in(format!(".{}-", category.display_name()), &self.root)
            .map_err(|e| {
                TriageError::Persistence(format!("Failed to create staging temp dir: {}", e))
            })?;
        Ok(StagingPass {
            temp,
            final_dir: self.category_dir(category),
        })
    }

    /// Files staged for a category, sorted by name.
    ///
    /// Only direct children are listed; pulls always flatten to basenames.
    pub fn staged_entries(&self, category: Category) -> Vec<PathBuf> {
        let dir = self.category_dir(category);
        let mut entries: Vec<PathBuf> = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        entries.sort();
        entries
    }

    /// Delete everything staged (category dirs, usage dump, snapshot) and
    /// recreate the empty root. Mirrors the original's disconnect behavior.
    pub fn cleanup(&self) -> Result<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root).map_err(|e| {
                TriageError::Persistence(format!("Failed to clear staging root: {}", e))
            })?;
        }
        self.ensure_root()
    }
}

/// An in-progress extraction pass staging into a temporary directory
#[derive(Debug)]
pub struct StagingPass {
    temp: TempDir,
    final_dir: PathBuf,
}

impl StagingPass {
    /// Directory to pull files into during the pass
    pub fn dir(&self) -> &Path {
        self.temp.path()
    }

    /// Replace the category directory with this pass's content.
    ///
    /// The temp directory lives next to the final one, so the rename stays
    /// on one filesystem.
    pub fn commit(self) -> Result<PathBuf> {
        let staged = self.temp.into_path();

        if self.final_dir.exists() {
            fs::remove_dir_all(&self.final_dir).map_err(|e| {
                TriageError::Persistence(format!(
                    "Failed to remove previous staging '{}': {}",
                    self.final_dir.display(),
                    e
                ))
            })?;
        }

        fs::rename(&staged, &self.final_dir).map_err(|e| {
            TriageError::Persistence(format!(
                "Failed to move staged files into '{}': {}",
                self.final_dir.display(),
                e
            ))
        })?;

        debug!("Committed staging pass to {}", self.final_dir.display());
        Ok(self.final_dir)
    }

    // Dropping an uncommitted pass deletes the temp dir and leaves the
    // previous category contents untouched.
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let staging = StagingArea::new("/tmp/stage");
        assert_eq!(
            staging.category_dir(Category::Photos),
            PathBuf::from("/tmp/stage/Photos")
        );
        assert_eq!(
            staging.usage_dump_path(),
            PathBuf::from("/tmp/stage/UsageStats/usage_dump.txt")
        );
        assert_eq!(
            staging.snapshot_path(),
            PathBuf::from("/tmp/stage/evidence_snapshot.json")
        );
    }

    #[test]
    fn test_commit_replaces_previous_pass() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path().join("stage"));

        let first = staging.begin_pass(Category::Photos).unwrap();
        fs::write(first.dir().join("old.jpg"), b"old").unwrap();
        first.commit().unwrap();

        let second = staging.begin_pass(Category::Photos).unwrap();
        fs::write(second.dir().join("new.jpg"), b"new").unwrap();
        second.commit().unwrap();

        let entries = staging.staged_entries(Category::Photos);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name().unwrap(), "new.jpg");
    }

    #[test]
    fn test_dropped_pass_leaves_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path().join("stage"));

        let first = staging.begin_pass(Category::Documents).unwrap();
        fs::write(first.dir().join("keep.pdf"), b"keep").unwrap();
        first.commit().unwrap();

        {
            let abandoned = staging.begin_pass(Category::Documents).unwrap();
            fs::write(abandoned.dir().join("partial.pdf"), b"partial").unwrap();
            // dropped without commit
        }

        let entries = staging.staged_entries(Category::Documents);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name().unwrap(), "keep.pdf");
    }

    #[test]
    fn test_cleanup_removes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path().join("stage"));

        let pass = staging.begin_pass(Category::Audio).unwrap();
        fs::write(pass.dir().join("song.mp3"), b"x").unwrap();
        pass.commit().unwrap();
        fs::write(staging.snapshot_path(), b"{}").unwrap();

        staging.cleanup().unwrap();
        assert!(staging.root().exists());
        assert!(staging.staged_entries(Category::Audio).is_empty());
        assert!(!staging.snapshot_path().exists());
    }

    #[test]
    fn test_staged_entries_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path().join("stage"));
        assert!(staging.staged_entries(Category::Videos).is_empty());
    }
}
