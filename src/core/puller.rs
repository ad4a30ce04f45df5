//! Selective file puller
//!
//! One extraction pass: list the device root recursively, parse the listing,
//! keep paths matching the requested category, and pull each match into a
//! fresh staging directory named by basename. Individual transfer failures
//! are logged, counted, and skipped; only a failure of the initial listing
//! aborts the pass. The previous pass's files stay in place until the new
//! pass commits.

use crate::core::category::Category;
use crate::core::error::Result;
use crate::core::listing::parse_recursive_listing;
use crate::core::staging::StagingArea;
use crate::device::traits::Device;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One successfully staged file
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// Absolute path on the device
    pub remote_path: String,
    /// Local path under the category staging directory
    pub local_path: PathBuf,
    /// Bytes transferred
    pub size: u64,
    /// SHA-256 of the staged content, hex encoded
    pub sha256: String,
}

/// Typed outcome of one extraction pass
#[derive(Debug, Default)]
pub struct PullOutcome {
    /// Files staged by this pass
    pub staged: Vec<StagedFile>,
    /// Transfers that failed and were skipped
    pub failed: usize,
    /// Candidates skipped without a transfer attempt (basename collisions)
    pub skipped: usize,
    /// Whether the pass stopped early on a shutdown request
    pub interrupted: bool,
}

impl PullOutcome {
    /// Total candidates the pass considered
    pub fn candidates(&self) -> usize {
        self.staged.len() + self.failed + self.skipped
    }
}

/// Run one extraction pass for a category.
///
/// The shutdown flag is checked between transfers; an interrupted pass
/// still commits what it staged so far, keeping the mirror consistent with
/// what was actually pulled.
pub fn pull_category(
    device: &dyn Device,
    staging: &StagingArea,
    listing_root: &str,
    category: Category,
    shutdown_flag: &Arc<AtomicBool>,
) -> Result<PullOutcome> {
    info!("Scanning {} for {} files...", listing_root, category);

    // A listing failure aborts before anything local is touched.
    let raw = device.shell(&format!("ls -R {}", listing_root))?;
    let candidates: Vec<String> = parse_recursive_listing(listing_root, &raw)
        .into_iter()
        .filter(|path| category.matches(path))
        .collect();

    info!("Found {} {} candidates", candidates.len(), category);

    let pass = staging.begin_pass(category)?;
    let mut outcome = PullOutcome::default();

    let progress = ProgressBar::new(candidates.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    for remote_path in &candidates {
        if shutdown_flag.load(Ordering::SeqCst) {
            warn!("Shutdown requested, stopping extraction...");
            outcome.interrupted = true;
            break;
        }

        let basename = remote_path.rsplit('/').next().unwrap_or(remote_path);
        progress.set_message(basename.chars().take(30).collect::<String>());
        progress.inc(1);

        let local_path = pass.dir().join(basename);
        if local_path.exists() {
            // Same basename from another directory earlier in this pass;
            // first occurrence wins.
            debug!("Skipping basename collision: {}", remote_path);
            outcome.skipped += 1;
            continue;
        }

        match device.pull(remote_path, &local_path) {
            Ok(size) => {
                let sha256 = hash_file(&local_path).unwrap_or_default();
                debug!("Staged {} ({} bytes)", remote_path, size);
                outcome.staged.push(StagedFile {
                    remote_path: remote_path.clone(),
                    local_path: staging.category_dir(category).join(basename),
                    size,
                    sha256,
                });
            }
            Err(e) => {
                debug!("Failed to pull '{}': {}", remote_path, e);
                outcome.failed += 1;
            }
        }
    }

    pass.commit()?;
    progress.finish_and_clear();

    info!(
        "{}: staged {}, failed {}, skipped {}",
        category,
        outcome.staged.len(),
        outcome.failed,
        outcome.skipped
    );

    Ok(outcome)
}

/// SHA-256 of a staged file, hex encoded
fn hash_file(path: &std::path::Path) -> Option<String> {
    let data = std::fs::read(path).ok()?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Some(format!("{:x}", hasher.finalize()))
}
