//! Album state and batch workflows.
//!
//! [`AlbumController`] owns the in-memory file list, the selection-mode state
//! machine, and the two batch operations: sequential upload (one request in
//! flight at a time, so generated filenames keep their order and the server
//! is never hammered) and parallel delete (independent requests, one join).
//! Both are best-effort: individual failures are reported, never retried, and
//! never abort the rest of the batch.
//!
//! All state lives behind a `std::sync::Mutex` that is never held across an
//! await point.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, warn};

use fotovault_api::{AlbumApi, ApiError, FileInfo, Url};

/// One locally picked image, already JPEG-encoded, waiting to be uploaded.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub bytes: Vec<u8>,
    /// Where the image came from, for reporting only.
    pub source: String,
}

/// Outcome of a batch upload or batch delete.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Item name and error for every failed element.
    pub failures: Vec<(String, ApiError)>,
}

impl BatchReport {
    fn record_failure(&mut self, item: String, error: ApiError) {
        self.failed += 1;
        self.failures.push((item, error));
    }
}

#[derive(Default)]
struct AlbumState {
    /// Rebuilt wholesale on every successful fetch; stale data is kept when a
    /// fetch fails.
    files: Vec<FileInfo>,
    /// `None` = browsing, `Some` = selecting.  Indices point into `files`.
    selection: Option<BTreeSet<usize>>,
    is_uploading: bool,
    is_loading: bool,
}

/// Orchestrates fetch, upload, delete and selection over an [`AlbumApi`].
pub struct AlbumController<S> {
    api: S,
    state: Mutex<AlbumState>,
}

impl<S: AlbumApi> AlbumController<S> {
    pub fn new(api: S) -> Self {
        Self {
            api,
            state: Mutex::new(AlbumState::default()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, AlbumState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the current file list.
    pub fn files(&self) -> Vec<FileInfo> {
        self.lock_state().files.clone()
    }

    /// Whether selection mode is active.
    pub fn is_selecting(&self) -> bool {
        self.lock_state().selection.is_some()
    }

    /// Currently selected indices, in ascending order.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.lock_state()
            .selection
            .as_ref()
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Enter selection mode with `index` pre-selected (the long-pressed
    /// item).  No-op when already selecting or when the index is out of
    /// range; returns whether selection mode is now active.
    pub fn enter_selection(&self, index: usize) -> bool {
        let mut state = self.lock_state();
        if state.selection.is_none() && index < state.files.len() {
            state.selection = Some(BTreeSet::from([index]));
            debug!(index, "entered selection mode");
        }
        state.selection.is_some()
    }

    /// Toggle membership of `index` in the selection.  Returns the new
    /// membership, or `None` when browsing (a tap then means "open preview",
    /// which is the caller's concern) or when the index is out of range.
    pub fn toggle_selected(&self, index: usize) -> Option<bool> {
        let mut state = self.lock_state();
        if index >= state.files.len() {
            return None;
        }
        let selection = state.selection.as_mut()?;
        let now_selected = if selection.remove(&index) {
            false
        } else {
            selection.insert(index);
            true
        };
        Some(now_selected)
    }

    /// Leave selection mode without deleting anything.
    pub fn cancel_selection(&self) {
        self.lock_state().selection = None;
    }

    /// Fetch the file list and replace the in-memory copy.
    ///
    /// On failure the previous list is left untouched.  Returns the new file
    /// count on success.
    pub async fn refresh(&self) -> Result<usize, ApiError> {
        {
            self.lock_state().is_loading = true;
        }
        let result = self.api.list_files().await;

        let mut state = self.lock_state();
        state.is_loading = false;
        match result {
            Ok(files) => {
                let count = files.len();
                state.files = files;
                // Indices from before the fetch may no longer exist.
                if let Some(selection) = state.selection.as_mut() {
                    selection.retain(|&i| i < count);
                }
                debug!(count, "file list refreshed");
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "file list fetch failed, keeping stale list");
                Err(e)
            }
        }
    }

    /// Upload a batch of images sequentially, then refresh the list once.
    ///
    /// Filenames are synthesized from the batch timestamp and the 1-based
    /// position, so a batch of N images always issues exactly N uploads with
    /// distinct names.  Returns `None` when the batch is empty or another
    /// batch is already in flight (the request is dropped, matching the
    /// single-batch discipline of the UI).
    pub async fn upload_batch(&self, images: Vec<PendingUpload>) -> Option<BatchReport> {
        if images.is_empty() {
            return None;
        }
        {
            let mut state = self.lock_state();
            if state.is_uploading {
                debug!("upload batch already in flight, dropping request");
                return None;
            }
            state.is_uploading = true;
        }

        let batch_stamp = Utc::now().timestamp_millis();
        let total = images.len();
        let mut report = BatchReport::default();

        for (position, image) in images.into_iter().enumerate() {
            let filename = format!("IMG_{}_{}.jpg", batch_stamp, position + 1);
            match self.api.upload_file(image.bytes, &filename).await {
                Ok(response) => {
                    info!(
                        filename = %response.filename,
                        position = position + 1,
                        total,
                        "upload succeeded"
                    );
                    report.succeeded += 1;
                }
                Err(e) => {
                    warn!(
                        %filename,
                        source = %image.source,
                        error = %e,
                        "upload failed, continuing batch"
                    );
                    report.record_failure(filename, e);
                }
            }
        }

        {
            self.lock_state().is_uploading = false;
        }

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "post-upload refresh failed");
        }

        Some(report)
    }

    /// Delete all selected files concurrently, then leave selection mode and
    /// refresh the list once.
    ///
    /// Each delete targets the filename derived from the file's preview path.
    /// Completion order is non-deterministic; the report aggregates all
    /// outcomes.  Returns `None` when not selecting or nothing is selected.
    pub async fn delete_selected(&self) -> Option<BatchReport> {
        let targets: Vec<String> = {
            let mut state = self.lock_state();
            let selection = state.selection.as_ref()?;
            let targets: Vec<String> = selection
                .iter()
                .filter_map(|&i| state.files.get(i))
                .map(|f| f.preview_filename().to_string())
                .collect();
            if targets.is_empty() {
                return None;
            }
            state.is_loading = true;
            targets
        };

        let results = join_all(targets.iter().map(|name| self.api.delete_file(name))).await;

        let mut report = BatchReport::default();
        for (name, result) in targets.into_iter().zip(results) {
            match result {
                Ok(_) => report.succeeded += 1,
                Err(e) => {
                    warn!(filename = %name, error = %e, "delete failed");
                    report.record_failure(name, e);
                }
            }
        }
        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "delete batch finished"
        );

        {
            let mut state = self.lock_state();
            state.is_loading = false;
            state.selection = None;
        }

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "post-delete refresh failed");
        }

        Some(report)
    }

    /// Resolved preview URLs for the whole list, in display order.
    ///
    /// Full-screen preview opens over this list at the tapped index.
    pub fn preview_urls(&self) -> Result<Vec<Url>, ApiError> {
        self.lock_state()
            .files
            .iter()
            .map(|f| self.api.preview_url(f))
            .collect()
    }
}
