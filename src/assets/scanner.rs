//! Background asset scanning.
//!
//! The scan runs on a worker thread and publishes its result over a
//! channel; the owner polls [`ScanHandle::try_result`] from the frame
//! loop. Cancellation is cooperative through a shared flag the worker
//! checks between directories. A cancelled scan publishes nothing, so
//! a stale tree can never be installed.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use log::debug;

use crate::assets::{scan_dir, AssetEntry};
use crate::error::AssetError;

/// Handle to an in-flight background scan. Dropping it cancels the
/// scan and waits for the worker to wind down.
pub struct ScanHandle {
    receiver: Receiver<Result<AssetEntry, AssetError>>,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ScanHandle {
    /// Non-blocking poll. `None` while the scan is still running or
    /// after the result was already taken; a cancelled scan never
    /// yields a result.
    pub fn try_result(&self) -> Option<Result<AssetEntry, AssetError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Block until the scan finishes. `Err(ScanCancelled)` if it was
    /// cancelled before publishing.
    pub fn wait(&self) -> Result<AssetEntry, AssetError> {
        match self.receiver.recv() {
            Ok(result) => result,
            Err(_) => Err(AssetError::ScanCancelled),
        }
    }

    /// Request cancellation. The worker stops at the next directory
    /// boundary and discards whatever it built.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        self.cancel();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Start scanning `root` on a worker thread.
pub fn spawn_scan(root: PathBuf) -> ScanHandle {
    let cancel = Arc::new(AtomicBool::new(false));
    let (sender, receiver) = bounded(1);

    let worker_cancel = Arc::clone(&cancel);
    let worker = std::thread::spawn(move || {
        let result = scan_dir(&root, PathBuf::new(), &worker_cancel);
        match result {
            Err(AssetError::ScanCancelled) => {
                debug!("asset scan of {:?} cancelled", root);
            }
            other => {
                // receiver may be gone if the handle was dropped
                let _ = sender.send(other);
            }
        }
    });

    ScanHandle {
        receiver,
        cancel,
        worker: Some(worker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn background_scan_delivers_tree() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("models/chair.txt"));
        touch(&dir.path().join("readme.txt"));

        let handle = spawn_scan(dir.path().to_path_buf());
        let tree = handle.wait().unwrap();
        assert_eq!(tree.children.len(), 2);
    }

    #[test]
    fn result_is_taken_once() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.txt"));

        let handle = spawn_scan(dir.path().to_path_buf());
        assert!(handle.wait().is_ok());
        assert!(handle.try_result().is_none());
    }

    #[test]
    fn scan_of_missing_root_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let handle = spawn_scan(dir.path().join("missing"));
        assert!(matches!(handle.wait(), Err(AssetError::Io(_))));
    }

    #[test]
    fn dropping_the_handle_does_not_hang() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.txt"));
        let handle = spawn_scan(dir.path().to_path_buf());
        drop(handle);
    }

    #[test]
    fn cancel_flag_is_observable() {
        let dir = tempfile::tempdir().unwrap();
        let handle = spawn_scan(dir.path().to_path_buf());
        assert!(!handle.is_cancelled());
        handle.cancel();
        assert!(handle.is_cancelled());
    }
}
