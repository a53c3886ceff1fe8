//! Output slot and asset persistence module
//!
//! The slot holds at most one live rendered short. Publishing a new asset
//! revokes the previous one, which releases its bytes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod writer;

pub use writer::OutputWriter;

/// Default file name offered for a rendered short
pub const DEFAULT_OUTPUT_NAME: &str = "youtube-short.mp4";

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output file path
    pub path: String,
    /// Overwrite policy
    pub overwrite: OverwritePolicy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_OUTPUT_NAME.to_string(),
            overwrite: OverwritePolicy::Never,
        }
    }
}

/// Overwrite policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Always overwrite
    Always,
    /// Never overwrite
    Never,
}

struct AssetInner {
    id: u64,
    file_name: String,
    bytes: Mutex<Option<Arc<[u8]>>>,
}

/// Revocable handle to one rendered MP4.
///
/// Clones share the same asset; revocation through the slot is visible to all
/// of them.
#[derive(Clone)]
pub struct AssetHandle {
    inner: Arc<AssetInner>,
}

impl AssetHandle {
    fn new(id: u64, file_name: String, bytes: Vec<u8>) -> Self {
        Self {
            inner: Arc::new(AssetInner {
                id,
                file_name,
                bytes: Mutex::new(Some(Arc::from(bytes))),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Suggested download name
    pub fn file_name(&self) -> &str {
        &self.inner.file_name
    }

    /// Opaque URL naming this asset
    pub fn url(&self) -> String {
        format!("blob:reelforge/{}", self.inner.id)
    }

    pub fn is_live(&self) -> bool {
        self.lock().is_some()
    }

    /// Asset bytes, `None` once revoked
    pub fn bytes(&self) -> Option<Arc<[u8]>> {
        self.lock().clone()
    }

    /// Byte length, zero once revoked
    pub fn len(&self) -> usize {
        self.lock().as_ref().map_or(0, |bytes| bytes.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn revoke(&self) {
        self.lock().take();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<[u8]>>> {
        // A poisoned lock still holds valid bytes.
        self.inner
            .bytes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("id", &self.inner.id)
            .field("file_name", &self.inner.file_name)
            .field("live", &self.is_live())
            .field("len", &self.len())
            .finish()
    }
}

/// Holder of the single current output asset
#[derive(Default)]
pub struct OutputSlot {
    current: Mutex<Option<AssetHandle>>,
    next_id: AtomicU64,
}

impl OutputSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish new bytes, revoking whatever was published before
    pub fn publish(&self, file_name: impl Into<String>, bytes: Vec<u8>) -> AssetHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let handle = AssetHandle::new(id, file_name.into(), bytes);

        let previous = self.slot().replace(handle.clone());
        if let Some(previous) = previous {
            debug!("Revoking output asset {}", previous.id());
            previous.revoke();
        }
        handle
    }

    /// Revoke and clear the current asset, if any
    pub fn revoke(&self) {
        if let Some(previous) = self.slot().take() {
            debug!("Revoking output asset {}", previous.id());
            previous.revoke();
        }
    }

    /// Current live asset
    pub fn current(&self) -> Option<AssetHandle> {
        self.slot().clone()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<AssetHandle>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
