//! Keeps the codec engine filesystem free of stale job files

use tracing::debug;

use crate::ports::CodecEnginePort;

/// Outcome of a best-effort cleanup pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: usize,
    pub failed: usize,
}

impl SweepReport {
    pub fn is_noop(&self) -> bool {
        self.removed == 0 && self.failed == 0
    }
}

/// Best-effort cleanup over an engine filesystem.
///
/// Nothing here returns an error: a locked or vanished file must never abort a
/// render, so failures are only counted.
pub struct FsLifecycle<'a> {
    engine: &'a dyn CodecEnginePort,
}

impl<'a> FsLifecycle<'a> {
    pub fn new(engine: &'a dyn CodecEnginePort) -> Self {
        Self { engine }
    }

    /// Delete every regular file in the engine root
    pub async fn sweep(&self) -> SweepReport {
        let entries = match self.engine.list_dir("/").await {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Skipping engine sweep, listing failed: {}", e);
                return SweepReport::default();
            }
        };

        let names: Vec<String> = entries
            .into_iter()
            .filter(|entry| !entry.is_dir && !entry.is_pseudo())
            .map(|entry| entry.name)
            .collect();

        self.discard(names).await
    }

    /// Delete the named files
    pub async fn discard<I>(&self, names: I) -> SweepReport
    where
        I: IntoIterator<Item = String>,
    {
        let mut report = SweepReport::default();
        for name in names {
            match self.engine.delete_file(&name).await {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    debug!("Ignoring failed delete of {}: {}", name, e);
                    report.failed += 1;
                }
            }
        }
        report
    }
}
