//! FFmpeg execution adapter
//!
//! Drives an `ffmpeg` executable as the codec engine. The engine filesystem is a
//! private scratch directory created on load and removed when the adapter drops.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::{broadcast, OnceCell};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::domain::errors::*;
use crate::engine::{
    DirEntry, EngineEvent, EngineHandle, EngineInfo, EventEmitter, ProgressSample,
};
use crate::ports::*;

/// Flags prepended to every invocation
const GLOBAL_ARGS: [&str; 8] = [
    "-hide_banner",
    "-nostdin",
    "-y",
    "-nostats",
    "-loglevel",
    "info",
    "-progress",
    "pipe:1",
];
/// Number of stderr lines kept for error reports
const STDERR_TAIL: usize = 8;

/// Settings for the FFmpeg engine
#[derive(Debug, Clone)]
pub struct FFmpegConfig {
    /// Executable name or path
    pub binary: PathBuf,
    /// Parent directory for the scratch workspace, system temp dir when `None`
    pub scratch_dir: Option<PathBuf>,
}

impl Default for FFmpegConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            scratch_dir: None,
        }
    }
}

struct LoadedEngine {
    handle: EngineHandle,
    // Owns the workspace; dropping it removes the directory.
    _scratch: TempDir,
}

/// FFmpeg-based codec engine adapter
pub struct FFmpegAdapter {
    config: FFmpegConfig,
    loaded: OnceCell<LoadedEngine>,
    events: EventEmitter,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter; nothing is started until `ensure_loaded`
    pub fn new(config: FFmpegConfig) -> Self {
        Self {
            config,
            loaded: OnceCell::new(),
            events: EventEmitter::new(),
        }
    }

    async fn load(&self) -> Result<LoadedEngine, DomainError> {
        let binary = &self.config.binary;
        info!("Loading codec engine from {}", binary.display());

        let output = Command::new(binary)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DomainError::ResourceUnavailable(format!(
                    "Cannot start {}: {}",
                    binary.display(),
                    e
                ))
            })?;
        if !output.status.success() {
            return Err(DomainError::ResourceUnavailable(format!(
                "{} -version exited with {}",
                binary.display(),
                output.status
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .unwrap_or_else(|| "unknown version".to_string());

        let mut builder = tempfile::Builder::new();
        builder.prefix("reelforge-");
        let scratch = match &self.config.scratch_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                builder.tempdir_in(dir)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| DomainError::FsFail(format!("Failed to create engine workspace: {}", e)))?;

        info!("Codec engine ready: {} (workspace {})", version, scratch.path().display());
        Ok(LoadedEngine {
            handle: EngineHandle::new(EngineInfo {
                version,
                workspace: scratch.path().to_path_buf(),
            }),
            _scratch: scratch,
        })
    }

    fn workspace(&self) -> Result<&Path, DomainError> {
        self.loaded
            .get()
            .map(|loaded| loaded.handle.workspace().as_path())
            .ok_or_else(|| DomainError::ResourceUnavailable("Encoder not loaded".to_string()))
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, DomainError> {
        validate_name(name)?;
        Ok(self.workspace()?.join(name))
    }
}

/// Engine file names are flat: no separators, no `.`/`..`
fn validate_name(name: &str) -> Result<(), DomainError> {
    let has_separator = name.contains(|c: char| c == '/' || c == '\\');
    if name.is_empty() || name == "." || name == ".." || has_separator {
        return Err(DomainError::BadArgs(format!(
            "Invalid engine file name: {:?}",
            name
        )));
    }
    Ok(())
}

/// Seconds passed with `-t`, if any
fn argv_duration(argv: &[String]) -> Option<f64> {
    argv.windows(2)
        .find(|pair| pair[0] == "-t")
        .and_then(|pair| pair[1].parse::<f64>().ok())
        .filter(|seconds| *seconds > 0.0)
}

/// Parse ffmpeg's `  Duration: 00:00:03.00, start: ...` input banner
fn parse_duration_line(line: &str) -> Option<f64> {
    let rest = line.trim_start().strip_prefix("Duration:")?;
    let stamp = rest.split(',').next()?.trim();
    let mut parts = stamp.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    let total = hours * 3600.0 + minutes * 60.0 + seconds;
    (total > 0.0).then_some(total)
}

/// Turns `-progress` key/value output into progress samples
#[derive(Debug, Default)]
struct ProgressParser {
    total: Option<f64>,
}

impl ProgressParser {
    fn new(total: Option<f64>) -> Self {
        Self { total }
    }

    fn observe_log_line(&mut self, line: &str) {
        if self.total.is_none() {
            self.total = parse_duration_line(line);
        }
    }

    fn observe_progress_line(&mut self, line: &str) -> Option<ProgressSample> {
        let (key, value) = line.split_once('=')?;
        match key.trim() {
            // out_time_ms is in microseconds as well
            "out_time_us" | "out_time_ms" => {
                let micros: f64 = value.trim().parse().ok()?;
                let total = self.total.filter(|total| *total > 0.0)?;
                Some(ProgressSample::Ratio(micros / 1_000_000.0 / total))
            }
            "progress" if value.trim() == "end" => Some(ProgressSample::Percent(100.0)),
            _ => None,
        }
    }
}

#[async_trait]
impl CodecEnginePort for FFmpegAdapter {
    async fn ensure_loaded(&self) -> Result<EngineHandle, DomainError> {
        let loaded = self.loaded.get_or_try_init(|| self.load()).await?;
        Ok(loaded.handle.clone())
    }

    fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), DomainError> {
        let path = self.resolve(name)?;
        tokio::fs::write(&path, bytes).await?;
        debug!("Wrote {} ({} bytes)", name, bytes.len());
        Ok(())
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, DomainError> {
        let path = self.resolve(name)?;
        Ok(tokio::fs::read(&path).await?)
    }

    async fn delete_file(&self, name: &str) -> Result<(), DomainError> {
        let path = self.resolve(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, DomainError> {
        let root = self.workspace()?.to_path_buf();
        let dir = match path.trim_matches('/') {
            "" | "." => root,
            sub => {
                validate_name(sub)?;
                root.join(sub)
            }
        };

        let listing = tokio::task::spawn_blocking(move || {
            let mut entries = vec![DirEntry::dir("."), DirEntry::dir("..")];
            for entry in WalkDir::new(&dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry.map_err(|e| DomainError::FsFail(e.to_string()))?;
                entries.push(DirEntry {
                    name: entry.file_name().to_string_lossy().to_string(),
                    is_dir: entry.file_type().is_dir(),
                });
            }
            Ok::<_, DomainError>(entries)
        })
        .await
        .map_err(|e| DomainError::InternalError(format!("Listing task failed: {}", e)))??;

        Ok(listing)
    }

    async fn invoke(&self, argv: &[String]) -> Result<(), DomainError> {
        let workspace = self.workspace()?;
        debug!("ffmpeg {}", argv.join(" "));

        let mut child = Command::new(&self.config.binary)
            .args(GLOBAL_ARGS)
            .args(argv)
            .current_dir(workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DomainError::ProcessingError(format!("Failed to start ffmpeg: {}", e)))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            DomainError::InternalError("ffmpeg stdout was not captured".to_string())
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            DomainError::InternalError("ffmpeg stderr was not captured".to_string())
        })?;

        let mut out_lines = BufReader::new(stdout).lines();
        let mut err_lines = BufReader::new(stderr).lines();
        let mut parser = ProgressParser::new(argv_duration(argv));
        let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL);
        let (mut out_done, mut err_done) = (false, false);

        while !(out_done && err_done) {
            tokio::select! {
                line = out_lines.next_line(), if !out_done => match line {
                    Ok(Some(line)) => {
                        if let Some(sample) = parser.observe_progress_line(&line) {
                            self.events.progress(sample);
                        }
                    }
                    _ => out_done = true,
                },
                line = err_lines.next_line(), if !err_done => match line {
                    Ok(Some(line)) => {
                        parser.observe_log_line(&line);
                        if tail.len() == STDERR_TAIL {
                            tail.pop_front();
                        }
                        tail.push_back(line.clone());
                        self.events.log(line);
                    }
                    _ => err_done = true,
                },
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| DomainError::ProcessingError(format!("Failed to wait for ffmpeg: {}", e)))?;

        if status.success() {
            Ok(())
        } else {
            let detail = tail.into_iter().collect::<Vec<_>>().join(" | ");
            warn!("ffmpeg exited with {}", status);
            Err(DomainError::ProcessingError(format!(
                "ffmpeg exited with {}: {}",
                status, detail
            )))
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }
}
