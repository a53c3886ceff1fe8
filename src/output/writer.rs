//! Output file writer implementation

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::errors::DomainError;
use crate::output::{AssetHandle, OutputConfig, OverwritePolicy};

/// Writes a rendered asset to disk
pub struct OutputWriter {
    atomic_writes: bool,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new() -> Self {
        Self {
            atomic_writes: true,
        }
    }

    /// Write directly to the destination instead of renaming a temp file
    pub fn direct() -> Self {
        Self {
            atomic_writes: false,
        }
    }

    /// Persist the asset bytes to `config.path`
    pub fn write_asset(&self, asset: &AssetHandle, config: &OutputConfig) -> Result<PathBuf, DomainError> {
        let bytes = asset.bytes().ok_or_else(|| {
            DomainError::ResourceUnavailable(format!("Output asset {} was revoked", asset.id()))
        })?;

        let path = PathBuf::from(&config.path);
        info!("Writing output file: {}", path.display());

        self.check_overwrite_policy(&path, config.overwrite)?;
        self.ensure_output_directory(&path)?;

        if self.atomic_writes {
            let temp_path = self.create_temp_path(&path)?;
            self.write_to_file(&temp_path, &bytes)?;
            std::fs::rename(&temp_path, &path).map_err(|e| {
                let _ = std::fs::remove_file(&temp_path);
                DomainError::FsFail(format!("Failed to rename temporary file: {}", e))
            })?;
        } else {
            self.write_to_file(&path, &bytes)?;
        }

        info!("Output file written successfully: {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    fn write_to_file(&self, path: &Path, data: &[u8]) -> Result<(), DomainError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| DomainError::FsFail(format!("Failed to open file for writing: {}", e)))?;

        let mut writer = BufWriter::new(file);
        writer
            .write_all(data)
            .map_err(|e| DomainError::FsFail(format!("Failed to write data: {}", e)))?;
        let file = writer
            .into_inner()
            .map_err(|e| DomainError::FsFail(format!("Failed to flush data: {}", e)))?;
        file.sync_all()
            .map_err(|e| DomainError::FsFail(format!("Failed to sync file to disk: {}", e)))?;
        Ok(())
    }

    /// Temp file lives next to the destination so the rename stays on one filesystem
    fn create_temp_path(&self, final_path: &Path) -> Result<PathBuf, DomainError> {
        let filename = final_path
            .file_name()
            .ok_or_else(|| DomainError::BadArgs("Invalid output file path".to_string()))?;
        let temp_name = format!(".tmp_{}", filename.to_string_lossy());
        Ok(final_path.with_file_name(temp_name))
    }

    fn check_overwrite_policy(&self, path: &Path, policy: OverwritePolicy) -> Result<(), DomainError> {
        if path.exists() {
            match policy {
                OverwritePolicy::Never => {
                    return Err(DomainError::ValidationFailed(format!(
                        "Output file {} exists and overwrite is disabled",
                        path.display()
                    )));
                }
                OverwritePolicy::Always => {
                    info!("File exists, will overwrite");
                }
            }
        }
        Ok(())
    }

    fn ensure_output_directory(&self, path: &Path) -> Result<(), DomainError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DomainError::FsFail(format!("Failed to create output directory: {}", e))
            })?;
        }
        Ok(())
    }
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::new()
    }
}
