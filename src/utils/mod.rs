//! Common utilities and helpers

use std::time::Duration;

pub mod logging;

/// Display helpers for CLI output
pub struct Utils;

impl Utils {
    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        let milliseconds = duration.subsec_millis();

        if hours > 0 {
            format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
        } else {
            format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds)
        }
    }

    /// Format a runtime given in seconds, e.g. `0:21`
    pub fn format_runtime(seconds: f64) -> String {
        let total = seconds.max(0.0).round() as u64;
        format!("{}:{:02}", total / 60, total % 60)
    }

    /// Format file size for display
    pub fn format_file_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Text progress bar for a 0-100 value
    pub fn progress_bar(percent: u8, width: usize) -> String {
        let filled = (usize::from(percent.min(100)) * width) / 100;
        format!("[{}{}] {:>3}%", "#".repeat(filled), "-".repeat(width - filled), percent.min(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(Utils::format_duration(Duration::from_millis(61_250)), "01:01.250");
        assert_eq!(Utils::format_duration(Duration::from_secs(3_661)), "01:01:01.000");
    }

    #[test]
    fn test_format_runtime() {
        assert_eq!(Utils::format_runtime(20.5), "0:21");
        assert_eq!(Utils::format_runtime(75.0), "1:15");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(Utils::format_file_size(512), "512 B");
        assert_eq!(Utils::format_file_size(1536), "1.50 KB");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(Utils::progress_bar(50, 10), "[#####-----]  50%");
        assert_eq!(Utils::progress_bar(250, 4), "[####] 100%");
    }
}
