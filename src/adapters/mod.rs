// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod plan_file;
pub mod template_plan;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::{FFmpegAdapter, FFmpegConfig};
pub use plan_file::{load_plan, save_plan, PlanFormat};
pub use template_plan::TemplatePlanSource;
pub use toml_config::AppConfig;
