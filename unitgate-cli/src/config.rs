//! CLI 配置
//!
//! 日志配置，以及项目文件与命令行参数合并后的运行配置

use std::path::{Path, PathBuf};

use tracing::Level;
use unitgate_config::{LogLevel, Phase, ProjectConfig};

/// CLI 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub global: Level,
    pub extract: Option<Level>,
    pub lock: Option<Level>,
    pub resolve: Option<Level>,
    pub compile: Option<Level>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: Level::WARN,
            extract: None,
            lock: None,
            resolve: None,
            compile: None,
        }
    }
}

impl LogConfig {
    /// Get log level for a specific phase
    pub fn level_for(&self, phase: Phase) -> Level {
        let specific = match phase {
            Phase::Extract => self.extract,
            Phase::Lock => self.lock,
            Phase::Resolve => self.resolve,
            Phase::Compile => self.compile,
        };
        specific.unwrap_or(self.global)
    }
}

/// Map a project-file level; `off` keeps only errors
pub fn level_from_config(level: LogLevel) -> Level {
    match level {
        LogLevel::Off | LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

/// Read and parse a project file
pub fn read_project(path: &Path) -> Result<ProjectConfig, String> {
    if !path.exists() {
        return Err(format!("project file '{}' not found", path.display()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;

    ProjectConfig::from_json_str(&content)
        .map_err(|e| format!("failed to parse '{}': {}", path.display(), e))
}

/// Resolve project sources relative to the project file directory
pub fn resolve_sources(project_path: &Path, project: &ProjectConfig) -> Vec<PathBuf> {
    let base_dir = project_path.parent().unwrap_or(Path::new("."));
    project.sources.iter().map(|s| base_dir.join(s)).collect()
}
