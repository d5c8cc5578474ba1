use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Logging settings, read from `LOG_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct LoggingConfig {
    /// default filter directive when RUST_LOG is not set (e.g. "info", "infra=debug,info")
    #[serde(default = "default_level")]
    pub level: String,
    /// log file name (no file output if None)
    #[serde(default)]
    pub file_name: Option<String>,
    /// directory for the log file
    #[serde(default)]
    pub file_dir: Option<String>,
    #[serde(default)]
    pub use_json: bool,
    #[serde(default = "default_true")]
    pub use_stdout: bool,
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_name: None,
            file_dir: None,
            use_json: false,
            use_stdout: true,
        }
    }
}

impl LoggingConfig {
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file_name.as_ref().map(|name| match &self.file_dir {
            Some(dir) => PathBuf::from(dir).join(name),
            None => PathBuf::from(name),
        })
    }
}

pub fn load_tracing_config_from_env() -> Result<LoggingConfig> {
    envy::prefixed("LOG_")
        .from_env::<LoggingConfig>()
        .context("cannot read logging config from env")
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn fmt_layer<W>(writer: W, use_json: bool, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true);
    if use_json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn tracing_init(conf: LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&conf.level))
        .with_context(|| format!("invalid log level: {}", &conf.level))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if conf.use_stdout {
        layers.push(fmt_layer(std::io::stdout, conf.use_json, true));
    }
    if let Some(path) = conf.file_path() {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("cannot open log file: {}", path.display()))?;
        layers.push(fmt_layer(Arc::new(file), conf.use_json, false));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("failed to initialize tracing subscriber")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let conf = LoggingConfig::default();
        assert_eq!(conf.level, "info");
        assert!(conf.use_stdout);
        assert!(!conf.use_json);
        assert!(conf.file_path().is_none());
    }

    #[test]
    fn test_file_path_joins_dir() {
        let conf = LoggingConfig {
            file_name: Some("jobboard.log".to_string()),
            file_dir: Some("/var/log/jobboard".to_string()),
            ..Default::default()
        };
        assert_eq!(
            conf.file_path(),
            Some(PathBuf::from("/var/log/jobboard/jobboard.log"))
        );
    }

    #[test]
    fn test_tracing_init_writes_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let conf = LoggingConfig {
            file_name: Some("test.log".to_string()),
            file_dir: Some(dir.path().to_string_lossy().to_string()),
            use_stdout: false,
            ..Default::default()
        };
        tracing_init(conf)?;
        tracing::info!("logging initialized");
        let written = std::fs::read_to_string(dir.path().join("test.log"))?;
        assert!(written.contains("logging initialized"));
        Ok(())
    }
}
