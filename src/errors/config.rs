use thiserror::Error;

/// Mock configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A probability outside 0.0..=1.0
    #[error("Invalid rate for {field}: {value} (expected 0.0..=1.0)")]
    InvalidRate { field: &'static str, value: f64 },
}
