use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("case file read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("case descriptor: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("candidate table: {0}")]
    Csv(#[from] csv::Error),
    #[error("unknown rotational sense '{0}'")]
    UnknownSense(String),
}
