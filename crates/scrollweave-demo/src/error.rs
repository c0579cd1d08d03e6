use scrollweave_core::{ConfigError, EngineError};

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("scene setup failed: {0}")]
    Engine(#[from] EngineError),

    #[error("invalid scroll script: {0}")]
    Script(String),

    #[error("invalid viewport {width}x{height}")]
    Viewport { width: f64, height: f64 },

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

impl DemoError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Script(_) | Self::Viewport { .. } => 2,
            Self::Engine(_) => 3,
            Self::Json(_) | Self::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, DemoError>;
