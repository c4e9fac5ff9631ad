use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScopeError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Model request failed: {0}")]
    Model(String),

    #[error("No job description provided")]
    EmptyDescription,

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
