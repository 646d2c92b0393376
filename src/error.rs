use thiserror::Error;

/// A submit gate that failed. The message is what the user sees.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("Please enter valid email address!")]
    InvalidEmail,
    #[error("Please fill in all required fields!")]
    MissingRequiredField,
    #[error("Please Draw the signature!")]
    MissingSignature,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: String, value: String },
}

#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Signature canvas has no pixels")]
    EmptyCanvas,
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read template: {0}")]
    Read(String),
    #[error("Failed to embed signature image: {0}")]
    Image(String),
    #[error("Failed to write document: {0}")]
    Write(String),
}

#[derive(Error, Debug)]
pub enum IdError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API returned status: {0}")]
    Status(reqwest::StatusCode),
    #[error("Response contained no id")]
    Empty,
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    File(#[from] std::io::Error),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Message(String),
}

/// Failures that escape the submit pipeline and trigger a session restart.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error("{0}")]
    Unexpected(String),
}
