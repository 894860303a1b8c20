use thiserror::Error;

use crate::types::ScriptIdentity;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RatingError {
    #[error("Script not found: {identity}")]
    ScriptNotFound { identity: ScriptIdentity },
    #[error("Error compiling script: {identity}: {message}")]
    ScriptCompile {
        identity: ScriptIdentity,
        message: String,
    },
    #[error("Error executing script: {identity}: {message}")]
    ScriptExecution {
        identity: ScriptIdentity,
        message: String,
    },
    #[error("{0}")]
    DomainValidation(String),
    #[error("{0}")]
    Request(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl RatingError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::DomainValidation(message.into())
    }

    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn compile(identity: ScriptIdentity, message: impl Into<String>) -> Self {
        Self::ScriptCompile {
            identity,
            message: message.into(),
        }
    }

    pub fn execution(identity: ScriptIdentity, message: impl Into<String>) -> Self {
        Self::ScriptExecution {
            identity,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::ScriptNotFound { .. } => "SCRIPT_NOT_FOUND",
            Self::ScriptCompile { .. } => "SCRIPT_COMPILE_ERROR",
            Self::ScriptExecution { .. } => "SCRIPT_EXECUTION_ERROR",
            Self::DomainValidation(_) => "VALIDATION_ERROR",
            Self::Request(_) => "REQUEST_INVALID",
            Self::Config(_) => "CONFIG_INVALID",
        }
    }

    /// Client-side failures are caused by the caller's input; everything else
    /// points at a broken deployment or rule script.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::DomainValidation(_) | Self::Request(_))
    }
}
