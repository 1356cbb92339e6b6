// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for annotation, submission and result handling.

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A submission precondition that was not met.
///
/// Checked in declaration order: video, then box, then endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    MissingVideo,
    MissingBox,
    MissingEndpoint,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingVideo => {
                write!(f, "Select a video before tracking.")
            }
            ValidationError::MissingBox => {
                write!(f, "Draw a bounding box on the first frame before tracking.")
            }
            ValidationError::MissingEndpoint => {
                write!(f, "Configure your API URL first using the Configure API button.")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug)]
pub enum Error {
    /// A submission was attempted without its preconditions.
    Validation(ValidationError),
    /// A submission was attempted while another one is in flight.
    Busy,
    /// Catalog sample bytes could not be obtained.
    Fetch(String),
    /// The tracking service answered with a non-success status.
    Http { status: u16, message: String },
    /// The request never produced an HTTP response.
    Transport(String),
    /// The result could not be shown in place.
    Playback(String),
    HealthCheck(String),
    Decode(String),
    Io(std::io::Error),
    Settings(serde_json::Error),
}

impl Error {
    /// Message suitable for a banner, without the category prefix.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(e) => e.to_string(),
            Error::Busy => "A tracking request is already running".to_string(),
            Error::Fetch(msg)
            | Error::Transport(msg)
            | Error::Playback(msg)
            | Error::HealthCheck(msg)
            | Error::Decode(msg) => msg.clone(),
            Error::Http { message, .. } => message.clone(),
            Error::Io(e) => e.to_string(),
            Error::Settings(e) => e.to_string(),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Settings(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Busy => write!(f, "Submission already in flight"),
            Error::Fetch(msg) => write!(f, "Fetch error: {}", msg),
            Error::Http { status, message } => write!(f, "HTTP {}: {}", status, message),
            Error::Transport(msg) => write!(f, "Transport error: {}", msg),
            Error::Playback(msg) => write!(f, "Playback error: {}", msg),
            Error::HealthCheck(msg) => write!(f, "Health check error: {}", msg),
            Error::Decode(msg) => write!(f, "Decode error: {}", msg),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Settings(e) => write!(f, "Settings error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Validation(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Settings(e) => Some(e),
            _ => None,
        }
    }
}
