use std::fmt;

use clipsync_types::{GridDims, StepPosition};

/// A position outside the grid's configured capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    OutOfRange {
        position: StepPosition,
        dims: GridDims,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { position, dims } => {
                write!(f, "step {} outside grid {}", position, dims)
            }
        }
    }
}

impl std::error::Error for GridError {}

/// Result type for host adapter operations.
pub type HostResult<T = ()> = Result<T, HostError>;

/// Error reported by the host document.
#[derive(Debug, Clone)]
pub struct HostError(pub String);

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for HostError {}

impl From<String> for HostError {
    fn from(s: String) -> Self {
        HostError(s)
    }
}

impl From<&str> for HostError {
    fn from(s: &str) -> Self {
        HostError(s.to_string())
    }
}

/// Error loading an explicit configuration file.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Toml(e) => write!(f, "TOML error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message_names_position_and_dims() {
        let err = GridError::OutOfRange {
            position: StepPosition::new(99, 0, 0),
            dims: GridDims::new(16, 32, 128),
        };
        assert_eq!(
            err.to_string(),
            "step (lane 99, column 0, row 0) outside grid 16x32x128"
        );
    }

    #[test]
    fn host_error_from_str() {
        let err: HostError = "track cannot hold notes".into();
        assert_eq!(err.to_string(), "track cannot hold notes");
    }
}
