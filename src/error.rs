//! Error types for fanflow.
//!
//! Every error here is a configuration fault. They are raised while a
//! simulation is being built or its config loaded, never while stepping.

use std::fmt;

/// Errors that can occur while configuring a simulation.
#[derive(Debug)]
pub enum ConfigError {
    /// Particle count was zero.
    ZeroParticleCount,
    /// Room geometry is degenerate or non-finite.
    InvalidGeometry(String),
    /// An obstacle does not fit the room or has a degenerate footprint.
    InvalidObstacle {
        /// Obstacle identifier.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
    /// A spawned or supplied particle is out of range.
    InvalidParticle {
        /// Index in the field.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },
    /// Failed to read or write a config file.
    Io(std::io::Error),
    /// Failed to parse a config file.
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroParticleCount => {
                write!(f, "Particle count must be at least 1. Use .with_particle_count() to set one.")
            }
            ConfigError::InvalidGeometry(msg) => write!(f, "Invalid room geometry: {}", msg),
            ConfigError::InvalidObstacle { name, reason } => {
                write!(f, "Invalid obstacle '{}': {}", name, reason)
            }
            ConfigError::InvalidParticle { index, reason } => {
                write!(f, "Invalid particle at index {}: {}", index, reason)
            }
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Result alias used by configuration entry points.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_messages() {
        let e = ConfigError::InvalidObstacle {
            name: "north".into(),
            reason: "zero width".into(),
        };
        assert_eq!(e.to_string(), "Invalid obstacle 'north': zero width");
        assert!(ConfigError::ZeroParticleCount.to_string().contains("at least 1"));
        let e = ConfigError::InvalidParticle {
            index: 4,
            reason: "temperature 7.5 outside [0, 1]".into(),
        };
        assert_eq!(e.to_string(), "Invalid particle at index 4: temperature 7.5 outside [0, 1]");
    }

    #[test]
    fn test_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: ConfigError = io.into();
        assert!(e.source().is_some());
        assert!(ConfigError::InvalidGeometry("x".into()).source().is_none());
    }
}
