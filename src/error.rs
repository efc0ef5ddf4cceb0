use std::{fmt, num::ParseIntError};

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to a command handler. Failures to reach the engine are
/// not represented here: those are delivered as diagnostic text in the
/// [Reply](crate::Reply) itself.
#[derive(Debug)]
pub enum Error {
    /// Simple wrapper over all I/O related errors
    IoError(std::io::Error),
    /// A required command parameter was not supplied
    MissingParameter(String),
    /// An interface-scoped command was issued outside interface
    /// configuration mode, without an explicit interface
    NotInConfigMode,
    /// A parameter was supplied but could not be interpreted
    InvalidArgument(String),
    /// The engine replied, but the reply signals a failure. Contains the
    /// filtered reply text.
    EngineError(String),
    /// No handler is registered under this name
    UnknownCommand(String),
    /// The configuration file could not be loaded
    ConfigError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IoError(err) => write!(f, "IO operation failed: {}", err),
            Error::MissingParameter(name) => write!(f, "missing parameter '{}'", name),
            Error::NotInConfigMode => write!(
                f,
                "not in interface configuration mode, use 'interface <name>' first"
            ),
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::EngineError(reply) => write!(f, "{}", reply.trim_end()),
            Error::UnknownCommand(name) => write!(f, "unknown command '{}'", name),
            Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl Error {
    pub fn missing(name: &str) -> Self {
        Self::MissingParameter(name.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<ParseIntError> for Error {
    fn from(err: ParseIntError) -> Self {
        Error::InvalidArgument(format!("failed to parse as integer: {}", err))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}
