//! Configuration source definitions

use std::fmt;
use std::path::PathBuf;

/// A layer that contributed to the loaded settings, lowest precedence first.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigSource {
    /// Built-in defaults
    Default,
    /// TOML file
    File(PathBuf),
    /// Environment variables with prefix
    EnvWithPrefix(String),
}

impl ConfigSource {
    /// Check if this source is file-based
    pub fn is_file_based(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("defaults"),
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::EnvWithPrefix(prefix) => write!(f, "env:{prefix}*"),
        }
    }
}
