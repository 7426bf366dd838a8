//! Output modes of the optimization pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OptimizeError;

/// How optimized program text is named and laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Interned strings, shortest names, no optional whitespace.
    #[default]
    Compact,
    /// Original names, indented output.
    Pretty,
    /// Interned strings, `<name>_<N>` names, indented output.
    Detailed,
}

impl OutputMode {
    pub const ALL: [OutputMode; 3] = [OutputMode::Compact, OutputMode::Pretty, OutputMode::Detailed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Detailed => "detailed",
        }
    }

    /// Whether repeated string literals are hoisted into locals.
    pub fn interns_strings(self) -> bool {
        matches!(self, Self::Compact | Self::Detailed)
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = OptimizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| OptimizeError::UnknownOutputMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for mode in OutputMode::ALL {
            assert_eq!(mode.to_string().parse::<OutputMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = "obfuscated".parse::<OutputMode>().unwrap_err();
        assert!(matches!(err, OptimizeError::UnknownOutputMode(ref name) if name == "obfuscated"));
        assert!("Compact".parse::<OutputMode>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&OutputMode::Detailed).unwrap();
        assert_eq!(json, "\"detailed\"");
        let back: OutputMode = serde_json::from_str("\"pretty\"").unwrap();
        assert_eq!(back, OutputMode::Pretty);
    }
}
