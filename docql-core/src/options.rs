//! Compiler options.

use serde::{Deserialize, Serialize};

/// How malformed input is handled.
///
/// `Lenient` keeps the permissive behaviour: a malformed condition becomes an
/// always-true filter, an unsupported aggregate is skipped and a malformed
/// ORDER BY yields an empty sort. `Strict` reports each of those as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    #[default]
    Lenient,
    Strict,
}

impl ParseMode {
    pub fn is_strict(self) -> bool {
        self == ParseMode::Strict
    }
}

impl std::str::FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(ParseMode::Lenient),
            "strict" => Ok(ParseMode::Strict),
            other => Err(format!("unknown parse mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerOptions {
    #[serde(default)]
    pub mode: ParseMode,
}

impl CompilerOptions {
    pub fn strict() -> Self {
        Self {
            mode: ParseMode::Strict,
        }
    }
}
