//! Shared domain enumerations aligned with persisted mode names.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Built-in content syntaxes a page may be written in.
///
/// Mode records store the name as text so operators can register additional
/// transformers without a schema change; this enum only covers the names the
/// engine ships transformers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    Markdown,
    Html,
    Plain,
}

impl ModeKind {
    pub const ALL: [ModeKind; 3] = [ModeKind::Markdown, ModeKind::Html, ModeKind::Plain];

    pub fn as_str(self) -> &'static str {
        match self {
            ModeKind::Markdown => "markdown",
            ModeKind::Html => "html",
            ModeKind::Plain => "plain",
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ModeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| DomainError::validation(format!("unknown mode name `{value}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_names_round_trip_through_from_str() {
        for kind in ModeKind::ALL {
            assert_eq!(kind.as_str().parse::<ModeKind>().unwrap(), kind);
        }
    }

    #[test]
    fn mode_names_are_case_sensitive() {
        assert!("Markdown".parse::<ModeKind>().is_err());
        assert!("".parse::<ModeKind>().is_err());
    }
}
