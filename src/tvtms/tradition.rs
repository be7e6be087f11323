//! Versification traditions

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// A numbering scheme a source Bible follows.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TraditionTag {
    #[default]
    English,
    Hebrew,
    Latin,
    Greek,
    Slavonic,
    Syriac,
    Armenian,
    Georgian,
    Coptic,
    Ethiopic,
}

impl TraditionTag {
    pub const ALL: &'static [TraditionTag] = &[
        TraditionTag::English,
        TraditionTag::Hebrew,
        TraditionTag::Latin,
        TraditionTag::Greek,
        TraditionTag::Slavonic,
        TraditionTag::Syriac,
        TraditionTag::Armenian,
        TraditionTag::Georgian,
        TraditionTag::Coptic,
        TraditionTag::Ethiopic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TraditionTag::English => "English",
            TraditionTag::Hebrew => "Hebrew",
            TraditionTag::Latin => "Latin",
            TraditionTag::Greek => "Greek",
            TraditionTag::Slavonic => "Slavonic",
            TraditionTag::Syriac => "Syriac",
            TraditionTag::Armenian => "Armenian",
            TraditionTag::Georgian => "Georgian",
            TraditionTag::Coptic => "Coptic",
            TraditionTag::Ethiopic => "Ethiopic",
        }
    }
}

impl fmt::Display for TraditionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tradition '{0}'")]
pub struct UnknownTradition(pub String);

impl FromStr for TraditionTag {
    type Err = UnknownTradition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        TraditionTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownTradition(name.to_string()))
    }
}

static LIST_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;\s]+").expect("valid regex"));

/// Parse the AncientVersions note column.
///
/// Entries are separated by commas, semicolons or whitespace. Detail after a name (`Greek=12:3`,
/// `Latin(Vulgate)`) is ignored, and so are words that aren't traditions: the column is notes,
/// not data.
pub fn parse_tradition_list(cell: &str) -> BTreeSet<TraditionTag> {
    LIST_SEPARATOR
        .split(cell.trim())
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let name: String = entry.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
            match name.parse::<TraditionTag>() {
                Ok(tag) => Some(tag),
                Err(_) => {
                    debug!(entry, "ignoring non-tradition entry in ancient versions column");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("hebrew".parse::<TraditionTag>(), Ok(TraditionTag::Hebrew));
        assert_eq!(" Greek ".parse::<TraditionTag>(), Ok(TraditionTag::Greek));
        assert!("Klingon".parse::<TraditionTag>().is_err());
    }

    #[test]
    fn test_tradition_list() {
        let list = parse_tradition_list("Hebrew, Greek=12:3; Latin(Vulgate) notes");
        assert_eq!(
            list.into_iter().collect::<Vec<_>>(),
            vec![TraditionTag::Hebrew, TraditionTag::Latin, TraditionTag::Greek]
        );
        assert!(parse_tradition_list("").is_empty());
    }
}
