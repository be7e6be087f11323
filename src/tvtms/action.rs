//! Action vocabulary
//!
//!     Every TVTMS row names the operation that moves source text onto the standard numbering.
//!     The vocabulary is closed: a keyword not listed here fails the row at load time.
//!
//!     | Kind          | Keywords                                   | Operation   |
//!     |---------------|--------------------------------------------|-------------|
//!     | Merged        | Merged above, MergedAbove, Merged, Merge   | MergeInto   |
//!     | Renumber      | Renumber verse, RenumberVerse, Renumber    | RenumberTo  |
//!     | RenumberTitle | Renumber title, RenumberTitle              | RenumberTo  |
//!     | KeepVerse     | Keep verse, KeepVerse, Keep                | MoveText    |
//!     | MarkAbsent    | Empty verse, Missing verse, MarkAbsent,    | MarkAbsent  |
//!     |               | Absent                                     |             |
//!     | PsalmTitle    | Psalm title, PsalmTitle                    | MoveText    |
//!
//! Priority
//!
//!     Kinds are applied in rank order, lowest first. A later group reads the coordinates left
//!     behind by earlier ones, so the order changes the output: merges must be consolidated
//!     before anything is renumbered onto them. The order is data ([PriorityTable]) rather
//!     than match arms so it can be configured and so tests can run it reversed.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Merged,
    Renumber,
    RenumberTitle,
    KeepVerse,
    MarkAbsent,
    PsalmTitle,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action keyword '{0}'")]
pub struct UnknownAction(pub String);

impl ActionKind {
    pub const ALL: &'static [ActionKind] = &[
        ActionKind::Merged,
        ActionKind::Renumber,
        ActionKind::RenumberTitle,
        ActionKind::KeepVerse,
        ActionKind::MarkAbsent,
        ActionKind::PsalmTitle,
    ];

    /// Keywords accepted in the Action column, compared after [normalize_keyword].
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            ActionKind::Merged => &["merged above", "mergedabove", "merged", "merge"],
            ActionKind::Renumber => &["renumber verse", "renumberverse", "renumber"],
            ActionKind::RenumberTitle => &["renumber title", "renumbertitle"],
            ActionKind::KeepVerse => &["keep verse", "keepverse", "keep"],
            ActionKind::MarkAbsent => &[
                "empty verse",
                "missing verse",
                "markabsent",
                "absent",
            ],
            ActionKind::PsalmTitle => &["psalm title", "psalmtitle"],
        }
    }

    pub fn from_keyword(keyword: &str) -> Result<ActionKind, UnknownAction> {
        let normalized = normalize_keyword(keyword);
        ActionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.keywords().contains(&normalized.as_str()))
            .ok_or_else(|| UnknownAction(keyword.trim().to_string()))
    }

    pub fn label(self) -> &'static str {
        match self {
            ActionKind::Merged => "merged",
            ActionKind::Renumber => "renumber",
            ActionKind::RenumberTitle => "renumber-title",
            ActionKind::KeepVerse => "keep-verse",
            ActionKind::MarkAbsent => "mark-absent",
            ActionKind::PsalmTitle => "psalm-title",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lowercase and collapse runs of whitespace.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriorityError {
    #[error("action '{0}' appears more than once in the priority order")]
    Duplicate(ActionKind),
    #[error("action '{0}' is missing from the priority order")]
    Missing(ActionKind),
}

/// Application order of action groups. Rank is the position in the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityTable {
    order: Vec<ActionKind>,
}

impl PriorityTable {
    /// Build a table from a complete ordering of every action kind.
    pub fn new(order: Vec<ActionKind>) -> Result<Self, PriorityError> {
        for (index, kind) in order.iter().enumerate() {
            if order[..index].contains(kind) {
                return Err(PriorityError::Duplicate(*kind));
            }
        }
        if let Some(missing) = ActionKind::ALL.iter().find(|kind| !order.contains(kind)) {
            return Err(PriorityError::Missing(*missing));
        }
        Ok(PriorityTable { order })
    }

    pub fn rank(&self, kind: ActionKind) -> usize {
        self.order
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(self.order.len())
    }

    pub fn order(&self) -> &[ActionKind] {
        &self.order
    }

    /// Same kinds, opposite order.
    pub fn reversed(&self) -> PriorityTable {
        let mut order = self.order.clone();
        order.reverse();
        PriorityTable { order }
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        PriorityTable {
            order: vec![
                ActionKind::Merged,
                ActionKind::Renumber,
                ActionKind::KeepVerse,
                ActionKind::MarkAbsent,
                ActionKind::RenumberTitle,
                ActionKind::PsalmTitle,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert_eq!(
            ActionKind::from_keyword("Merged above"),
            Ok(ActionKind::Merged)
        );
        assert_eq!(
            ActionKind::from_keyword("  renumber   VERSE "),
            Ok(ActionKind::Renumber)
        );
        assert_eq!(
            ActionKind::from_keyword("Empty verse"),
            Ok(ActionKind::MarkAbsent)
        );
        assert_eq!(
            ActionKind::from_keyword("KeepVerse"),
            Ok(ActionKind::KeepVerse)
        );
        assert_eq!(
            ActionKind::from_keyword("Split verse"),
            Err(UnknownAction("Split verse".to_string()))
        );
    }

    #[test]
    fn test_keywords_do_not_overlap() {
        for kind in ActionKind::ALL {
            for keyword in kind.keywords() {
                assert_eq!(ActionKind::from_keyword(keyword), Ok(*kind));
            }
        }
    }

    #[test]
    fn test_default_priority_merges_first() {
        let table = PriorityTable::default();
        assert!(table.rank(ActionKind::Merged) < table.rank(ActionKind::Renumber));
        assert_eq!(table.order().len(), ActionKind::ALL.len());
        assert_eq!(PriorityTable::new(table.order().to_vec()), Ok(table));
    }

    #[test]
    fn test_title_actions_follow_verse_actions() {
        assert_eq!(
            PriorityTable::default().order(),
            &[
                ActionKind::Merged,
                ActionKind::Renumber,
                ActionKind::KeepVerse,
                ActionKind::MarkAbsent,
                ActionKind::RenumberTitle,
                ActionKind::PsalmTitle,
            ]
        );
    }

    #[test]
    fn test_priority_validation() {
        assert_eq!(
            PriorityTable::new(vec![ActionKind::Merged, ActionKind::Merged]),
            Err(PriorityError::Duplicate(ActionKind::Merged))
        );
        assert_eq!(
            PriorityTable::new(vec![ActionKind::Merged]),
            Err(PriorityError::Missing(ActionKind::Renumber))
        );
    }

    #[test]
    fn test_reversed() {
        let reversed = PriorityTable::default().reversed();
        assert!(reversed.rank(ActionKind::Renumber) < reversed.rank(ActionKind::Merged));
    }
}
