//! Range expansion
//!
//! A range is expanded into one coordinate per verse, ascending. Subverse tags on the end
//! points survive on the first and last element only: `Gen.1.1.b-3` is `1.1.b, 1.2, 1.3`.
//! A range inside a single verse walks the subverse tags instead: `Gen.1.1.a-1.c` is
//! `1.1.a, 1.1.b, 1.1.c`.

use super::types::{ReferenceSpec, SubverseTag, VerseRef};

impl ReferenceSpec {
    /// Expand into single coordinates. Anything but a range expands to itself.
    pub fn expand(&self) -> Vec<ReferenceSpec> {
        match self {
            ReferenceSpec::Range(start, end) => expand_range(start, end)
                .into_iter()
                .map(ReferenceSpec::Single)
                .collect(),
            other => vec![other.clone()],
        }
    }

    /// Number of coordinates [expand](ReferenceSpec::expand) would produce, without building
    /// them.
    pub fn expanded_len(&self) -> usize {
        match self {
            ReferenceSpec::Range(start, end) => range_len(start, end),
            _ => 1,
        }
    }
}

fn range_len(start: &VerseRef, end: &VerseRef) -> usize {
    if !start.same_chapter(end) || end.verse < start.verse {
        return 1;
    }
    if start.verse == end.verse {
        return match (start.subverse, end.subverse) {
            (Some(SubverseTag::Numeric(a)), Some(SubverseTag::Numeric(b))) if a <= b => {
                usize::from(b - a) + 1
            }
            (Some(SubverseTag::Alpha(a)), Some(SubverseTag::Alpha(b))) if a <= b => {
                (a..=b).count()
            }
            _ => 1,
        };
    }
    (end.verse - start.verse) as usize + 1
}

/// Every coordinate from `start` to `end` inclusive.
///
/// End points are expected to come from the parser (same chapter, ascending); anything else
/// yields just `start`.
pub fn expand_range(start: &VerseRef, end: &VerseRef) -> Vec<VerseRef> {
    if !start.same_chapter(end) || end.verse < start.verse {
        return vec![*start];
    }

    if start.verse == end.verse {
        return match (start.subverse, end.subverse) {
            (Some(SubverseTag::Numeric(a)), Some(SubverseTag::Numeric(b))) if a <= b => (a..=b)
                .map(|n| start.whole_verse().with_subverse(SubverseTag::Numeric(n)))
                .collect(),
            (Some(SubverseTag::Alpha(a)), Some(SubverseTag::Alpha(b))) if a <= b => (a..=b)
                .map(|c| start.whole_verse().with_subverse(SubverseTag::Alpha(c)))
                .collect(),
            _ => vec![*start],
        };
    }

    (start.verse..=end.verse)
        .map(|verse| {
            let subverse = if verse == start.verse {
                start.subverse
            } else if verse == end.verse {
                end.subverse
            } else {
                None
            };
            VerseRef {
                verse,
                subverse,
                ..*start
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tvtms::reference::parse_reference;

    fn expanded(raw: &str) -> Vec<String> {
        parse_reference(raw)
            .unwrap()
            .expand()
            .iter()
            .map(|spec| spec.to_string())
            .collect()
    }

    #[test]
    fn test_expands_ascending() {
        assert_eq!(
            expanded("Gen.50:24-26"),
            vec!["Gen.50.24", "Gen.50.25", "Gen.50.26"]
        );
    }

    #[test]
    fn test_end_point_subverses_are_kept() {
        assert_eq!(
            expanded("Gen.1.1.b-3"),
            vec!["Gen.1.1.b", "Gen.1.2", "Gen.1.3"]
        );
    }

    #[test]
    fn test_subverse_walk_within_one_verse() {
        assert_eq!(
            expanded("Gen.1.1.a-1.c"),
            vec!["Gen.1.1.a", "Gen.1.1.b", "Gen.1.1.c"]
        );
        assert_eq!(
            expanded("Gen.1.1.1-1.1.3"),
            vec!["Gen.1.1.1", "Gen.1.1.2", "Gen.1.1.3"]
        );
    }

    #[test]
    fn test_non_ranges_expand_to_themselves() {
        assert_eq!(expanded("Absent"), vec!["Absent"]);
        assert_eq!(expanded("Mat.15.6(15.5)"), vec!["Mat.15.6(15.5)"]);
    }

    #[test]
    fn test_expanded_len_matches_expansion() {
        for raw in ["Gen.50:24-26", "Gen.1.1.b-3", "Gen.1.1.a-1.c", "Gen.1.1.1-1.1.3", "Absent"] {
            let spec = parse_reference(raw).unwrap();
            assert_eq!(spec.expanded_len(), spec.expand().len(), "{}", raw);
        }
        let huge = parse_reference("Gen.1.1-4294967295").unwrap();
        assert_eq!(huge.expanded_len(), 4_294_967_295);
    }

    #[test]
    fn test_title_range() {
        assert_eq!(expanded("Psa.3.0-2"), vec!["Psa.3.0", "Psa.3.1", "Psa.3.2"]);
    }
}
