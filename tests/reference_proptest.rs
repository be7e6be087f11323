//! Property-based tests for reference parsing and range expansion
//!
//! Every coordinate the engine can emit must read back as itself, title verses and numeric
//! subverses included, and a range must expand to exactly the verses between its end points.

use proptest::prelude::*;
use versemap::tvtms::reference::{parse_reference, ChapterId, ReferenceSpec, SubverseTag, VerseRef};
use versemap::tvtms::BookCode;

fn book() -> impl Strategy<Value = BookCode> {
    prop::sample::select(BookCode::ALL.to_vec())
}

fn chapter() -> impl Strategy<Value = ChapterId> {
    prop_oneof![
        4 => (1u32..=150).prop_map(ChapterId::Numeric),
        1 => prop::sample::select(vec!['A', 'B', 'C', 'D', 'E', 'F']).prop_map(ChapterId::Letter),
    ]
}

fn subverse() -> impl Strategy<Value = Option<SubverseTag>> {
    prop::option::of(prop_oneof![
        prop::char::range('a', 'z').prop_map(SubverseTag::Alpha),
        // 0 is the title marker, not a subverse
        (1u8..=255).prop_map(SubverseTag::Numeric),
    ])
}

fn verse() -> impl Strategy<Value = u32> {
    prop_oneof![
        9 => 1u32..=176,
        1 => Just(0),
    ]
}

fn verse_ref() -> impl Strategy<Value = VerseRef> {
    (book(), chapter(), verse(), subverse()).prop_map(|(book, chapter, verse, subverse)| {
        VerseRef {
            book,
            chapter,
            verse,
            subverse,
        }
    })
}

proptest! {
    #[test]
    fn single_reference_round_trips(verse in verse_ref()) {
        let text = verse.to_string();
        let parsed = parse_reference(&text);
        prop_assert_eq!(parsed, Ok(ReferenceSpec::Single(verse)), "text: {}", text);
    }

    #[test]
    fn colon_separators_parse_the_same(verse in verse_ref()) {
        let dotted = verse.to_string();
        let coloned = dotted.replacen('.', ":", 2);
        prop_assert_eq!(parse_reference(&coloned), parse_reference(&dotted));
    }

    #[test]
    fn alternate_round_trips(primary in verse_ref(), alt_chapter in 1u32..=150, alt_verse in 1u32..=176) {
        let alternate = VerseRef::new(primary.book, ChapterId::Numeric(alt_chapter), alt_verse);
        let spec = ReferenceSpec::VariantAlternate { primary, alternate };
        prop_assert_eq!(parse_reference(&spec.to_string()), Ok(spec.clone()));
        prop_assert_eq!(spec.expand(), vec![spec]);
    }

    #[test]
    fn range_expands_to_every_verse(
        book in book(),
        chapter in 1u32..=150,
        start in 1u32..=150,
        len in 1u32..=25,
    ) {
        let end = start + len;
        let text = format!("{}.{}.{}-{}", book, chapter, start, end);
        let spec = parse_reference(&text).unwrap();
        prop_assert!(spec.is_range());

        let verses: Vec<u32> = spec
            .expand()
            .iter()
            .filter_map(|s| s.primary().map(|v| v.verse))
            .collect();
        prop_assert_eq!(verses, (start..=end).collect::<Vec<_>>());
        prop_assert_eq!(parse_reference(&spec.to_string()), Ok(spec));
    }

    #[test]
    fn parser_never_panics(raw in "[A-Za-z0-9.:()\\[\\]{} -]{0,24}") {
        let _ = parse_reference(&raw);
    }
}
