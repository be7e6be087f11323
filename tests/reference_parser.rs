//! Integration tests for the reference parser.

use rstest::rstest;
use versemap::tvtms::reference::{parse_reference, ParseErrorKind, ReferenceSpec};

fn expanded(raw: &str) -> Vec<String> {
    parse_reference(raw)
        .unwrap_or_else(|e| panic!("'{}' should parse: {}", raw, e))
        .expand()
        .iter()
        .map(|spec| spec.to_string())
        .collect()
}

#[rstest]
#[case("Gen.1.1", "Gen.1.1")]
#[case("Gen:1:1", "Gen.1.1")]
#[case("  Gen.1:1\t", "Gen.1.1")]
#[case("Est.A:1", "Est.A.1")]
#[case("1Sa.17.58", "1Sa.17.58")]
#[case("Psa.20:1.0", "Psa.20.0")]
#[case("Psa.51:0.2", "Psa.51.0.2")]
#[case("Gen.1.1.b", "Gen.1.1.b")]
#[case("Mat.15.6(5)", "Mat.15.6(15.5)")]
#[case("Mat.15.6[15.5]", "Mat.15.6(15.5)")]
#[case("Mat.15.6{15.5}", "Mat.15.6(15.5)")]
#[case("Dan.3.24(S3Y.1.1)", "Dan.3.24(S3Y.1.1)")]
#[case("Gen.50:24-26", "Gen.50.24-26")]
#[case("Gen.50:24-50:26", "Gen.50.24-26")]
#[case("Gen.1.1.a-1.c", "Gen.1.1.a-1.c")]
#[case("Absent", "Absent")]
#[case(" absent ", "Absent")]
fn test_parses_to_canonical_form(#[case] raw: &str, #[case] canonical: &str) {
    let spec = parse_reference(raw).unwrap();
    assert_eq!(spec.to_string(), canonical);
    assert_eq!(parse_reference(canonical).unwrap(), spec);
}

#[rstest]
#[case("", ParseErrorKind::Empty)]
#[case("   ", ParseErrorKind::Empty)]
#[case("Xyz.1.1", ParseErrorKind::UnknownBook)]
#[case("Gen.x.5", ParseErrorKind::BadChapterToken)]
#[case("Est.a.1", ParseErrorKind::BadChapterToken)]
#[case("Gen.0.1", ParseErrorKind::BadChapterToken)]
#[case("Gen.1", ParseErrorKind::BadVerseToken)]
#[case("Gen.1.1.ab", ParseErrorKind::BadVerseToken)]
#[case("Psa.20.5.0", ParseErrorKind::BadVerseToken)]
#[case("Gen.50.26-24", ParseErrorKind::BadVerseToken)]
#[case("Gen.31.55-32.1", ParseErrorKind::RangeSpansChapters)]
#[case("Mat.15.6(15.5", ParseErrorKind::UnbalancedBracket)]
#[case("Mat.15.6(15.5]", ParseErrorKind::UnbalancedBracket)]
#[case("Gen.1.1 x", ParseErrorKind::InvalidCharacter)]
#[case("Gen.1.1(1.2)x", ParseErrorKind::TrailingInput)]
fn test_rejects_malformed_cells(#[case] raw: &str, #[case] expected: ParseErrorKind) {
    let err = parse_reference(raw).unwrap_err();
    assert_eq!(err.kind, expected, "'{}': {}", raw, err);
}

#[rstest]
#[case("Gen.x.5", "x")]
#[case("Xyz.1.1", "Xyz")]
#[case("  Gen.x.5", "x")]
fn test_error_points_at_offending_text(#[case] raw: &str, #[case] offending: &str) {
    let err = parse_reference(raw).unwrap_err();
    assert_eq!(err.offending_text(), offending);
}

#[rstest]
#[case("Psa.3.1", &["Psa.3.1"])]
#[case("Gen.50:24-26", &["Gen.50.24", "Gen.50.25", "Gen.50.26"])]
#[case("Gen.1.1.b-3", &["Gen.1.1.b", "Gen.1.2", "Gen.1.3"])]
#[case("Gen.1.1.a-1.c", &["Gen.1.1.a", "Gen.1.1.b", "Gen.1.1.c"])]
#[case("Mat.15.6(15.5)", &["Mat.15.6(15.5)"])]
#[case("Absent", &["Absent"])]
fn test_expansion(#[case] raw: &str, #[case] expected: &[&str]) {
    assert_eq!(expanded(raw), expected);
}

#[test]
fn test_alternate_keeps_primary_as_coordinate() {
    let spec = parse_reference("Mat.15.6(15.5)").unwrap();
    assert_eq!(spec.primary().map(|v| v.to_string()).as_deref(), Some("Mat.15.6"));
    assert!(matches!(spec, ReferenceSpec::VariantAlternate { .. }));
    assert!(parse_reference("Absent").unwrap().primary().is_none());
}
