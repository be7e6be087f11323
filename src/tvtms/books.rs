//! Book catalog
//!
//! The closed set of book codes a TVTMS table may use. Codes follow the STEP
//! three-character convention (`Gen`, `1Sa`, `Sng`...). Extended books cover the additions to
//! Esther and Daniel, Baruch and the rest of the deuterocanon; they take part in mappings exactly
//! like canonical books.

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

macro_rules! book_catalog {
    ($( $variant:ident => $code:literal, $name:literal, $extended:literal; )*) => {
        /// A canonical book identifier.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum BookCode {
            $( $variant, )*
        }

        impl BookCode {
            /// Every book, in catalog order.
            pub const ALL: &'static [BookCode] = &[ $( BookCode::$variant, )* ];

            /// Canonical spelling of the code, as written in TVTMS cells.
            pub fn code(self) -> &'static str {
                match self {
                    $( BookCode::$variant => $code, )*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $( BookCode::$variant => $name, )*
                }
            }

            /// True for books outside the 66-book protestant canon.
            pub fn is_extended(self) -> bool {
                match self {
                    $( BookCode::$variant => $extended, )*
                }
            }
        }
    };
}

book_catalog! {
    Genesis => "Gen", "Genesis", false;
    Exodus => "Exo", "Exodus", false;
    Leviticus => "Lev", "Leviticus", false;
    Numbers => "Num", "Numbers", false;
    Deuteronomy => "Deu", "Deuteronomy", false;
    Joshua => "Jos", "Joshua", false;
    Judges => "Jdg", "Judges", false;
    Ruth => "Rut", "Ruth", false;
    FirstSamuel => "1Sa", "1 Samuel", false;
    SecondSamuel => "2Sa", "2 Samuel", false;
    FirstKings => "1Ki", "1 Kings", false;
    SecondKings => "2Ki", "2 Kings", false;
    FirstChronicles => "1Ch", "1 Chronicles", false;
    SecondChronicles => "2Ch", "2 Chronicles", false;
    Ezra => "Ezr", "Ezra", false;
    Nehemiah => "Neh", "Nehemiah", false;
    Esther => "Est", "Esther", false;
    Job => "Job", "Job", false;
    Psalms => "Psa", "Psalms", false;
    Proverbs => "Pro", "Proverbs", false;
    Ecclesiastes => "Ecc", "Ecclesiastes", false;
    SongOfSongs => "Sng", "Song of Songs", false;
    Isaiah => "Isa", "Isaiah", false;
    Jeremiah => "Jer", "Jeremiah", false;
    Lamentations => "Lam", "Lamentations", false;
    Ezekiel => "Ezk", "Ezekiel", false;
    Daniel => "Dan", "Daniel", false;
    Hosea => "Hos", "Hosea", false;
    Joel => "Jol", "Joel", false;
    Amos => "Amo", "Amos", false;
    Obadiah => "Oba", "Obadiah", false;
    Jonah => "Jon", "Jonah", false;
    Micah => "Mic", "Micah", false;
    Nahum => "Nam", "Nahum", false;
    Habakkuk => "Hab", "Habakkuk", false;
    Zephaniah => "Zep", "Zephaniah", false;
    Haggai => "Hag", "Haggai", false;
    Zechariah => "Zec", "Zechariah", false;
    Malachi => "Mal", "Malachi", false;
    Matthew => "Mat", "Matthew", false;
    Mark => "Mrk", "Mark", false;
    Luke => "Luk", "Luke", false;
    John => "Jhn", "John", false;
    Acts => "Act", "Acts", false;
    Romans => "Rom", "Romans", false;
    FirstCorinthians => "1Co", "1 Corinthians", false;
    SecondCorinthians => "2Co", "2 Corinthians", false;
    Galatians => "Gal", "Galatians", false;
    Ephesians => "Eph", "Ephesians", false;
    Philippians => "Php", "Philippians", false;
    Colossians => "Col", "Colossians", false;
    FirstThessalonians => "1Th", "1 Thessalonians", false;
    SecondThessalonians => "2Th", "2 Thessalonians", false;
    FirstTimothy => "1Ti", "1 Timothy", false;
    SecondTimothy => "2Ti", "2 Timothy", false;
    Titus => "Tit", "Titus", false;
    Philemon => "Phm", "Philemon", false;
    Hebrews => "Heb", "Hebrews", false;
    James => "Jas", "James", false;
    FirstPeter => "1Pe", "1 Peter", false;
    SecondPeter => "2Pe", "2 Peter", false;
    FirstJohn => "1Jn", "1 John", false;
    SecondJohn => "2Jn", "2 John", false;
    ThirdJohn => "3Jn", "3 John", false;
    Jude => "Jud", "Jude", false;
    Revelation => "Rev", "Revelation", false;
    Tobit => "Tob", "Tobit", true;
    Judith => "Jdt", "Judith", true;
    EstherGreek => "EsG", "Esther (Greek)", true;
    Wisdom => "Wis", "Wisdom of Solomon", true;
    Sirach => "Sir", "Sirach", true;
    Baruch => "Bar", "Baruch", true;
    LetterOfJeremiah => "LJe", "Letter of Jeremiah", true;
    SongOfThreeYouths => "S3Y", "Song of the Three Youths", true;
    Susanna => "Sus", "Susanna", true;
    BelAndTheDragon => "Bel", "Bel and the Dragon", true;
    FirstMaccabees => "1Ma", "1 Maccabees", true;
    SecondMaccabees => "2Ma", "2 Maccabees", true;
    ThirdMaccabees => "3Ma", "3 Maccabees", true;
    FourthMaccabees => "4Ma", "4 Maccabees", true;
    FirstEsdras => "1Es", "1 Esdras", true;
    SecondEsdras => "2Es", "2 Esdras", true;
    PrayerOfManasseh => "Man", "Prayer of Manasseh", true;
    Psalm151 => "Ps2", "Psalm 151", true;
    Odes => "Oda", "Odes", true;
    PsalmsOfSolomon => "PsS", "Psalms of Solomon", true;
    DanielGreek => "DaG", "Daniel (Greek)", true;
    Laodiceans => "Lao", "Laodiceans", true;
}

static BY_CODE: Lazy<HashMap<String, BookCode>> = Lazy::new(|| {
    BookCode::ALL
        .iter()
        .map(|book| (book.code().to_ascii_lowercase(), *book))
        .collect()
});

impl BookCode {
    /// Look a code up case-insensitively (`gen`, `GEN` and `Gen` are the same book).
    pub fn from_code(code: &str) -> Option<BookCode> {
        BY_CODE.get(&code.to_ascii_lowercase()).copied()
    }
}

impl fmt::Display for BookCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for BookCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for BookCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        BookCode::from_code(&code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown book code '{}'", code)))
    }
}
