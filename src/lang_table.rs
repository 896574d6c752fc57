//! The language table: a static, finite catalog of natural-language keyword mappings.
//!
//! Each [`LanguageEntry`] binds a language code (`"en"`, `"hi"`, ...) to a mapping from the ten
//! canonical keywords to their surface spelling in that language. The table is pure data — the
//! lexer never special-cases a language code, it only ever consults the entry it was given.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// One of the ten fixed syntactic roles every language entry must spell out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalKeyword {
    If,
    Else,
    While,
    For,
    Function,
    Return,
    Var,
    True,
    False,
    Null,
}

impl CanonicalKeyword {
    const ALL: [CanonicalKeyword; 10] = [
        CanonicalKeyword::If,
        CanonicalKeyword::Else,
        CanonicalKeyword::While,
        CanonicalKeyword::For,
        CanonicalKeyword::Function,
        CanonicalKeyword::Return,
        CanonicalKeyword::Var,
        CanonicalKeyword::True,
        CanonicalKeyword::False,
        CanonicalKeyword::Null,
    ];
}

/// A single natural-language variant of the keyword set, plus its built-in function spellings.
///
/// `print` and `input` are not canonical keywords — only the ten control and literal keywords
/// are — but a language entry still needs to say what they're called so the compiler can
/// recognize them at a call site (see [`crate::compiler::Compiler`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageEntry {
    pub code: &'static str,
    pub name: &'static str,
    keywords: HashMap<&'static str, CanonicalKeyword>,
    surface: HashMap<CanonicalKeyword, &'static str>,
    pub print_name: &'static str,
    pub input_name: &'static str,
}

impl LanguageEntry {
    fn new(
        code: &'static str,
        name: &'static str,
        pairs: [(&'static str, CanonicalKeyword); 10],
        print_name: &'static str,
        input_name: &'static str,
    ) -> Self {
        let mut keywords = HashMap::with_capacity(10);
        let mut surface = HashMap::with_capacity(10);
        for (spelling, canonical) in pairs {
            keywords.insert(spelling, canonical);
            surface.insert(canonical, spelling);
        }
        debug_assert_eq!(keywords.len(), 10, "keyword surfaces must be pairwise distinct");
        for canonical in CanonicalKeyword::ALL {
            debug_assert!(surface.contains_key(&canonical), "missing mapping for {canonical:?}");
        }
        Self {
            code,
            name,
            keywords,
            surface,
            print_name,
            input_name,
        }
    }

    /// Classify an identifier-shaped lexeme as a canonical keyword, if this language spells it
    /// that way.
    pub fn keyword_for(&self, surface_text: &str) -> Option<CanonicalKeyword> {
        self.keywords.get(surface_text).copied()
    }

    /// The spelling this language uses for a canonical keyword.
    pub fn spelling_of(&self, keyword: CanonicalKeyword) -> &'static str {
        self.surface[&keyword]
    }

    /// Whether `name` is how this language spells the `print` built-in.
    pub fn is_print(&self, name: &str) -> bool {
        name == self.print_name
    }

    /// Whether `name` is how this language spells the `input` built-in.
    pub fn is_input(&self, name: &str) -> bool {
        name == self.input_name
    }
}

static TABLE: Lazy<Vec<LanguageEntry>> = Lazy::new(|| {
    use CanonicalKeyword::*;
    vec![
        LanguageEntry::new(
            "en",
            "English",
            [
                ("if", If),
                ("else", Else),
                ("while", While),
                ("for", For),
                ("function", Function),
                ("return", Return),
                ("var", Var),
                ("true", True),
                ("false", False),
                ("null", Null),
            ],
            "print",
            "input",
        ),
        LanguageEntry::new(
            "hi",
            "Hindi (transliterated)",
            [
                ("agar", If),
                ("varna", Else),
                ("jabtak", While),
                ("prateyek", For),
                ("kaarya", Function),
                ("vapas", Return),
                ("chal", Var),
                ("sach", True),
                ("galat", False),
                ("khaali", Null),
            ],
            "dikhaao",
            "lo",
        ),
        LanguageEntry::new(
            "es",
            "Spanish",
            [
                ("si", If),
                ("sino", Else),
                ("mientras", While),
                ("para", For),
                ("funcion", Function),
                ("retornar", Return),
                ("variable", Var),
                ("verdadero", True),
                ("falso", False),
                ("nulo", Null),
            ],
            "imprimir",
            "leer",
        ),
        LanguageEntry::new(
            "de",
            "German",
            [
                ("wenn", If),
                ("sonst", Else),
                ("waehrend", While),
                ("fuer", For),
                ("funktion", Function),
                ("zurueck", Return),
                ("variable", Var),
                ("wahr", True),
                ("falsch", False),
                ("nichts", Null),
            ],
            "drucke",
            "eingabe",
        ),
    ]
});

/// Reason a language code wasn't found; there's exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotFound;

/// Look up a language entry by its code (e.g. `"en"`, `"hi"`).
pub fn lookup(code: &str) -> Result<&'static LanguageEntry, NotFound> {
    TABLE.iter().find(|entry| entry.code == code).ok_or(NotFound)
}

/// All language entries, in registration order.
pub fn list_all() -> &'static [LanguageEntry] {
    &TABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_english() {
        let entry = lookup("en").unwrap();
        assert_eq!(entry.keyword_for("if"), Some(CanonicalKeyword::If));
        assert_eq!(entry.keyword_for("banana"), None);
    }

    #[test]
    fn lookup_rejects_unknown_code() {
        assert_eq!(lookup("xx"), Err(NotFound));
    }

    #[test]
    fn every_entry_has_pairwise_distinct_surfaces() {
        for entry in list_all() {
            assert_eq!(entry.keywords.len(), 10, "{} has duplicate surfaces", entry.code);
        }
    }

    #[test]
    fn hindi_print_builtin_is_dikhaao() {
        let entry = lookup("hi").unwrap();
        assert!(entry.is_print("dikhaao"));
        assert!(!entry.is_print("print"));
    }

    #[test]
    fn list_all_is_non_empty_and_ordered_by_registration() {
        let all = list_all();
        assert!(all.len() >= 4);
        assert_eq!(all[0].code, "en");
    }
}
