//! Vocabulary-bounded skill matching.
//!
//! Text is split into maximal runs of `[a-zA-Z0-9+#.]`, so `c++`, `c#`
//! and `node.js` are single tokens while a multi-word term such as
//! `machine learning` can never match.
//!
//! A period belongs to the token class, so a skill that ends a sentence
//! keeps its period: `"python and sql."` yields the tokens `python`,
//! `and` and `sql.`, and only `python` matches a vocabulary containing
//! `sql`. Add the dotted form (`sql.`) to the vocabulary if such mentions
//! should count.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Built-in vocabulary used when the configuration does not supply one.
pub const DEFAULT_VOCABULARY: &[&str] = &[
    "python",
    "java",
    "c++",
    "tensorflow",
    "aws",
    "docker",
    "react",
    "nlp",
    "sql",
];

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"[a-zA-Z0-9+#.]+").expect("static token pattern"))
}

/// The set of recognised technical-skill terms, stored lower-case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    terms: BTreeSet<String>,
}

impl Vocabulary {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_VOCABULARY)
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(terms: Vec<String>) -> Self {
        Self::new(terms)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.terms.into_iter().collect()
    }
}

/// Returns the vocabulary terms that occur as whole tokens in `text`.
pub fn extract_skills(text: &str, vocabulary: &Vocabulary) -> BTreeSet<String> {
    token_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|token| vocabulary.contains(token))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn matches_case_insensitively() {
        let found = extract_skills("Built APIs in PYTHON, React and Docker", &Vocabulary::default());
        assert_eq!(found, set(&["docker", "python", "react"]));
    }

    #[test]
    fn trailing_period_stays_in_token() {
        // "Docker." is the token "docker.", which is not a vocabulary term.
        let found = extract_skills("Built services in PYTHON and Docker.", &Vocabulary::default());
        assert_eq!(found, set(&["python"]));
    }

    #[test]
    fn sentence_final_skill_needs_dotted_term() {
        let plain = Vocabulary::new(["python", "sql"]);
        assert_eq!(extract_skills("python and sql.", &plain), set(&["python"]));

        let dotted = Vocabulary::new(["python", "sql", "sql."]);
        assert_eq!(
            extract_skills("python and sql.", &dotted),
            set(&["python", "sql."])
        );
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(extract_skills("", &Vocabulary::default()).is_empty());
    }

    #[test]
    fn cpp_matches_only_as_whole_token() {
        let vocab = Vocabulary::default();
        assert_eq!(extract_skills("Expert in C++ templates", &vocab), set(&["c++"]));
        assert!(extract_skills("Expert in c++17 templates", &vocab).is_empty());
        assert!(extract_skills("Expert in c and c#", &vocab).is_empty());
    }

    #[test]
    fn substrings_do_not_match() {
        let vocab = Vocabulary::new(["java", "sql"]);
        assert!(extract_skills("javascript and mysql", &vocab).is_empty());
    }

    #[test]
    fn multi_word_terms_never_match() {
        let vocab = Vocabulary::new(["machine learning", "python"]);
        assert_eq!(
            extract_skills("machine learning with python", &vocab),
            set(&["python"])
        );
    }

    #[test]
    fn idempotent_and_order_independent() {
        let vocab = Vocabulary::default();
        let a = extract_skills("sql, react, python, sql", &vocab);
        let b = extract_skills("python react sql", &vocab);
        assert_eq!(a, b);
        assert_eq!(a, extract_skills("sql, react, python, sql", &vocab));
    }

    #[test]
    fn vocabulary_is_normalised() {
        let vocab = Vocabulary::new(["  Python ", "SQL", ""]);
        assert_eq!(vocab.len(), 2);
        assert!(vocab.contains("python"));
        assert!(vocab.contains("sql"));
    }
}
