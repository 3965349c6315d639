//! Two-document TF-IDF cosine similarity.
//!
//! # Algorithm
//!
//! 1. Lower-case both documents and tokenize with `\b\w\w+\b`.
//! 2. Drop English stop words ([`crate::stopwords`]).
//! 3. Weight raw counts by smoothed IDF: `ln((1 + n) / (1 + df)) + 1`, `n = 2`.
//! 4. L2-normalise each vector and take the cosine, scaled to `[0, 100]`.
//!
//! The vector space is built from exactly the two documents being compared,
//! so a term shared by both gets IDF 1 and a term unique to one side gets
//! `1 + ln(1.5)`. If either vector is empty the similarity is 0.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::scoring::round_to;
use crate::stopwords::is_stop_word;

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("static word pattern"))
}

/// Term counts for one document after stop-word removal.
pub fn term_counts(doc: &str) -> BTreeMap<String, f64> {
    let lower = doc.to_lowercase();
    let mut counts = BTreeMap::new();
    for m in word_regex().find_iter(&lower) {
        let token = m.as_str();
        if is_stop_word(token) {
            continue;
        }
        *counts.entry(token.to_string()).or_insert(0.0) += 1.0;
    }
    counts
}

fn smoothed_idf(doc_count: f64, doc_freq: f64) -> f64 {
    ((1.0 + doc_count) / (1.0 + doc_freq)).ln() + 1.0
}

/// Unit-length TF-IDF vectors for the pair, keyed by term.
fn tfidf_pair(
    a: &BTreeMap<String, f64>,
    b: &BTreeMap<String, f64>,
) -> (BTreeMap<String, f64>, BTreeMap<String, f64>) {
    let weigh = |own: &BTreeMap<String, f64>, other: &BTreeMap<String, f64>| {
        let mut vec: BTreeMap<String, f64> = own
            .iter()
            .map(|(term, tf)| {
                let df = if other.contains_key(term) { 2.0 } else { 1.0 };
                (term.clone(), tf * smoothed_idf(2.0, df))
            })
            .collect();
        let norm = vec.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for w in vec.values_mut() {
                *w /= norm;
            }
        }
        vec
    };
    (weigh(a, b), weigh(b, a))
}

/// Cosine similarity of the unit vectors, in `[0, 1]`.
fn cosine(a: &BTreeMap<String, f64>, b: &BTreeMap<String, f64>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .filter_map(|(term, wa)| b.get(term).map(|wb| wa * wb))
        .sum();
    dot.clamp(0.0, 1.0)
}

/// Lexical similarity of `doc_a` and `doc_b` as a percentage, two decimals.
pub fn similarity(doc_a: &str, doc_b: &str) -> f64 {
    let counts_a = term_counts(doc_a);
    let counts_b = term_counts(doc_b);
    let (vec_a, vec_b) = tfidf_pair(&counts_a, &counts_b);
    round_to(cosine(&vec_a, &vec_b) * 100.0, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_documents_score_100() {
        let doc = "Senior Rust engineer building distributed storage engines";
        assert!((similarity(doc, doc) - 100.0).abs() < 0.01);
    }

    #[test]
    fn disjoint_documents_score_0() {
        assert_eq!(similarity("rust compilers", "gardening tulips"), 0.0);
    }

    #[test]
    fn stop_word_only_documents_fall_back_to_0() {
        assert_eq!(similarity("the and of", "is it the"), 0.0);
        assert_eq!(similarity("", ""), 0.0);
        assert_eq!(similarity("python developer", ""), 0.0);
    }

    #[test]
    fn symmetric() {
        let a = "python sql data pipelines";
        let b = "python react frontend sql";
        assert_eq!(similarity(a, b), similarity(b, a));
    }

    #[test]
    fn single_character_tokens_ignored() {
        let counts = term_counts("C R python");
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("python"), Some(&1.0));
    }

    #[test]
    fn stop_words_removed_and_counts_accumulate() {
        let counts = term_counts("The Python and the python SQL");
        assert_eq!(counts.get("python"), Some(&2.0));
        assert_eq!(counts.get("sql"), Some(&1.0));
        assert!(!counts.contains_key("the"));
    }

    #[test]
    fn partial_overlap_matches_reference() {
        // a = {python, sql}, b = {python, java}: shared term idf 1, unique idf 1 + ln 1.5.
        let unique = 1.0 + 1.5f64.ln();
        let expected = 1.0 / (1.0 + unique * unique);
        let got = similarity("python sql", "python java");
        assert!((got - round_to(expected * 100.0, 2)).abs() < 1e-9, "got {}", got);
    }
}
