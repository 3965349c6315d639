//! Years-of-experience heuristic.
//!
//! Every "<N> year(s)/yr(s)" and "<N> month(s)" mention is summed, so a
//! résumé listing experience per job accumulates all of them. That
//! overcounting is expected behaviour for this score.

use regex::Regex;
use std::sync::OnceLock;

use crate::scoring::round_to;

/// Upper bound on the extracted total, in years.
pub const MAX_EXPERIENCE_YEARS: f64 = 50.0;

fn year_regex() -> &'static Regex {
    static YEARS: OnceLock<Regex> = OnceLock::new();
    YEARS.get_or_init(|| Regex::new(r"(?i)([0-9]+)\s*(?:years?|yrs?)").expect("static year pattern"))
}

fn month_regex() -> &'static Regex {
    static MONTHS: OnceLock<Regex> = OnceLock::new();
    MONTHS.get_or_init(|| Regex::new(r"(?i)([0-9]+)\s*months?").expect("static month pattern"))
}

/// Sums the captured counts, dividing each by `per_year` before adding.
fn sum_matches(re: &Regex, text: &str, per_year: f64) -> f64 {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .map(|n| n / per_year)
        .sum()
}

/// Estimated total years of experience mentioned in `text`, in `[0, 50]`.
pub fn extract_experience(text: &str) -> f64 {
    let total = sum_matches(year_regex(), text, 1.0) + sum_matches(month_regex(), text, 12.0);
    round_to(total, 1).min(MAX_EXPERIENCE_YEARS)
}
