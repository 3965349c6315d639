//! Per-résumé scoring: similarity, skill overlap, experience, weighted total.
//!
//! # Formula
//!
//! ```text
//! skill_match      = round2(100 × |jd_skills ∩ resume_skills| / max(|jd_skills|, 1))
//! experience_match = min(100, round2(100 × experience / max(experience_required, 1)))
//! final            = round2(w_sim/100 × similarity + w_skill/100 × skill_match
//!                           + w_exp/100 × experience_match)
//! ```
//!
//! Weights are applied literally. Checking that they sum to 100 is the
//! caller's job (see [`crate::rank::validate`]).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::experience::extract_experience;
use crate::similarity::similarity;
use crate::skills::{extract_skills, Vocabulary};

/// Rounds half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Percentage weights for the three sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    #[serde(default = "default_similarity_weight")]
    pub similarity: f64,
    #[serde(default = "default_skill_weight")]
    pub skill: f64,
    #[serde(default = "default_experience_weight")]
    pub experience: f64,
}

fn default_similarity_weight() -> f64 {
    20.0
}
fn default_skill_weight() -> f64 {
    50.0
}
fn default_experience_weight() -> f64 {
    30.0
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            similarity: default_similarity_weight(),
            skill: default_skill_weight(),
            experience: default_experience_weight(),
        }
    }
}

impl WeightConfig {
    pub fn total(&self) -> f64 {
        self.similarity + self.skill + self.experience
    }

    /// First weight that is negative, NaN or infinite, with its name.
    pub fn invalid_weight(&self) -> Option<(&'static str, f64)> {
        [
            ("similarity", self.similarity),
            ("skill", self.skill),
            ("experience", self.experience),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite() || *value < 0.0)
    }

    /// Combines the three sub-scores, rounded to two decimals.
    pub fn combine(&self, similarity: f64, skill: f64, experience: f64) -> f64 {
        round_to(
            self.similarity / 100.0 * similarity
                + self.skill / 100.0 * skill
                + self.experience / 100.0 * experience,
            2,
        )
    }
}

/// Scoring outcome for one résumé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRecord {
    pub candidate_name: String,
    pub similarity_score: f64,
    pub matched_skills: BTreeSet<String>,
    pub skill_match_score: f64,
    pub experience_years: f64,
    pub experience_match_score: f64,
    pub final_score: f64,
}

impl ScoringRecord {
    /// Matched skills joined with `", "`, or `None` when nothing matched.
    pub fn matched_skills_display(&self) -> String {
        if self.matched_skills.is_empty() {
            "None".to_string()
        } else {
            self.matched_skills
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

/// Candidate name shown in the table: the file name with `.pdf` removed.
pub fn candidate_name(file_name: &str) -> String {
    file_name.replace(".pdf", "")
}

fn skill_match_score(matched: usize, required: usize) -> f64 {
    round_to(100.0 * matched as f64 / required.max(1) as f64, 2)
}

fn experience_match_score(experience: f64, required: f64) -> f64 {
    round_to(100.0 * experience / required.max(1.0), 2).min(100.0)
}

/// Scores one résumé against a job description.
///
/// `jd_skills` is the job description's skill set as produced by
/// [`extract_skills`] with the same `vocabulary`. The candidate name is left
/// empty; [`ScoringEngine::score_resume`] fills it from the file name.
pub fn score(
    resume_text: &str,
    jd_text: &str,
    jd_skills: &BTreeSet<String>,
    vocabulary: &Vocabulary,
    weights: &WeightConfig,
) -> ScoringRecord {
    let experience_required = extract_experience(jd_text);
    score_with_requirement(
        resume_text,
        jd_text,
        jd_skills,
        experience_required,
        vocabulary,
        weights,
    )
}

fn score_with_requirement(
    resume_text: &str,
    jd_text: &str,
    jd_skills: &BTreeSet<String>,
    experience_required: f64,
    vocabulary: &Vocabulary,
    weights: &WeightConfig,
) -> ScoringRecord {
    let similarity_score = similarity(jd_text, resume_text);

    let resume_skills = extract_skills(resume_text, vocabulary);
    let matched_skills: BTreeSet<String> = jd_skills.intersection(&resume_skills).cloned().collect();
    let skill_match_score = skill_match_score(matched_skills.len(), jd_skills.len());

    let experience_years = extract_experience(resume_text);
    let experience_match_score = experience_match_score(experience_years, experience_required);

    let final_score = weights.combine(similarity_score, skill_match_score, experience_match_score);

    ScoringRecord {
        candidate_name: String::new(),
        similarity_score,
        matched_skills,
        skill_match_score,
        experience_years,
        experience_match_score,
        final_score,
    }
}

/// Job-description facts computed once per ranking run, plus the weights
/// and vocabulary every résumé is scored with. Immutable, so one engine can
/// be shared across threads.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    jd_text: String,
    jd_skills: BTreeSet<String>,
    experience_required: f64,
    vocabulary: Vocabulary,
    weights: WeightConfig,
}

impl ScoringEngine {
    pub fn new(jd_text: impl Into<String>, vocabulary: Vocabulary, weights: WeightConfig) -> Self {
        let jd_text = jd_text.into();
        let jd_skills = extract_skills(&jd_text, &vocabulary);
        let experience_required = extract_experience(&jd_text);
        Self {
            jd_text,
            jd_skills,
            experience_required,
            vocabulary,
            weights,
        }
    }

    pub fn jd_skills(&self) -> &BTreeSet<String> {
        &self.jd_skills
    }

    pub fn experience_required(&self) -> f64 {
        self.experience_required
    }

    pub fn weights(&self) -> &WeightConfig {
        &self.weights
    }

    /// Scores extracted résumé text and names the record after `file_name`.
    pub fn score_resume(&self, file_name: &str, resume_text: &str) -> ScoringRecord {
        let mut record = score_with_requirement(
            resume_text,
            &self.jd_text,
            &self.jd_skills,
            self.experience_required,
            &self.vocabulary,
            &self.weights,
        );
        record.candidate_name = candidate_name(file_name);
        record
    }
}
