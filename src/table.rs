//! The ranked result table shared by the CLI, the exporters and the HTTP API.

use serde::Serialize;

use crate::scoring::ScoringRecord;

/// Column headers, in display and export order.
pub const HEADERS: [&str; 8] = [
    "Candidate Name",
    "Resume File",
    "Similarity Score (%)",
    "Matched Skills",
    "Skill Match Score (%)",
    "Experience (Years)",
    "Experience Match Score (%)",
    "Final Score (Out of 100)",
];

/// Result for one résumé: a score, or the reason it could not be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome {
    Scored(ScoringRecord),
    Failed { candidate_name: String, error: String },
}

impl RowOutcome {
    pub fn final_score(&self) -> Option<f64> {
        match self {
            RowOutcome::Scored(record) => Some(record.final_score),
            RowOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    /// 1-based position after sorting.
    pub rank: usize,
    pub resume_file: String,
    #[serde(flatten)]
    pub outcome: RowOutcome,
}

/// A single table cell, typed so spreadsheets keep numbers numeric.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Empty => Ok(()),
        }
    }
}

impl RankedRow {
    /// The row's cells in [`HEADERS`] order.
    pub fn cells(&self) -> Vec<Cell> {
        match &self.outcome {
            RowOutcome::Scored(r) => vec![
                Cell::Text(r.candidate_name.clone()),
                Cell::Text(self.resume_file.clone()),
                Cell::Number(r.similarity_score),
                Cell::Text(r.matched_skills_display()),
                Cell::Number(r.skill_match_score),
                Cell::Number(r.experience_years),
                Cell::Number(r.experience_match_score),
                Cell::Number(r.final_score),
            ],
            RowOutcome::Failed {
                candidate_name,
                error,
            } => vec![
                Cell::Text(candidate_name.clone()),
                Cell::Text(self.resume_file.clone()),
                Cell::Empty,
                Cell::Text(format!("ERROR: {}", error)),
                Cell::Empty,
                Cell::Empty,
                Cell::Empty,
                Cell::Empty,
            ],
        }
    }
}

/// Rows sorted by final score, highest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankingTable {
    pub rows: Vec<RankedRow>,
}

impl RankingTable {
    /// Sorts `(resume_file, outcome)` pairs and numbers them from 1.
    ///
    /// The sort is stable, so equal scores keep their input order. Failed
    /// rows go after every scored row.
    pub fn from_outcomes(outcomes: Vec<(String, RowOutcome)>) -> Self {
        let mut outcomes = outcomes;
        outcomes.sort_by(|(_, a), (_, b)| match (a.final_score(), b.final_score()) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        let rows = outcomes
            .into_iter()
            .enumerate()
            .map(|(i, (resume_file, outcome))| RankedRow {
                rank: i + 1,
                resume_file,
                outcome,
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r.outcome, RowOutcome::Failed { .. }))
            .count()
    }

    /// Aligned plain-text rendering with a leading `#` rank column.
    pub fn render(&self) -> String {
        let mut grid: Vec<Vec<String>> = Vec::with_capacity(self.rows.len() + 1);
        let mut header = vec!["#".to_string()];
        header.extend(HEADERS.iter().map(|h| h.to_string()));
        grid.push(header);
        for row in &self.rows {
            let mut line = vec![row.rank.to_string()];
            line.extend(row.cells().iter().map(|c| match c {
                Cell::Number(n) => format!("{:.2}", n),
                other => other.to_string(),
            }));
            grid.push(line);
        }

        let widths: Vec<usize> = (0..grid[0].len())
            .map(|col| {
                grid.iter()
                    .map(|line| line[col].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        for (i, line) in grid.iter().enumerate() {
            let rendered: Vec<String> = line
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:<width$}", cell, width = w))
                .collect();
            out.push_str(rendered.join("  ").trim_end());
            out.push('\n');
            if i == 0 {
                let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
                out.push_str(&rule.join("  "));
                out.push('\n');
            }
        }
        out
    }
}
