//! Batch ranking pipeline.
//!
//! # Flow
//!
//! 1. Resolve the job description (an uploaded file overrides pasted text).
//! 2. [`validate`] the inputs; nothing is extracted if validation fails.
//! 3. Build one [`ScoringEngine`] for the run.
//! 4. For each résumé, in order: extract text, score it.
//! 5. Sort into a [`RankingTable`].
//!
//! An extraction failure either becomes an error row (the default) or
//! aborts the whole batch when failure isolation is switched off.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::extract::{extract_text, DocumentKind, ExtractError};
use crate::progress::{RankProgressEvent, RankProgressReporter};
use crate::scoring::{candidate_name, ScoringEngine, WeightConfig};
use crate::skills::Vocabulary;
use crate::table::{RankingTable, RowOutcome};

/// Job description sources. When both are given the file wins.
#[derive(Debug, Clone, Default)]
pub struct JobDescriptionInput {
    pub text: Option<String>,
    pub file: Option<PathBuf>,
}

impl JobDescriptionInput {
    pub fn resolve(&self, max_bytes: usize) -> Result<String> {
        if let Some(path) = &self.file {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read job description: {}", path.display()))?;
            let name = path.to_string_lossy();
            let text = extract_text(&bytes, &name, max_bytes)
                .with_context(|| format!("Failed to read job description: {}", path.display()))?;
            return Ok(text);
        }
        Ok(self.text.clone().unwrap_or_default())
    }
}

/// User-correctable problems detected before any résumé is processed.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyJobDescription,
    NoResumes,
    InvalidWeight { name: &'static str, value: f64 },
    WeightsMustSumTo100 { total: f64 },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyJobDescription => {
                write!(f, "Please enter a job description before ranking resumes.")
            }
            ValidationError::NoResumes => write!(f, "Please upload at least one resume."),
            ValidationError::InvalidWeight { name, value } => write!(
                f,
                "The {} weight must be a non-negative number (got {}).",
                name, value
            ),
            ValidationError::WeightsMustSumTo100 { total } => write!(
                f,
                "Please ensure the total weight equals 100% (currently {}%).",
                total
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Checks the run preconditions in the order a user would fix them.
pub fn validate(
    job_description: &str,
    resume_count: usize,
    weights: &WeightConfig,
) -> Result<(), ValidationError> {
    if job_description.trim().is_empty() {
        return Err(ValidationError::EmptyJobDescription);
    }
    if resume_count == 0 {
        return Err(ValidationError::NoResumes);
    }
    if let Some((name, value)) = weights.invalid_weight() {
        return Err(ValidationError::InvalidWeight { name, value });
    }
    let total = weights.total();
    if (total - 100.0).abs() > 1e-9 {
        return Err(ValidationError::WeightsMustSumTo100 { total });
    }
    Ok(())
}

/// One uploaded résumé.
#[derive(Debug, Clone)]
pub struct ResumeInput {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RankOptions {
    pub isolate_failures: bool,
    pub max_resume_bytes: usize,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            isolate_failures: true,
            max_resume_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Everything needed for one ranking run.
#[derive(Debug, Clone)]
pub struct RankRequest {
    pub job_description: String,
    pub resumes: Vec<ResumeInput>,
    pub weights: WeightConfig,
    pub vocabulary: Vocabulary,
}

#[derive(Debug)]
pub enum RankError {
    Validation(ValidationError),
    Extraction { file: String, source: ExtractError },
}

impl std::fmt::Display for RankError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankError::Validation(e) => write!(f, "{}", e),
            RankError::Extraction { file, source } => write!(f, "{}: {}", file, source),
        }
    }
}

impl std::error::Error for RankError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RankError::Validation(e) => Some(e),
            RankError::Extraction { source, .. } => Some(source),
        }
    }
}

impl From<ValidationError> for RankError {
    fn from(e: ValidationError) -> Self {
        RankError::Validation(e)
    }
}

/// Validates `request` and ranks every résumé in it.
pub fn run(
    request: &RankRequest,
    options: &RankOptions,
    progress: &dyn RankProgressReporter,
) -> Result<RankingTable, RankError> {
    validate(
        &request.job_description,
        request.resumes.len(),
        &request.weights,
    )?;
    let engine = ScoringEngine::new(
        request.job_description.clone(),
        request.vocabulary.clone(),
        request.weights,
    );
    tracing::info!(
        resumes = request.resumes.len(),
        jd_skills = engine.jd_skills().len(),
        experience_required = engine.experience_required(),
        "ranking batch"
    );
    rank_resumes(&engine, &request.resumes, options, progress)
}

/// Extracts and scores each résumé sequentially, then sorts the results.
pub fn rank_resumes(
    engine: &ScoringEngine,
    resumes: &[ResumeInput],
    options: &RankOptions,
    progress: &dyn RankProgressReporter,
) -> Result<RankingTable, RankError> {
    let total = resumes.len() as u64;
    let mut outcomes = Vec::with_capacity(resumes.len());
    let mut failed = 0u64;

    for (i, resume) in resumes.iter().enumerate() {
        progress.report(RankProgressEvent::Scoring {
            file: resume.file_name.clone(),
            n: i as u64 + 1,
            total,
        });

        let outcome = match extract_text(&resume.bytes, &resume.file_name, options.max_resume_bytes) {
            Ok(text) => {
                let record = engine.score_resume(&resume.file_name, &text);
                tracing::debug!(
                    file = %resume.file_name,
                    chars = text.chars().count(),
                    final_score = record.final_score,
                    "scored resume"
                );
                RowOutcome::Scored(record)
            }
            Err(e) if options.isolate_failures => {
                tracing::warn!(file = %resume.file_name, error = %e, "resume extraction failed");
                progress.report(RankProgressEvent::Failed {
                    file: resume.file_name.clone(),
                    message: e.to_string(),
                });
                failed += 1;
                RowOutcome::Failed {
                    candidate_name: candidate_name(&resume.file_name),
                    error: e.to_string(),
                }
            }
            Err(e) => {
                return Err(RankError::Extraction {
                    file: resume.file_name.clone(),
                    source: e,
                })
            }
        };
        outcomes.push((resume.file_name.clone(), outcome));
    }

    progress.report(RankProgressEvent::Done {
        scored: total - failed,
        failed,
    });
    Ok(RankingTable::from_outcomes(outcomes))
}

/// Collects résumé files from explicit paths and directories.
///
/// Directories are walked recursively for supported document types and
/// sorted by path; explicit paths keep the order given.
pub fn collect_resume_paths(paths: &[PathBuf], dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out: Vec<PathBuf> = paths.to_vec();
    for dir in dirs {
        if !dir.is_dir() {
            anyhow::bail!("Not a directory: {}", dir.display());
        }
        let mut found: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_supported(p))
            .collect();
        found.sort();
        out.extend(found);
    }
    Ok(out)
}

fn is_supported(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(DocumentKind::from_file_name)
        .is_some()
}

/// Reads each file into a [`ResumeInput`] named after its file name.
pub fn load_resumes(paths: &[PathBuf]) -> Result<Vec<ResumeInput>> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read resume: {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(ResumeInput { file_name, bytes })
        })
        .collect()
}
