//! # SelectMatrix
//!
//! Ranks a batch of candidate résumés against one job description.
//!
//! Each résumé gets three sub-scores (TF-IDF text similarity, skill
//! overlap against a configurable vocabulary, and a years-of-experience
//! ratio) that are combined with percentage weights into a final score out
//! of 100. Results are sorted into a table that can be printed or exported
//! as XLSX, CSV or JSON.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌────────────┐   ┌───────────────┐   ┌─────────────┐
//! │  extract  │──▶│  scoring   │──▶│ rank (batch)  │──▶│ table/export│
//! │ PDF/TXT/  │   │ similarity │   │ validate,     │   │ terminal,   │
//! │ DOCX      │   │ skills,exp │   │ isolate, sort │   │ xlsx/csv    │
//! └───────────┘   └────────────┘   └───────┬───────┘   └─────────────┘
//!                                          │
//!                              ┌───────────┴──────────┐
//!                              ▼                      ▼
//!                        ┌──────────┐           ┌──────────┐
//!                        │   CLI    │           │   HTTP   │
//!                        │  (smx)   │           │  server  │
//!                        └──────────┘           └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! smx init                                   # write ./config/smx.toml
//! smx rank --jd job.txt --resumes-dir ./cvs  # print the ranking
//! smx rank --jd job.txt cvs/*.pdf --output ranked_resumes.xlsx
//! smx serve                                  # JSON API
//! ```
//!
//! ## Library use
//!
//! ```rust
//! use selectmatrix::scoring::{ScoringEngine, WeightConfig};
//! use selectmatrix::skills::Vocabulary;
//!
//! let engine = ScoringEngine::new(
//!     "Looking for 3 years experience in python and sql",
//!     Vocabulary::default(),
//!     WeightConfig::default(),
//! );
//! let record = engine.score_resume("alice.pdf", "I have 4 years experience in python, sql and react");
//! assert_eq!(record.skill_match_score, 100.0);
//! assert_eq!(record.candidate_name, "alice");
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`extract`] | Plain-text extraction from PDF, TXT, DOCX |
//! | [`skills`] | Vocabulary-bounded skill matching |
//! | [`experience`] | Years-of-experience heuristic |
//! | [`similarity`] | Two-document TF-IDF cosine similarity |
//! | [`scoring`] | Per-résumé scoring and weights |
//! | [`rank`] | Batch pipeline: validation, isolation, sorting |
//! | [`table`] | Ranked table and terminal rendering |
//! | [`export`] | XLSX / CSV / JSON export |
//! | [`server`] | HTTP API |

pub mod config;
pub mod experience;
pub mod export;
pub mod extract;
pub mod logging;
pub mod progress;
pub mod rank;
pub mod scoring;
pub mod server;
pub mod similarity;
pub mod skills;
pub mod stopwords;
pub mod table;
