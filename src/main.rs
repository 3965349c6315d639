//! # SelectMatrix CLI (`smx`)
//!
//! Ranks résumés against a job description from the command line, or serves
//! the same ranking over HTTP.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `smx init` | Write an example configuration file |
//! | `smx rank` | Rank résumés and print or export the table |
//! | `smx inspect <file>` | Show extracted text stats, skills and experience for one file |
//! | `smx skills` | List the active skill vocabulary |
//! | `smx serve` | Start the HTTP ranking service |
//! | `smx completions <shell>` | Print a shell completion script |
//!
//! ## Examples
//!
//! ```bash
//! # Rank every PDF in ./cvs against a job description file
//! smx rank --jd job.txt --resumes-dir ./cvs
//!
//! # Paste the job description and export a spreadsheet
//! smx rank --jd-text "Looking for 3 years of python" a.pdf b.pdf --output ranked_resumes.xlsx
//!
//! # Override weights for one run
//! smx rank --jd job.txt --resumes-dir ./cvs --similarity-weight 40 --skill-weight 40 --experience-weight 20
//! ```

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use selectmatrix::config::{self, Config};
use selectmatrix::export::{self, ExportFormat};
use selectmatrix::extract::{extract_text, DocumentKind};
use selectmatrix::experience::extract_experience;
use selectmatrix::logging;
use selectmatrix::progress::ProgressMode;
use selectmatrix::rank::{self, JobDescriptionInput, RankError, RankOptions, RankRequest};
use selectmatrix::server;
use selectmatrix::skills::{extract_skills, Vocabulary};

/// SelectMatrix: rank candidate résumés against a job description.
#[derive(Parser)]
#[command(
    name = "smx",
    about = "SelectMatrix: rank candidate résumés against a job description",
    version,
    long_about = "SelectMatrix scores each résumé by TF-IDF similarity to the job description, \
    overlap with the job's required skills and a years-of-experience ratio, combines the three \
    with percentage weights and prints or exports the ranked table."
)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults are used when it does not exist.
    #[arg(long, global = true, default_value = "./config/smx.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a commented example configuration to the `--config` path.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Rank résumés against a job description.
    ///
    /// Résumés may be PDF, plain text or DOCX files. When both `--jd` and
    /// `--jd-text` are given, the file wins.
    Rank {
        /// Résumé files to rank.
        resumes: Vec<PathBuf>,

        /// Directory to scan (recursively) for résumé files. Repeatable.
        #[arg(long = "resumes-dir")]
        resumes_dir: Vec<PathBuf>,

        /// Job description file (.txt, .pdf or .docx).
        #[arg(long)]
        jd: Option<PathBuf>,

        /// Job description text.
        #[arg(long = "jd-text")]
        jd_text: Option<String>,

        /// Similarity score weight (%).
        #[arg(long, allow_negative_numbers = true)]
        similarity_weight: Option<f64>,

        /// Skill match score weight (%).
        #[arg(long, allow_negative_numbers = true)]
        skill_weight: Option<f64>,

        /// Experience match score weight (%).
        #[arg(long, allow_negative_numbers = true)]
        experience_weight: Option<f64>,

        /// Replace the configured skill vocabulary (comma-separated).
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,

        /// Export the table to this file (.xlsx, .csv or .json).
        #[arg(long)]
        output: Option<PathBuf>,

        /// Export format; defaults to the output file's extension.
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,

        /// Print the table as JSON instead of aligned text.
        #[arg(long)]
        json: bool,

        /// Abort the whole batch on the first unreadable résumé.
        #[arg(long)]
        fail_fast: bool,

        /// Progress output on stderr. Defaults to `human` on a TTY, else `off`.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Show what the scorer sees in one file.
    Inspect {
        /// Résumé or job description file.
        file: PathBuf,
    },

    /// List the active skill vocabulary.
    Skills,

    /// Start the HTTP ranking service on `[server].bind`.
    Serve,

    /// Print a shell completion script.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Commands that don't require config
    match &cli.command {
        Commands::Init { force } => {
            return write_example_config(&cli.config, *force);
        }
        Commands::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "smx", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Rank {
            resumes,
            resumes_dir,
            jd,
            jd_text,
            similarity_weight,
            skill_weight,
            experience_weight,
            skills,
            output,
            format,
            json,
            fail_fast,
            progress,
        } => {
            let mut weights = cfg.weights;
            if let Some(w) = similarity_weight {
                weights.similarity = w;
            }
            if let Some(w) = skill_weight {
                weights.skill = w;
            }
            if let Some(w) = experience_weight {
                weights.experience = w;
            }
            let vocabulary = if skills.is_empty() {
                cfg.skills.vocabulary.clone()
            } else {
                Vocabulary::new(&skills)
            };

            let jd_input = JobDescriptionInput {
                text: jd_text,
                file: jd,
            };
            let job_description = jd_input.resolve(cfg.ranking.max_resume_bytes)?;
            let paths = rank::collect_resume_paths(&resumes, &resumes_dir)?;

            // Validate before reading any résumé.
            if let Err(e) = rank::validate(&job_description, paths.len(), &weights) {
                eprintln!("Warning: {}", e);
                std::process::exit(2);
            }

            let request = RankRequest {
                job_description,
                resumes: rank::load_resumes(&paths)?,
                weights,
                vocabulary,
            };
            let options = RankOptions {
                isolate_failures: cfg.ranking.isolate_failures && !fail_fast,
                max_resume_bytes: cfg.ranking.max_resume_bytes,
            };
            let reporter = progress
                .unwrap_or_else(ProgressMode::default_for_tty)
                .reporter();

            let table = match rank::run(&request, &options, reporter.as_ref()) {
                Ok(table) => table,
                Err(RankError::Validation(e)) => {
                    eprintln!("Warning: {}", e);
                    std::process::exit(2);
                }
                Err(e) => return Err(e).context("Ranking aborted"),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                print!("{}", table.render());
            }

            if table.failed_count() > 0 {
                eprintln!(
                    "Warning: {} of {} resumes could not be read",
                    table.failed_count(),
                    table.len()
                );
            }

            if let Some(path) = output {
                let format = format.unwrap_or_else(|| ExportFormat::from_path(&path));
                export::write_file(&table, &path, format)?;
                eprintln!("Exported {} rows to {}", table.len(), path.display());
            }
        }
        Commands::Inspect { file } => {
            run_inspect(&cfg, &file)?;
        }
        Commands::Skills => {
            for term in cfg.skills.vocabulary.iter() {
                println!("{}", term);
            }
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Init { .. } | Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}

fn write_example_config(path: &std::path::Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, config::EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn run_inspect(cfg: &Config, file: &std::path::Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let name = file.to_string_lossy();
    let text = extract_text(&bytes, &name, cfg.ranking.max_resume_bytes)
        .with_context(|| format!("Failed to extract {}", file.display()))?;
    let skills = extract_skills(&text, &cfg.skills.vocabulary);
    let kind = DocumentKind::from_file_name(&name)
        .map(|k| k.as_str())
        .unwrap_or("unknown");

    println!("file: {}", file.display());
    println!("kind: {}", kind);
    println!("characters: {}", text.chars().count());
    println!(
        "skills: {}",
        if skills.is_empty() {
            "None".to_string()
        } else {
            skills.into_iter().collect::<Vec<_>>().join(", ")
        }
    );
    println!("experience (years): {}", extract_experience(&text));
    Ok(())
}
