//! Fracta: clinical metadata extraction from bone-fracture papers.
//! Entry point for the `fracta` binary.

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fracta_db::{Database, DbError, PaperRecord, PaperRepository};
use fracta_ingestion::PaperPipeline;
use fracta_llm::{
    build_router, BackendConfig, BackendKind, LlmRouter, LlmSectionExtractor, RoutingPolicy,
    SummaryConfig, SummaryEngine, Summarizer,
};

#[derive(Parser, Debug)]
#[command(name = "fracta", version, about = "Clinical metadata extraction from bone-fracture PDFs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyses one PDF, stores the result and prints the report.
    Analyze {
        #[arg(long)]
        pdf: PathBuf,
        /// SQLite file; defaults to `database.path` from fracta.toml.
        #[arg(long)]
        db: Option<PathBuf>,
        /// Regex extraction and lead-sentence summaries only.
        #[arg(long)]
        no_llm: bool,
    },
    /// Lists stored papers, newest first.
    List {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Prints one stored paper.
    Show {
        id: i64,
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn api_key(configured: &str, env_var: &str) -> String {
    if configured.is_empty() {
        std::env::var(env_var).unwrap_or_default()
    } else {
        configured.to_string()
    }
}

fn build_llm_router(config: &config::Config) -> LlmRouter {
    let policy = RoutingPolicy {
        local_only_mode: config.llm.is_local_only(),
        default_backend: config.llm.default_backend.clone(),
        local_backend:   config.llm.local_backend.clone(),
        audit:           config.security.audit_llm_calls,
    };

    let mut backends: Vec<BackendConfig> = Vec::new();

    if let Some(ref ollama) = config.llm.ollama {
        backends.push(BackendConfig {
            name:     "ollama".to_string(),
            kind:     BackendKind::Ollama,
            model:    ollama.model.clone(),
            api_key:  None,
            base_url: Some(ollama.base_url.clone()),
            timeout:  Duration::from_secs(ollama.timeout_secs),
        });
    }

    if let Some(ref openai) = config.llm.openai {
        let key = api_key(&openai.api_key, "FRACTA_OPENAI_API_KEY");
        if !key.is_empty() {
            backends.push(BackendConfig {
                name:     "openai".to_string(),
                kind:     BackendKind::OpenAi,
                model:    openai.model.clone(),
                api_key:  Some(key),
                base_url: None,
                timeout:  Duration::from_secs(openai.timeout_secs),
            });
        } else {
            warn!("OpenAI configured but no API key found (set llm.openai.api_key or FRACTA_OPENAI_API_KEY)");
        }
    }

    if let Some(ref anthropic) = config.llm.anthropic {
        let key = api_key(&anthropic.api_key, "FRACTA_ANTHROPIC_API_KEY");
        if !key.is_empty() {
            backends.push(BackendConfig {
                name:     "anthropic".to_string(),
                kind:     BackendKind::Anthropic,
                model:    anthropic.model.clone(),
                api_key:  Some(key),
                base_url: None,
                timeout:  Duration::from_secs(anthropic.timeout_secs),
            });
        } else {
            warn!("Anthropic configured but no API key found (set llm.anthropic.api_key or FRACTA_ANTHROPIC_API_KEY)");
        }
    }

    if let Some(ref compat) = config.llm.openai_compatible {
        let key = api_key(&compat.api_key, "FRACTA_COMPAT_API_KEY");
        backends.push(BackendConfig {
            name:     "openai_compatible".to_string(),
            kind:     BackendKind::OpenAiCompatible,
            model:    compat.model.clone(),
            api_key:  (!key.is_empty()).then_some(key),
            base_url: Some(compat.base_url.clone()),
            timeout:  Duration::from_secs(compat.timeout_secs),
        });
    }

    if backends.is_empty() {
        warn!("No LLM backends configured; falling back to regex extraction and lead summaries.");
    }

    build_router(backends, policy)
}

fn open_repository(db: Option<PathBuf>, config: &config::Config) -> Result<PaperRepository> {
    let path = db.unwrap_or_else(|| PathBuf::from(&config.database.path));
    let db = Database::open(&path)
        .with_context(|| format!("opening database {}", path.display()))?;
    Ok(PaperRepository::new(Arc::new(db)))
}

fn build_pipeline(config: &config::Config, papers: PaperRepository, no_llm: bool) -> PaperPipeline {
    let summary_cfg: SummaryConfig = (&config.summary).into();
    let pipeline_cfg = config.extraction.pipeline();

    let router = if no_llm || config.llm.is_disabled() {
        None
    } else {
        let router = build_llm_router(config);
        info!(backends = ?router.registered_backends(), mode = %config.llm.mode, "LLM router ready");
        (!router.is_empty()).then(|| Arc::new(router))
    };

    match router {
        Some(router) => PaperPipeline::new(
            Some(LlmSectionExtractor::new(router.clone(), config.extraction.extraction())),
            Summarizer::new(SummaryEngine::Llm(router), summary_cfg),
            papers,
            pipeline_cfg,
        ),
        None => {
            info!("LLM disabled");
            PaperPipeline::new(
                None,
                Summarizer::new(SummaryEngine::Lead, summary_cfg),
                papers,
                pipeline_cfg,
            )
        }
    }
}

async fn analyze(config: &config::Config, pdf: &Path, db: Option<PathBuf>, no_llm: bool) -> Result<()> {
    let papers = open_repository(db, config)?;
    let pipeline = build_pipeline(config, papers, no_llm);
    let report = pipeline.analyze(pdf).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Stored rows, newest first, as pretty JSON.
fn list_json(papers: &PaperRepository, limit: usize) -> Result<String> {
    let rows = papers.list(limit)?;
    Ok(serde_json::to_string_pretty(&rows)?)
}

/// One stored paper; an unknown id is `DbError::NotFound`.
fn show(papers: &PaperRepository, id: i64) -> fracta_db::Result<PaperRecord> {
    papers.find_by_id(id)?.ok_or(DbError::NotFound(id))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries JSON only.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fracta=info,warn")),
        )
        .init();

    let config = config::Config::load()?;

    match cli.command {
        Commands::Analyze { pdf, db, no_llm } => analyze(&config, &pdf, db, no_llm).await?,
        Commands::List { db, limit } => {
            println!("{}", list_json(&open_repository(db, &config)?, limit)?);
        }
        Commands::Show { id, db } => {
            let paper = show(&open_repository(db, &config)?, id)?;
            println!("{}", serde_json::to_string_pretty(&paper)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from(["fracta", "analyze", "--pdf", "a.pdf", "--no-llm"]).unwrap();
        match cli.command {
            Commands::Analyze { pdf, db, no_llm } => {
                assert_eq!(pdf, PathBuf::from("a.pdf"));
                assert!(db.is_none());
                assert!(no_llm);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_default_limit() {
        let cli = Cli::try_parse_from(["fracta", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List { limit: 20, db: None }));
    }

    #[test]
    fn test_analyze_requires_pdf() {
        assert!(Cli::try_parse_from(["fracta", "analyze"]).is_err());
    }

    #[test]
    fn test_router_skips_remote_without_key() {
        let mut config = config::Config::default();
        config.llm.anthropic = Some(config::ApiBackendConfig {
            api_key: String::new(),
            model: "claude".to_string(),
            timeout_secs: 10,
        });
        std::env::remove_var("FRACTA_ANTHROPIC_API_KEY");
        let router = build_llm_router(&config);
        assert_eq!(router.registered_backends(), vec!["ollama"]);
    }

    #[test]
    fn test_disabled_mode_uses_lead_summaries() {
        let mut config = config::Config::default();
        config.llm.mode = "disabled".to_string();
        let papers = PaperRepository::new(Arc::new(Database::open_in_memory().unwrap()));
        let pipeline = build_pipeline(&config, papers.clone(), false);
        assert_eq!(pipeline.summary_engine(), "lead");

        let config = config::Config::default();
        let pipeline = build_pipeline(&config, papers, true);
        assert_eq!(pipeline.summary_engine(), "lead");
    }

    #[test]
    fn test_database_path_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("override.sqlite");
        let config = config::Config::default();
        let repo = open_repository(Some(path.clone()), &config).unwrap();
        assert_eq!(repo.count().unwrap(), 0);
        assert!(path.exists());
    }

    fn stored(names: &[&str]) -> PaperRepository {
        let papers = PaperRepository::new(Arc::new(Database::open_in_memory().unwrap()));
        for name in names {
            papers
                .insert(&fracta_db::NewPaper {
                    filename: name.to_string(),
                    pdf_path: format!("/papers/{name}"),
                    region: "pelvis".to_string(),
                    ..Default::default()
                })
                .unwrap();
        }
        papers
    }

    #[test]
    fn test_show_unknown_id_is_not_found() {
        let papers = stored(&["a.pdf"]);
        assert!(matches!(show(&papers, 42), Err(DbError::NotFound(42))));
        assert_eq!(show(&papers, 1).unwrap().filename, "a.pdf");
    }

    #[test]
    fn test_list_json_newest_first() {
        let papers = stored(&["first.pdf", "second.pdf", "third.pdf"]);
        let json: serde_json::Value = serde_json::from_str(&list_json(&papers, 2).unwrap()).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["filename"], "third.pdf");
        assert_eq!(rows[1]["filename"], "second.pdf");
        assert_eq!(rows[0]["region"], "pelvis");
    }
}
