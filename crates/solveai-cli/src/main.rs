//! `solveai`: problem analysis, refinement and saved reports from the
//! terminal, plus the JSON API server.
//!
//! # Usage
//!
//! ```
//! solveai solve "My headphones always tangle" --strategy both --save
//! solveai reports list
//! solveai refine 1700000000000 2
//! solveai serve --port 8787
//! ```

mod refine;
mod render;
mod settings;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use settings::Settings;
use solveai_core::{
  analysis::ConceptId,
  input::{DEFAULT_CONCEPT_COUNT, ProblemInput, Strategy},
  report::{Report, ReportId},
  solver::Solver as _,
  store::ReportStore,
};
use solveai_gemini::GeminiClient;
use solveai_session::Session;
use solveai_store_sqlite::SqliteReportStore;
use tokio::{io::BufReader, net::TcpListener};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "solveai", author, version, about = "AI-assisted problem solving")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "solveai.toml", global = true)]
  config: PathBuf,

  /// Report database (overrides `store_path`).
  #[arg(long, global = true)]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Analyze a problem.
  Solve {
    problem:     String,
    #[arg(long, default_value = "")]
    domain:      String,
    #[arg(long, default_value = "")]
    constraints: String,
    /// existing, new or both.
    #[arg(long, default_value_t = Strategy::Both)]
    strategy:    Strategy,
    /// Number of new concepts to generate (1-6).
    #[arg(long, default_value_t = DEFAULT_CONCEPT_COUNT)]
    concepts:    u8,
    /// Save the analysis as a new report.
    #[arg(long)]
    save:        bool,
  },
  /// Browse saved reports.
  #[command(subcommand)]
  Reports(ReportsCommand),
  /// Chat about one concept of a saved report.
  Refine { report: String, concept: u32 },
  /// Suggest problems worth solving.
  Suggest { domain: Option<String> },
  /// Find underserved market niches.
  Niches { domain: Option<String> },
  /// Generate an image from a prompt.
  Image {
    prompt: String,
    /// Output file; the extension follows the image type if omitted.
    #[arg(short, long, default_value = "concept")]
    out:    PathBuf,
  },
  /// Serve the JSON API.
  Serve {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
  },
}

#[derive(Subcommand)]
enum ReportsCommand {
  /// List saved reports, most recent first.
  List,
  /// Print one report in full.
  Show { id: String },
  /// Fuzzy-search report titles.
  Find { query: String },
  /// Delete a report.
  Delete { id: String },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

type CliSession = Session<SqliteReportStore, GeminiClient>;

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let mut settings = Settings::load(&cli.config)?;
  if let Some(path) = cli.store {
    settings.store_path = settings::expand_tilde(&path);
  }

  match cli.command {
    Command::Solve { problem, domain, constraints, strategy, concepts, save } => {
      let input = ProblemInput {
        problem_description: problem,
        domain,
        constraints,
        strategy,
        concept_count: concepts,
      };
      let mut session = open_session(&settings).await?;
      session.submit(input).await?;
      if let Some(analysis) = session.analysis() {
        print!("{}", render::analysis(analysis));
      }
      if save {
        let id = session.save().await?;
        println!("\nSaved report {id}.");
      }
    }
    Command::Reports(cmd) => reports(&settings, cmd).await?,
    Command::Refine { report, concept } => {
      let mut session = open_session(&settings).await?;
      session.load_report(&ReportId::new(report))?;
      session.select_concept(ConceptId(concept))?;
      refine::run(&mut session, BufReader::new(tokio::io::stdin())).await?;
    }
    Command::Suggest { domain } => {
      let solver = GeminiClient::new(settings.gemini()?)?;
      let ideas = solver.suggest_problems(domain.as_deref().unwrap_or_default()).await;
      if ideas.is_empty() {
        eprintln!("No suggestions right now.");
      }
      for idea in ideas {
        println!("• {idea}");
      }
    }
    Command::Niches { domain } => {
      let solver = GeminiClient::new(settings.gemini()?)?;
      let niches = solver.discover_niches(domain.as_deref().unwrap_or_default()).await;
      if niches.is_empty() {
        eprintln!("No niches found.");
      }
      print!("{}", render::niches(&niches));
    }
    Command::Image { prompt, out } => {
      let solver = GeminiClient::new(settings.gemini()?)?;
      let image = solver
        .generate_image(&prompt)
        .await
        .context("the image model returned no image")?;
      let path = if out.extension().is_some() { out } else { out.with_extension(image.extension()) };
      let bytes = image.decode().context("decoding image data")?;
      std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
      println!("Wrote {}", path.display());
    }
    Command::Serve { host, port } => {
      let session = open_session(&settings).await?;
      let app = solveai_api::api_router(solveai_api::shared(session));
      let address = format!(
        "{}:{}",
        host.unwrap_or(settings.host),
        port.unwrap_or(settings.port)
      );

      tracing::info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
      axum::serve(listener, app).await.context("server error")?;
    }
  }

  Ok(())
}

async fn open_store(settings: &Settings) -> Result<SqliteReportStore> {
  if let Some(dir) = settings.store_path.parent()
    && !dir.as_os_str().is_empty()
  {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
  }
  SqliteReportStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))
}

async fn open_session(settings: &Settings) -> Result<CliSession> {
  let store = open_store(settings).await?;
  let solver = GeminiClient::new(settings.gemini()?)?;
  Ok(Session::open(store, solver).await?)
}

// ─── Reports ──────────────────────────────────────────────────────────────────

fn find<'a>(reports: &'a [Report], id: &str) -> Result<&'a Report> {
  reports
    .iter()
    .find(|r| r.id.as_str() == id)
    .with_context(|| format!("report {id} not found"))
}

/// Reports whose title fuzzily matches `query`, best match first.
fn search<'a>(reports: &'a [Report], query: &str) -> Vec<&'a Report> {
  let matcher = SkimMatcherV2::default();
  let mut scored: Vec<_> = reports
    .iter()
    .filter_map(|r| {
      matcher
        .fuzzy_match(&r.data.problem_understanding.summary, query)
        .map(|score| (score, r))
    })
    .collect();
  scored.sort_by(|a, b| b.0.cmp(&a.0));
  scored.into_iter().map(|(_, r)| r).collect()
}

/// Delete `id` from `store`. Unknown ids are a no-op; returns whether the
/// report existed.
async fn delete<S: ReportStore>(store: &S, all: &[Report], id: &str) -> Result<bool> {
  let known = find(all, id).is_ok();
  store.delete(&ReportId::new(id)).await?;
  if known {
    tracing::info!(report = %id, "report deleted");
  }
  Ok(known)
}

async fn reports(settings: &Settings, cmd: ReportsCommand) -> Result<()> {
  let store = open_store(settings).await?;
  let all = store.list().await?;

  match cmd {
    ReportsCommand::List => {
      if all.is_empty() {
        println!("No saved reports.");
      }
      for report in &all {
        println!("{}", render::report_row(report));
      }
    }
    ReportsCommand::Show { id } => print!("{}", render::report(find(&all, &id)?)),
    ReportsCommand::Find { query } => {
      for report in search(&all, &query) {
        println!("{}", render::report_row(report));
      }
    }
    ReportsCommand::Delete { id } => {
      if delete(&store, &all, &id).await? {
        println!("Deleted report {id}.");
      } else {
        println!("No report {id}; nothing deleted.");
      }
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use solveai_core::report::Refinements;

  use super::*;

  fn report(id: &str, summary: &str) -> Report {
    let data = serde_json::from_value(serde_json::json!({
      "problem_understanding": {
        "summary": summary, "root_cause": "", "assumptions": [], "design_goals": []
      },
      "existing_solutions": [],
      "generated_concepts": [],
      "overall_recommendations": {
        "best_approach": "", "reason": "", "suggested_next_steps": []
      }
    }))
    .unwrap();
    Report { id: ReportId::from(id), timestamp: 0, data, refinements: Refinements::new() }
  }

  #[test]
  fn search_ranks_fuzzy_title_matches() {
    let all = vec![
      report("1", "Cold coffee at my desk"),
      report("2", "Headphone cables tangle"),
      report("3", "Noisy neighbours"),
    ];
    let hits = search(&all, "headcab");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id.as_str(), "2");
    assert!(search(&all, "zzzz").is_empty());
  }

  #[test]
  fn find_reports_unknown_ids() {
    let all = vec![report("1", "A")];
    assert!(find(&all, "1").is_ok());
    assert!(find(&all, "2").is_err());
  }

  #[tokio::test]
  async fn deleting_an_unknown_report_is_a_noop() {
    let store = SqliteReportStore::open_in_memory().await.unwrap();
    store.upsert(report("1", "Cold coffee")).await.unwrap();
    let all = store.list().await.unwrap();

    assert!(!delete(&store, &all, "2").await.unwrap());
    assert_eq!(store.list().await.unwrap().len(), 1);

    assert!(delete(&store, &all, "1").await.unwrap());
    assert!(store.list().await.unwrap().is_empty());
  }

  #[test]
  fn cli_parses_nested_commands() {
    let cli = Cli::try_parse_from(["solveai", "reports", "show", "42"]).unwrap();
    assert!(matches!(cli.command, Command::Reports(ReportsCommand::Show { ref id }) if id == "42"));

    let cli = Cli::try_parse_from([
      "solveai", "solve", "Tangles", "--strategy", "new", "--concepts", "4",
    ])
    .unwrap();
    assert!(matches!(
      cli.command,
      Command::Solve { strategy: Strategy::New, concepts: 4, save: false, .. }
    ));
  }
}
