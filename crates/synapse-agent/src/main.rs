//! Synapse — intelligence report analysis engine.
//! Entry point for the `synapse` binary.

mod config;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use synapse_common::collection::{find_study, load_studies, save_studies};
use synapse_common::StudyItem;
use synapse_graph::build_collection_graph;
use synapse_llm::{
    analyze_document, ask_contextual_question, generate_entity_context, generate_narrative,
    CognitiveGateway,
};
use synapse_ranker::{build_feed_with, FeedQuery, Priority};

#[derive(Debug, Parser)]
#[command(name = "synapse", version, about = "Cross-reference, rank and analyse intelligence reports")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score every study and print the ranked feed
    Rank {
        /// Study collection (.json, .yaml or .yml)
        studies: PathBuf,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        /// routine, moderate, high or critical
        #[arg(long, value_parser = parse_priority)]
        min_priority: Option<Priority>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Build the entity graph of a collection
    Graph {
        studies: PathBuf,
        /// Write the graph here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Extract an intelligence package from a raw document
    Analyze {
        file: PathBuf,
        /// Source channel label
        #[arg(long, default_value = "MANUAL")]
        source: String,
        /// Append the result as a new study to this collection
        #[arg(long)]
        into: Option<PathBuf>,
    },
    /// Generate a context card for one entity
    Dossier {
        entity: String,
        #[arg(long)]
        studies: PathBuf,
    },
    /// Ask a question grounded in the collection
    Ask {
        question: String,
        #[arg(long)]
        studies: PathBuf,
    },
    /// Link one study to the rest of the collection in a narrative
    Narrative {
        #[arg(long)]
        studies: PathBuf,
        /// Id of the current study
        #[arg(long)]
        current: String,
    },
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse(s).ok_or_else(|| format!("unknown priority '{s}'"))
}

fn load(path: &Path) -> anyhow::Result<Vec<StudyItem>> {
    load_studies(path).with_context(|| format!("loading studies from {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // stdout carries command output; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("synapse=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::Config::load()?;

    match cli.command {
        Command::Rank { studies, search, source, tag, min_priority, json } => {
            let collection = load(&studies)?;
            let query = FeedQuery { search, source, tag, min_priority };
            let feed = build_feed_with(&collection, &query, &config.scoring.weights);
            info!(studies = collection.len(), shown = feed.len(), "Collection ranked");
            if json {
                println!("{}", serde_json::to_string_pretty(&feed)?);
            } else {
                for entry in &feed {
                    println!(
                        "{:>4}  {:<8}  {:<12}  {}\n      {}",
                        entry.score.score,
                        entry.score.priority,
                        entry.study.id,
                        entry.study.display_title(),
                        entry.score.reason
                    );
                }
            }
        }
        Command::Graph { studies, out } => {
            let collection = load(&studies)?;
            let graph = build_collection_graph(&collection);
            info!(nodes = graph.nodes.len(), links = graph.links.len(), "Graph built");
            let rendered = serde_json::to_string_pretty(&graph)?;
            match out {
                Some(path) => std::fs::write(&path, rendered)
                    .with_context(|| format!("writing graph to {}", path.display()))?,
                None => println!("{rendered}"),
            }
        }
        Command::Analyze { file, source, into } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let gateway = CognitiveGateway::from_settings(&config.to_gateway_settings());
            let package = analyze_document(&gateway, &text, &source)
                .await
                .context("document analysis failed")?;
            println!("{}", serde_json::to_string_pretty(&package)?);

            if let Some(path) = into {
                let mut collection = if path.exists() { load(&path)? } else { Vec::new() };
                let study = StudyItem::new(package.title.clone(), source, package);
                info!(id = %study.id, collection = %path.display(), "Study appended");
                collection.push(study);
                save_studies(&path, &collection)?;
            }
        }
        Command::Dossier { entity, studies } => {
            let collection = load(&studies)?;
            let gateway = CognitiveGateway::from_settings(&config.to_gateway_settings());
            let card = generate_entity_context(
                &gateway,
                &entity,
                &collection,
                config.scoring.dossier_snippets,
            )
            .await;
            println!("{card}");
        }
        Command::Ask { question, studies } => {
            let collection = load(&studies)?;
            let gateway = CognitiveGateway::from_settings(&config.to_gateway_settings());
            println!("{}", ask_contextual_question(&gateway, &question, &collection).await);
        }
        Command::Narrative { studies, current } => {
            let collection = load(&studies)?;
            let current = find_study(&collection, &current)?;
            let gateway = CognitiveGateway::from_settings(&config.to_gateway_settings());
            println!("{}", generate_narrative(&gateway, current, &collection).await);
        }
    }

    Ok(())
}
