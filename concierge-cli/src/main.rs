// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Concierge Analyzer CLI
//!
//! Parses a concierge chat export and prints analysis results as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use concierge_analyzer::ConciergeAnalyzer;
use concierge_core::AnalyzerConfig;
use concierge_evals::ReferenceRestaurants;
use concierge_insights::{CrossRecommendationInsights, GlobalInsight, NetworkData};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "concierge")]
#[command(about = "Concierge Analyzer - chat transcript analysis", long_about = None)]
struct Cli {
    /// Chat transcript export
    transcript: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Persona reference table (CSV)
    #[arg(short, long)]
    personas: Option<PathBuf>,

    /// Reference restaurant names, one per line
    #[arg(short, long)]
    restaurants: Option<PathBuf>,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parsed conversations with classified messages
    Parse,

    /// One line per conversation: request and recommendation
    Summaries,

    /// Per-conversation timing and debug metrics
    Metrics,

    /// Extracted recommendations reconciled against the reference list
    Recommendations,

    /// Persona match and accuracy summary
    Personas,

    /// Global insights, networks and cross-recommendation associations
    Insights,

    /// Debug trace analysis of a single conversation
    Conversation {
        /// Conversation ID
        id: usize,
    },

    /// Full analysis report
    Report,
}

#[derive(Serialize)]
struct InsightsOutput {
    global_insights: Vec<GlobalInsight>,
    network: NetworkData,
    cross_recommendations: CrossRecommendationInsights,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "concierge=debug"
    } else {
        "concierge=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AnalyzerConfig::load(cli.config.clone()).context("Failed to load configuration")?;
    let mut analyzer = ConciergeAnalyzer::new(config);

    if let Some(path) = &cli.restaurants {
        analyzer.set_reference_restaurants(load_reference(path)?);
    }
    if let Some(path) = &cli.personas {
        let count = analyzer
            .load_personas_from_path(path)
            .with_context(|| format!("Failed to load personas from {}", path.display()))?;
        info!(personas = count, "Persona table ready");
    }

    let transcript = std::fs::read_to_string(&cli.transcript)
        .with_context(|| format!("Failed to read transcript {}", cli.transcript.display()))?;
    let conversations = analyzer
        .parse(&transcript)
        .context("Failed to parse transcript")?
        .len();
    info!(conversations, "Parsed transcript");

    match cli.command {
        Commands::Parse => print_json(&analyzer.conversations(), cli.pretty),
        Commands::Summaries => print_json(&analyzer.conversation_summaries(), cli.pretty),
        Commands::Metrics => print_json(&analyzer.get_conversation_metrics(), cli.pretty),
        Commands::Recommendations => {
            print_json(&analyzer.extract_restaurant_recommendations(), cli.pretty)
        }
        Commands::Personas => print_json(&analyzer.persona_analysis_summary(), cli.pretty),
        Commands::Insights => {
            let insights = InsightsOutput {
                global_insights: analyzer.generate_global_insights(),
                network: analyzer.generate_network_data(),
                cross_recommendations: analyzer.get_cross_recommendations_insights(),
            };
            print_json(&insights, cli.pretty)
        }
        Commands::Conversation { id } => {
            let analysis = analyzer
                .analyze_conversation_debug(id)
                .with_context(|| format!("Failed to analyze conversation {}", id))?;
            print_json(&analysis, cli.pretty)
        }
        Commands::Report => print_json(&analyzer.report(), cli.pretty),
    }
}

fn load_reference(path: &Path) -> Result<ReferenceRestaurants> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read restaurant list {}", path.display()))?;
    let reference = ReferenceRestaurants::from_sheet_names(content.lines());
    info!(restaurants = reference.len(), "Reference restaurants ready");
    Ok(reference)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", output);
    Ok(())
}
