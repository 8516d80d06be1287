//! Command-line interface for insightify

use clap::{Parser, Subcommand};
use comfy_table::Table;
use insightify_profile::profile::{NO_COMPETITORS, NOT_AVAILABLE};
use insightify_profile::{
    AppState, CompanyProfile, CompanyProfiler, CompanyQuery, EntityId, FieldValue, ProfileConfig,
    ProfileError,
};
use insightify_utils::{Config, init_tracing};
use serde_json::Value;
use std::net::{IpAddr, SocketAddr};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "insightify")]
#[command(about = "Company profiles from Wikidata and Yahoo Finance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve POST /api/company_analysis
    Serve {
        /// Address to bind
        #[arg(long, env = "INSIGHTIFY_HOST", default_value = "127.0.0.1")]
        host: IpAddr,
        /// Port to bind
        #[arg(long, env = "INSIGHTIFY_PORT", default_value_t = 5000)]
        port: u16,
    },
    /// Look up a single company and print its profile
    Lookup {
        /// Company name
        name: String,
        /// Print JSON on a single line
        #[arg(long, conflicts_with = "table")]
        compact: bool,
        /// Print a summary table instead of JSON
        #[arg(long)]
        table: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let env = Config::from_env();

    let directive = match cli.command {
        Commands::Serve { .. } => "info",
        Commands::Lookup { .. } => "warn",
    };
    init_tracing(env.log_format(), directive);

    let config = ProfileConfig::from_env()?;
    let profiler = CompanyProfiler::from_config(&config)?;

    match cli.command {
        Commands::Serve { host, port } => {
            info!(app = %env.app_name, environment = %env.environment, "starting server");
            insightify_profile::serve(SocketAddr::new(host, port), AppState::new(profiler)).await?;
        }
        Commands::Lookup {
            name,
            compact,
            table,
        } => {
            let query = lookup_query(&name)?;
            let profile = profiler.profile(&query).await;
            if table {
                println!("{}", summary_table(&profile));
            } else if compact {
                println!("{}", serde_json::to_string(&profile)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            }
        }
    }

    Ok(())
}

fn lookup_query(name: &str) -> anyhow::Result<CompanyQuery> {
    match CompanyQuery::parse(name) {
        Ok(query) => Ok(query),
        Err(ProfileError::MissingCompanyName) => anyhow::bail!("company name must not be blank"),
        Err(e) => Err(e.into()),
    }
}

fn display(value: &FieldValue<Value>) -> String {
    match value {
        FieldValue::Available(Value::String(s)) => s.clone(),
        FieldValue::Available(other) => other.to_string(),
        FieldValue::NotAvailable => NOT_AVAILABLE.to_string(),
    }
}

fn summary_table(profile: &CompanyProfile) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);

    let or_marker = |value: Option<&str>| value.unwrap_or(NOT_AVAILABLE).to_string();

    table.add_row(vec!["Company".to_string(), profile.company_name.clone()]);
    table.add_row(vec![
        "Wikidata ID".to_string(),
        or_marker(profile.wikidata_id.as_ref().map(EntityId::as_str)),
    ]);
    table.add_row(vec![
        "Ticker".to_string(),
        or_marker(profile.ticker.as_deref()),
    ]);

    if let Some(details) = &profile.wikidata_details {
        for (label, value) in [
            ("Industry", &details.industry),
            ("Country", &details.country),
            ("Headquarters", &details.headquarters),
            ("Founded", &details.founded),
            ("Employees", &details.employees),
        ] {
            table.add_row(vec![
                label.to_string(),
                or_marker(value.as_available().map(String::as_str)),
            ]);
        }
    }

    if let Some(rounds) = &profile.funding_rounds {
        table.add_row(vec!["Funding Rounds".to_string(), rounds.len().to_string()]);
    }

    if let Some(snapshot) = &profile.financial_data {
        for (label, value) in snapshot
            .market_data
            .iter()
            .chain(&snapshot.financial_metrics)
        {
            table.add_row(vec![(*label).to_string(), display(value)]);
        }
    }

    let competitors = if profile.competitors.is_none_found() {
        NO_COMPETITORS.to_string()
    } else {
        profile.competitors.names().join(", ")
    };
    table.add_row(vec!["Competitors".to_string(), competitors]);

    table
}
