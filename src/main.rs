use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use shippo::{Client, Config};

/// shippo - command-line access to the Shippo API
///
/// Sends a single request and prints the decoded JSON response.
///
/// Examples:
///   shippo get addresses/ -p results=5
///   shippo post parcels/ --data '{"length": "5", "width": "5"}'
///   shippo poll batches/<id> --max-wait 120
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API token (also via SHIPPO_TOKEN)
    #[arg(long, env = "SHIPPO_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Pin requests to an API version (also via SHIPPO_API_VERSION)
    #[arg(long = "api-version", env = "SHIPPO_API_VERSION", global = true)]
    api_version: Option<String>,

    /// API URL (defaults to https://api.goshippo.com/)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    api_url: Option<String>,

    /// Log raw requests and responses
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch a resource
    Get(QueryArgs),

    /// Fetch a collection, following every page
    GetAll(QueryArgs),

    /// Delete a resource
    Delete(QueryArgs),

    /// Create a resource from a JSON document
    Post(BodyArgs),

    /// Update a resource from a JSON document
    Put(BodyArgs),

    /// Wait for an asynchronous job to finish
    Poll(PollArgs),
}

#[derive(clap::Args, Debug)]
struct QueryArgs {
    /// Path relative to the API URL, e.g. "shipments/"
    path: String,

    /// Query parameter, may be repeated
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,
}

#[derive(clap::Args, Debug)]
struct BodyArgs {
    /// Path relative to the API URL
    path: String,

    /// JSON request body
    #[arg(long, default_value = "{}")]
    data: String,
}

#[derive(clap::Args, Debug)]
struct PollArgs {
    #[command(flatten)]
    query: QueryArgs,

    /// Give up after this many seconds (default 70)
    #[arg(long = "max-wait", value_name = "SECS")]
    max_wait: Option<u64>,
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

fn as_pairs(params: &[(String, String)]) -> Vec<(&str, &str)> {
    params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}

fn parse_body(data: &str) -> Result<Value> {
    serde_json::from_str(data).context("--data is not valid JSON")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let token = cli
        .token
        .context("No API token given. Pass --token or set SHIPPO_TOKEN.")?;
    let mut config = Config::new(token).with_debug(cli.debug);
    if let Some(version) = cli.api_version {
        config = config.with_api_version(version);
    }
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url);
    }
    let mut client = Client::new(config)?;

    let value = match cli.command {
        Commands::Get(args) => client.get(&args.path, &as_pairs(&args.params)).await?,
        Commands::GetAll(args) => client.get_all(&args.path, &as_pairs(&args.params)).await?,
        Commands::Delete(args) => client.delete(&args.path, &as_pairs(&args.params)).await?,
        Commands::Post(args) => client.post(&args.path, &parse_body(&args.data)?).await?,
        Commands::Put(args) => client.put(&args.path, &parse_body(&args.data)?).await?,
        Commands::Poll(args) => {
            let max_wait = args.max_wait.map(Duration::from_secs);
            client
                .poll(&args.query.path, &as_pairs(&args.query.params), max_wait)
                .await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
