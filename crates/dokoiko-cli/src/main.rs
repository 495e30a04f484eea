mod search;

use clap::{Args, Parser, Subcommand};
use dokoiko_core::DEFAULT_RADIUS_M;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dokoiko-cli")]
#[command(about = "Search nearby places across Google Places and Yahoo! Local Search")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Geocode an address and list what is around it
    Search(SearchArgs),
    /// Show the category table and the provider filters each allows
    Categories,
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Address, place name, or a literal "lat,lng"
    #[arg(long)]
    address: String,
    #[arg(long, default_value = "")]
    category: String,
    /// Google place type; repeat for up to three
    #[arg(long = "type", value_name = "TYPE")]
    types: Vec<String>,
    /// Yahoo genre code; repeat for up to three
    #[arg(long = "genre", value_name = "CODE")]
    genres: Vec<String>,
    /// Search radius in metres
    #[arg(long, default_value_t = DEFAULT_RADIUS_M)]
    radius: u32,
    #[arg(long)]
    keyword: Option<String>,
    /// Load-more rounds to run after the first page
    #[arg(long, default_value_t = 0)]
    more: u32,
    /// Print the final view as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Search(args)) => {
            let config = dokoiko_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            search::run_search(&config, &args).await?;
        }
        Some(Commands::Categories) => {
            init_tracing("warn")?;
            search::run_categories()?;
        }
        None => println!("dokoiko-cli: try `dokoiko-cli search --address 大阪駅`"),
    }

    Ok(())
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(fallback: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
