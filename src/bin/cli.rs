use clap::{Parser, Subcommand};
use game_catalog_engine::{default_sources, CatalogEngine, EngineConfig, SearchRequest};

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(about = "Game Catalog Engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the configured catalogs
    Search {
        /// Search query (at least 2 characters)
        query: String,

        /// Maximum number of games returned
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Restrict to these source names (repeatable)
        #[arg(short, long)]
        source: Vec<String>,
    },

    /// List configured sources and their mirrors
    Sources,

    /// Show listing-cache statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let engine = CatalogEngine::new(default_sources(), EngineConfig::default());

    match cli.command {
        Commands::Search {
            query,
            limit,
            source,
        } => {
            println!("🔍 Searching for: {}", query);

            let outcome = engine
                .search(&SearchRequest {
                    query,
                    sources: source,
                    limit: Some(limit),
                })
                .await?;

            if outcome.games.is_empty() {
                println!("\nNo results.");
                return Ok(());
            }

            println!(
                "\n✅ {} games ({} before limit)",
                outcome.games.len(),
                outcome.total
            );
            for (i, game) in outcome.games.iter().enumerate() {
                println!("\n{}. {}", i + 1, game.name);
                for m in &game.sources {
                    let size = if m.file_size.is_empty() {
                        "?".to_string()
                    } else {
                        m.file_size.clone()
                    };
                    println!(
                        "   [{}] {} — {} ({})",
                        m.source,
                        m.upload_date.format("%Y-%m-%d"),
                        size,
                        m.download_url
                    );
                }
            }
        }

        Commands::Sources => {
            println!("📚 Configured sources:");
            for source in engine.sources() {
                println!("\n- {} ({})", source.name, source.url);
                for mirror in &source.additional_urls {
                    match &mirror.description {
                        Some(desc) => println!("    {} — {} [{}]", mirror.name, mirror.url, desc),
                        None => println!("    {} — {}", mirror.name, mirror.url),
                    }
                }
            }
        }

        Commands::Stats => {
            let stats = engine.cache_stats();

            println!("📊 Cache Statistics:");
            println!("   Total records: {}", stats.total_records);
            println!("   Fresh records: {}", stats.fresh_records);
            println!("   Stale records: {}", stats.stale_records);
        }
    }

    Ok(())
}
