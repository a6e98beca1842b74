use anyhow::{Context, Result};
use clap::Parser;
use geopost::{bootstrap, config, logging, store::ElasticStore};

#[derive(Parser)]
#[command(
    name = "bootstrap-indexes",
    about = "Create the post and user indexes with their mappings"
)]
struct Cli {
    /// Report missing indexes without creating them.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    config::init_config();
    logging::init_tracing();

    let config = config::get_config();
    let store = ElasticStore::new().context("failed to build Elasticsearch client")?;

    if cli.dry_run {
        let missing =
            bootstrap::missing_collections(&store, &config.post_index, &config.user_index)
                .await
                .context("failed to inspect indexes")?;
        if missing.is_empty() {
            println!("all indexes present");
        }
        for (name, schema) in missing {
            println!("missing index {name}:\n{}", serde_json::to_string_pretty(&schema)?);
        }
        return Ok(());
    }

    let created = bootstrap::ensure_collections(&store, &config.post_index, &config.user_index)
        .await
        .context("failed to create indexes")?;
    if created.is_empty() {
        println!("all indexes present");
    } else {
        println!("created: {}", created.join(", "));
    }
    Ok(())
}
