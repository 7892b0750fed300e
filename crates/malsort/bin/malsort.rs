#[macro_use]
extern crate log;

use clap::Parser;
use malsort::{
    application::pipeline::{self, Options},
    infrastructure::config::Config,
};

#[derive(Parser)]
#[clap(version, about)]
struct Opts {
    /// Path to config file
    #[clap(long)]
    config: Option<String>,
    /// Print the reordered entries without updating the list
    #[clap(long)]
    dry_run: bool,
}

fn init_logger() {
    let mut builder = env_logger::Builder::new();
    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        builder.parse_filters(&rust_log);
    } else {
        let level = std::env::var("MALSORT_LOG").unwrap_or_else(|_| "info".to_string());
        builder.parse_filters(&format!("malsort={level},malsort_tracker={level}"));
    }
    builder.init();
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_logger();

    let opts: Opts = Opts::parse();
    let config = Config::open(opts.config)?;

    debug!("config: {:?}", config);

    let rows = pipeline::run(
        &config,
        Options {
            dry_run: opts.dry_run,
        },
    )
    .await?;

    info!("done, {} entries in finish order", rows.len());

    Ok(())
}
