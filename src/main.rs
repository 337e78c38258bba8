// src/main.rs

use hookrun::{cli, config, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("hookrun error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    let raw = config::load_from_path(&args.config)?;
    logging::init_logging(args.log_level, raw.config.log_level)?;
    run(args, raw).await
}
