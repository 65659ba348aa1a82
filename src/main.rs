// src/main.rs

use provisioner::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        // `run` has already redacted the message.
        eprintln!("{}", provisioner::error_banner(&format!("{err:#}")));
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
