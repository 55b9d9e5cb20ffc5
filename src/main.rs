// src/main.rs

use tm2bd::errors::SyncError;
use tm2bd::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();
    let verbose = args.verbose;

    if let Err(err) = run_main(args).await {
        let kind = err
            .downcast_ref::<SyncError>()
            .map(SyncError::kind)
            .unwrap_or("internal");
        if verbose {
            eprintln!("tm2bd error [{kind}]: {err:?}");
        } else {
            eprintln!("tm2bd error [{kind}]: {err}");
        }
        std::process::exit(1);
    }
}

async fn run_main(args: cli::CliArgs) -> anyhow::Result<()> {
    logging::init_logging(args.log_level, args.verbose)?;
    run(args).await
}
