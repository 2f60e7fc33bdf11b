use tracing_subscriber::{EnvFilter, fmt};
use tracing::debug;

use rolegate::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Quiet by default; RUST_LOG=rolegate=debug for session and gateway traces.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))?;
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    debug!(target: "rolegate", "args={}", argv.len());

    let outcome = match cli::parse_args(&argv) {
        Ok(args) => cli::run(args).await,
        Err(e) => {
            eprintln!("{}", cli::usage("rolegate"));
            Err(e)
        }
    };
    if let Err(e) = outcome {
        eprintln!("{}: {}", e.code_str(), e.message());
        std::process::exit(1);
    }
    Ok(())
}
