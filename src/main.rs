use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    init_tracing();

    let cli = snp_harvest::cli::Cli::parse();
    match cli.command {
        snp_harvest::cli::Commands::Serve { host, port } => {
            dotenvy::dotenv().ok();
            let served = match snp_harvest::cli::serve_address(host, port) {
                Ok((host, port)) => snp_harvest::api::serve(&host, port).await,
                Err(err) => Err(err),
            };
            match served {
                Ok(()) => std::process::ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("Error: {err}");
                    std::process::ExitCode::from(1)
                }
            }
        }
        _ => match snp_harvest::cli::run(cli).await {
            Ok(output) => {
                println!("{output}");
                std::process::ExitCode::SUCCESS
            }
            Err(err) => {
                if let Some(harvest_err) = err.downcast_ref::<snp_harvest::error::HarvestError>() {
                    eprintln!("Error: {harvest_err}");
                } else {
                    eprintln!("Error: {err}");
                }
                std::process::ExitCode::from(1)
            }
        },
    }
}
