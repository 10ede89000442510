use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = edgeport::cli::Cli::parse();
    if let Err(e) = edgeport::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
