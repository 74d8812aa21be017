//! Agora CLI entry point.

use clap::Parser;

use agora::cli::{Cli, Commands};
use agora::infrastructure::config::ConfigLoader;
use agora::infrastructure::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging honors the project config when one is present; a broken
    // config falls back to defaults so the error itself gets logged.
    let logging_config = ConfigLoader::load()
        .map(|config| config.logging)
        .unwrap_or_default();
    let _guard = logging::init(&logging_config);

    let result = match cli.command {
        Commands::Init(args) => agora::cli::commands::init::execute(args, cli.json).await,
        Commands::Proposal(args) => agora::cli::commands::proposal::execute(args, cli.json).await,
        Commands::Vote(args) => agora::cli::commands::vote::execute(args, cli.json).await,
        Commands::Comment(args) => agora::cli::commands::comment::execute(args, cli.json).await,
        Commands::Execution(args) => agora::cli::commands::execution::execute(args, cli.json).await,
        Commands::Scan(args) => agora::cli::commands::scan::execute(args, cli.json).await,
        Commands::Serve(args) => agora::cli::commands::serve::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        agora::cli::handle_error(err, cli.json);
    }
}
