use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use gsignin::cli::commands::{self, DEFAULT_BIND};
use gsignin::logging;

#[derive(Parser)]
#[command(name = "gsignin", about = "Google sign-in via the OAuth2 authorization code grant")]
struct Cli {
    /// Path to config.toml (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the provider authorization URL
    AuthorizeUrl {
        /// Public URL the strategy is mounted at (callback = this + "oauth2callback")
        #[arg(long)]
        strategy_url: Option<String>,
    },

    /// Serve the sign-in redirect and callback endpoints
    Serve {
        /// Address to listen on
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: String,
        /// Public URL the strategy is mounted at (defaults to http://<bind>/google/)
        #[arg(long)]
        strategy_url: Option<String>,
        /// Exit after the first completed callback
        #[arg(long)]
        once: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("warning: logging disabled: {:#}", e);
    }

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::AuthorizeUrl { strategy_url } => {
            commands::cmd_authorize_url(config, strategy_url.as_deref())
        }
        Commands::Serve {
            bind,
            strategy_url,
            once,
        } => commands::cmd_serve(config, bind, strategy_url.as_deref(), *once),
    };

    if let Err(e) = result {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
