use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use cmd::command::server;
use cmd::command::token;
use cmd::command::token::Token;
use cmd::config::Config;
use cmd::error::Error;
use cmd::error::Result;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

extern crate parse_duration;

#[derive(Parser, Clone)]
pub struct Cfg {
    #[arg(long)]
    config: PathBuf,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Run server
    Server(Cfg),
    /// Print an access token for a website
    Token(Token),
}

#[derive(Parser)]
#[command(propagate_version = true)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

fn load_config(path: &Path) -> Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path))
        .build()?;

    Ok(config.try_deserialize()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let Some(command) = args.command else {
        return Err(Error::BadRequest("no command specified".to_string()));
    };

    let cfg = match &command {
        Commands::Server(cfg) => load_config(&cfg.config)?,
        Commands::Token(args) => load_config(&args.config)?,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::level_filters::LevelFilter::from(cfg.log.level))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &command {
        Commands::Server(_) => {
            let version = env!("CARGO_PKG_VERSION");
            let hash = option_env!("BUILD_HASH").unwrap_or("dev-build");
            info!("Funnelprism v{version}-{hash}");

            server::start(cfg.try_into()?).await?;
        }
        Commands::Token(args) => {
            token::issue(args, cfg.try_into()?)?;
        }
    }

    Ok(())
}
