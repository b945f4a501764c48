use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::cli::{get, login, logout, whoami};
use crate::common::debug;
use crate::config::{Config, Context, Initializer};

/// Invctl command
#[derive(Parser, Debug)]
#[command(version, propagate_version = true, subcommand_required = true)]
pub struct InvctlCommand {
    /// Client options
    #[command(flatten)]
    pub client: ClientOptions,
    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Client options
#[derive(Args, Debug)]
pub struct ClientOptions {
    /// Backend api base url
    #[arg(long, env = "INVCTL_API_URL", global = true)]
    pub api_url: Option<String>,
    /// Configuration file path
    #[arg(long, short = 'C', env = "INVCTL_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    /// Directory where the session is persisted
    #[arg(long, env = "INVCTL_DIR", global = true)]
    pub storage_dir: Option<PathBuf>,
    /// Request timeout
    #[arg(long, env = "INVCTL_TIMEOUT_MILLISECONDS", global = true)]
    pub timeout_milliseconds: Option<u64>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in
    Login(login::LoginCommand),
    /// Sign out
    Logout(logout::LogoutCommand),
    /// Show the signed in user
    Whoami(whoami::WhoamiCommand),
    /// Get a resource through the authenticated gateway
    Get(get::GetCommand),
}

/// Parse command line args
pub fn parse() -> InvctlCommand {
    InvctlCommand::parse()
}

/// Load configuration and restore the persisted session.
pub async fn initialize(options: ClientOptions) -> crate::Result<Context> {
    let ClientOptions {
        mut api_url,
        config,
        mut storage_dir,
        timeout_milliseconds,
    } = options;

    let mut initializer = match config {
        Some(path) => Initializer::load_config_file(path).await?,
        None => Initializer::from_config(Config::default()),
    };

    let mut overrides = {
        let mut config = Config::default();

        config.client.set_base_url(&mut api_url);
        config.client.set_timeout_milliseconds(timeout_milliseconds);
        config.session.set_storage_dir(&mut storage_dir);
        config
    };

    initializer.config.override_merge(&mut overrides);

    debug!("{:?}", initializer);

    initializer.init_dir().await?;
    initializer.build().await
}

impl Command {
    pub async fn run(self, context: Context) -> crate::Result<()> {
        match self {
            Command::Login(cmd) => cmd.run(context).await,
            Command::Logout(cmd) => cmd.run(context).await,
            Command::Whoami(cmd) => cmd.run(context).await,
            Command::Get(cmd) => cmd.run(context).await,
        }
    }
}
