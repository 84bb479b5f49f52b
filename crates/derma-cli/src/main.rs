mod commands;
mod output;
mod repl;

use anyhow::Result;
use clap::{Parser, Subcommand};
use derma_app::App;
use derma_client::ApiClient;
use derma_core::config::API_URL_ENV;
use derma_storage::Storage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dermacart", version, about = "Skin analysis and skincare shop in the terminal")]
struct Cli {
    /// Working directory
    #[arg(short = 'c', long = "cwd")]
    working_dir: Option<PathBuf>,

    /// Backend base URL (overrides config)
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in with email or username
    Login {
        identifier: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        username: String,
        email: String,
        #[arg(short, long)]
        password: String,
        /// Repeat the password
        #[arg(long)]
        confirm: String,
        #[arg(long, default_value = "")]
        full_name: String,
    },
    /// Forget the saved session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Analyse a skin image
    Predict {
        image: PathBuf,
    },
    /// Ask the assistant; stored in a chat session when logged in
    Chat {
        message: String,
        /// Session to continue (defaults to the most recent)
        #[arg(short, long)]
        session: Option<String>,
        /// Start a new session
        #[arg(long)]
        new: bool,
        /// Analyse this image first and use the result as context
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// List chat sessions, or show one
    Sessions {
        id: Option<String>,
    },
    /// Delete a chat session
    DeleteChat {
        id: String,
    },
    /// Browse the catalogue
    Products {
        #[arg(long)]
        category: Option<String>,
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Cart kept on the backend for the logged-in account
    ServerCart {
        #[command(subcommand)]
        action: Option<ServerCartAction>,
    },
    /// Place an order for the cart
    Checkout(commands::CheckoutArgs),
    /// Show past orders
    Orders,
    /// Admin debug views: info, users, products, carts, tables
    Admin {
        resource: String,
    },
    /// Interactive shell (default)
    Shell,
}

#[derive(Subcommand, Debug)]
pub enum CartAction {
    List,
    Add { product_id: String },
    Inc { product_id: String },
    Dec { product_id: String },
    Remove { product_id: String },
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum ServerCartAction {
    List,
    Add {
        product_id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set an absolute quantity; 0 drops the line
    Set { product_id: String, quantity: u32 },
    Clear,
    /// Turn the server cart into an order
    Checkout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = derma_core::config::load_config(cli.working_dir.clone())
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_filter(cli.debug)))
        .with_target(false)
        .init();

    let db = derma_storage::Database::open(&config)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    db.run_migrations()
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    tracing::debug!(api = %config.api_root(), data = %config.data_path().display(), "starting");

    let client = Arc::new(ApiClient::new(&config));
    let app = App::start(client.clone(), Storage::new(Arc::new(db))).await?;

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => repl::run(app).await,
        Command::ServerCart { action } => {
            commands::server_cart(&app, &client, action.unwrap_or(ServerCartAction::List)).await
        }
        command => commands::run(app, command).await,
    }
}
