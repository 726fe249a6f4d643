//! Marketfront CLI - drive the storefront from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Log in (the session survives between invocations)
//! market-cli auth login -e user@example.com -p secret
//!
//! # Browse the catalog
//! market-cli products list --page 0 --size 20
//! market-cli products search "mug"
//!
//! # Place an order from product id / quantity pairs
//! market-cli orders create --item 3:2 --item 7:1 --address "1 Main St"
//!
//! # Admin operations
//! market-cli products create --name "Mug" --description "Ceramic" \
//!     --price 12.50 --stock 25 --category "Home & Garden"
//! market-cli orders status 14 SHIPPED
//! ```
//!
//! # Environment Variables
//!
//! - `MARKET_API_URL` - Backend base URL (default: `http://localhost:8080/api`)
//! - `MARKET_STATE_PATH` - Session state file (default: `.market-cli.json`)
//! - `MARKET_HTTP_TIMEOUT_SECS` - Request timeout (default: 15)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use marketfront_client::{ApiClient, ClientConfig, FileStorage, Notify, Storage, TracingNotifier};
use marketfront_core::{OrderId, OrderStatus, ProductId};
use marketfront_store::AppStore;

mod commands;

use commands::orders::parse_item;

#[derive(Parser)]
#[command(name = "market-cli")]
#[command(author, version, about = "Marketfront storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, register, and manage the profile
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Browse and manage the product catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Place and manage orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Register a new account
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    /// Log out and clear the local session
    Logout,
    /// Show the current user's profile
    Whoami,
    /// Update profile fields
    Update {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
    /// Show a single product
    Get { id: ProductId },
    /// Search by name or category
    Search {
        query: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
    /// Create a product (admin only)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long)]
        stock: u32,
        #[arg(long)]
        category: String,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        sku: Option<String>,
    },
    /// Update a product (admin only)
    Update {
        id: ProductId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        stock: Option<u32>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        sku: Option<String>,
    },
    /// Delete a product (admin only)
    Delete { id: ProductId },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List the current user's orders
    Mine,
    /// List all orders (admin only)
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
    /// Show a single order
    Get { id: OrderId },
    /// Place an order from product id:quantity pairs
    Create {
        /// Cart line as `<product-id>:<quantity>`, repeatable
        #[arg(long = "item", value_parser = parse_item, required = true)]
        items: Vec<(ProductId, u32)>,
        /// Free-text shipping address
        #[arg(long)]
        address: String,
    },
    /// Update an order's status (admin only)
    Status { id: OrderId, status: OrderStatus },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let state_path = std::env::var("MARKET_STATE_PATH")
        .unwrap_or_else(|_| ".market-cli.json".to_string());

    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(state_path));
    let notifier: Arc<dyn Notify> = Arc::new(TracingNotifier);
    let client = ApiClient::new(&config, storage, notifier)?;
    let store = AppStore::new(client.clone());

    match cli.command {
        Commands::Auth { action } => match action {
            AuthAction::Login { email, password } => {
                commands::auth::login(&store, email, password).await?;
            }
            AuthAction::Register {
                email,
                username,
                password,
                first_name,
                last_name,
            } => {
                commands::auth::register(&store, email, username, password, first_name, last_name)
                    .await?;
            }
            AuthAction::Logout => commands::auth::logout(&store).await,
            AuthAction::Whoami => commands::auth::whoami(&store).await?,
            AuthAction::Update {
                email,
                username,
                first_name,
                last_name,
            } => {
                commands::auth::update(&store, email, username, first_name, last_name).await?;
            }
        },
        Commands::Products { action } => match action {
            ProductAction::List { page, size } => {
                commands::products::list(&store, page, size).await?;
            }
            ProductAction::Get { id } => commands::products::get(&store, id).await?,
            ProductAction::Search { query, page, size } => {
                commands::products::search(&store, &query, page, size).await?;
            }
            ProductAction::Create {
                name,
                description,
                price,
                stock,
                category,
                image_url,
                sku,
            } => {
                commands::products::create(
                    &store,
                    name,
                    description,
                    price,
                    stock,
                    category,
                    image_url,
                    sku,
                )
                .await?;
            }
            ProductAction::Update {
                id,
                name,
                description,
                price,
                stock,
                category,
                image_url,
                sku,
            } => {
                commands::products::update(
                    &store,
                    id,
                    name,
                    description,
                    price,
                    stock,
                    category,
                    image_url,
                    sku,
                )
                .await?;
            }
            ProductAction::Delete { id } => commands::products::delete(&store, id).await?,
        },
        Commands::Orders { action } => match action {
            OrderAction::Mine => commands::orders::mine(&store).await?,
            OrderAction::List { page, size } => {
                commands::orders::list(&store, page, size).await?;
            }
            OrderAction::Get { id } => commands::orders::get(&store, id).await?,
            OrderAction::Create { items, address } => {
                commands::orders::create(&store, &client, &items, address).await?;
            }
            OrderAction::Status { id, status } => {
                commands::orders::status(&store, id, status).await?;
            }
        },
    }
    Ok(())
}
