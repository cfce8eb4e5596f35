//! Librio CLI - Terminal front end for the Librio catalog and cart

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use librio_core::storage::LocalStorage;
use librio_core::{AppContext, StoreConfig};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "librio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding the persisted catalog, cart, and preferences
    #[arg(
        long,
        global = true,
        env = "LIBRIO_DATA_DIR",
        default_value = "./librio_data"
    )]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a book to the catalog
    Publish {
        /// Book title
        #[arg(long)]
        title: String,

        /// Book author
        #[arg(long)]
        author: String,

        /// Unit price (must be greater than 0)
        #[arg(long, allow_hyphen_values = true)]
        price: Decimal,

        #[arg(long)]
        publisher: Option<String>,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        genre: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Cover image URL
        #[arg(long)]
        image: Option<String>,

        #[arg(long)]
        seller: Option<String>,
    },

    /// List published books
    List {
        /// Sort order (newest, oldest, price_asc, price_desc, title);
        /// defaults to the gallery_sort preference
        #[arg(long)]
        sort: Option<String>,

        /// Only books whose title or author contains this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one book
    Show {
        /// Item id
        id: String,
    },

    /// Update fields of a published book
    Update {
        /// Item id
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        price: Option<Decimal>,

        #[arg(long)]
        publisher: Option<String>,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        genre: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        image: Option<String>,

        /// available, reserved, or sold
        #[arg(long)]
        status: Option<String>,
    },

    /// Remove a book from the catalog
    Delete {
        /// Item id
        id: String,
    },

    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },

    /// Show or change user preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a book to the cart
    Add {
        /// Item id
        id: String,

        /// Units to add
        #[arg(short, long, default_value = "1", value_parser = parse_quantity)]
        quantity: u32,
    },

    /// Set the quantity of a cart line (0 removes it)
    Set {
        /// Item id
        id: String,

        quantity: u32,
    },

    /// Remove a book from the cart
    Remove {
        /// Item id
        id: String,
    },

    /// Empty the cart
    Clear,

    /// Show cart lines and totals
    Show,
}

#[derive(Subcommand)]
enum PrefsAction {
    /// Show all preferences
    Show,

    /// Set one preference
    Set {
        /// theme, currency, language, notifications, or gallery_sort
        key: String,

        value: String,
    },

    /// Restore default preferences
    Reset,
}

/// Parse and validate a quantity to add (must be at least 1)
fn parse_quantity(s: &str) -> Result<u32, String> {
    let n: u32 = s.parse().map_err(|_| format!("'{}' is not a valid quantity", s))?;
    if n < 1 {
        Err("quantity must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing on stderr so --json output stays parseable
    let filter = if cli.verbose {
        "librio_cli=debug,librio_core=debug"
    } else {
        "librio_cli=info,librio_core=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = StoreConfig::from_env().with_persist_catalog(true);
    let storage = Arc::new(LocalStorage::new(&cli.data_dir));
    tracing::debug!("Using data directory {}", cli.data_dir.display());
    let ctx = AppContext::start(config, storage).await;
    let json = cli.json;

    match cli.command {
        Commands::Publish {
            title,
            author,
            price,
            publisher,
            year,
            genre,
            description,
            image,
            seller,
        } => {
            let draft = commands::DraftArgs {
                title,
                author,
                price,
                publisher,
                year,
                genre,
                description,
                image,
                seller,
            };
            commands::publish(&ctx, draft, json).await
        }

        Commands::List { sort, search } => {
            commands::list(&ctx.store, sort.as_deref(), search.as_deref(), json).await
        }

        Commands::Show { id } => commands::show(&ctx.store, &id, json).await,

        Commands::Update {
            id,
            title,
            author,
            price,
            publisher,
            year,
            genre,
            description,
            image,
            status,
        } => {
            let patch = commands::PatchArgs {
                title,
                author,
                price,
                publisher,
                year,
                genre,
                description,
                image,
                status,
            };
            commands::update(&ctx.store, &id, patch, json).await
        }

        Commands::Delete { id } => commands::delete(&ctx.store, &id).await,

        Commands::Cart { action } => match action {
            CartAction::Add { id, quantity } => {
                commands::cart_add(&ctx.store, &id, quantity, json).await
            }
            CartAction::Set { id, quantity } => {
                commands::cart_set(&ctx.store, &id, quantity, json).await
            }
            CartAction::Remove { id } => commands::cart_remove(&ctx.store, &id).await,
            CartAction::Clear => commands::cart_clear(&ctx.store).await,
            CartAction::Show => commands::cart_show(&ctx.store, json).await,
        },

        Commands::Prefs { action } => match action {
            PrefsAction::Show => commands::prefs_show(&ctx.store, json).await,
            PrefsAction::Set { key, value } => {
                commands::prefs_set(&ctx.store, &key, &value, json).await
            }
            PrefsAction::Reset => commands::prefs_reset(&ctx.store, json).await,
        },
    }
}
