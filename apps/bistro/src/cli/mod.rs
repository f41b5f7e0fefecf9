//! # Bistro CLI Module
//!
//! Command-line front-end for customers and staff.
//!
//! ## Available Commands
//!
//! - `login` / `register` / `logout` - Manage the stored session
//! - `menu` - Browse and manage menu items
//! - `category` - Manage menu categories
//! - `recipe` - Manage kitchen recipes
//! - `cart` - Show and edit the current cart
//! - `checkout` - Turn the cart into an order
//! - `order` - List orders and move kitchen status
//! - `dashboard` - Sales summary
//! - `watch` - Follow live cart and order updates from the hub

mod commands;

use crate::api::ClientError;
use crate::config::{Config, ConfigError};
use crate::hub::HubError;
use bistro_core::{BistroError, KitchenStatus, Money, PaymentMethod};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

pub use commands::*;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Hub(#[from] HubError),

    #[error(transparent)]
    Core(#[from] BistroError),

    /// The command cannot run in the current state.
    #[error("{0}")]
    Usage(String),
}

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Bistro - point-of-sale client
///
/// Browse the menu, build a cart, check out, and follow orders live.
#[derive(Parser, Debug)]
#[command(name = "bistro")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Storefront API root (overrides config and BISTRO_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Hub URL (overrides config and BISTRO_HUB_URL)
    #[arg(long, global = true)]
    pub hub_url: Option<String>,

    /// Path to the local state database
    #[arg(short = 'S', long, global = true)]
    pub state: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the access token
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Create an account and store the access token
    Register {
        /// Full name
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Forget the stored token and cart
    Logout,

    /// Browse and manage menu items
    Menu {
        #[command(subcommand)]
        action: MenuAction,
    },

    /// Manage menu categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Manage kitchen recipes
    Recipe {
        #[command(subcommand)]
        action: RecipeAction,
    },

    /// Show and edit the current cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },

    /// Place an order from the current cart
    Checkout {
        /// Customer name
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        phone: String,

        #[arg(short, long)]
        email: Option<String>,

        /// Payment method (cash, card, bank-transfer, e-wallet)
        #[arg(short = 'm', long, default_value = "cash")]
        payment: PaymentMethod,

        #[arg(long)]
        promo: Option<String>,

        #[arg(long)]
        note: Option<String>,
    },

    /// List orders and update kitchen status
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },

    /// Show the sales summary
    Dashboard {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Follow live cart and order updates until Ctrl+C
    Watch {
        /// Exit after this many updates
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MenuAction {
    /// List menu items
    List {
        #[arg(short, long)]
        category: Option<u64>,

        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Show one menu item with its options
    Show { id: u64 },

    /// Create a menu item
    Create {
        #[arg(short, long)]
        name: String,

        /// Price, e.g. 12.50
        #[arg(short, long)]
        price: Money,

        #[arg(short, long)]
        category: u64,

        #[arg(short, long)]
        description: Option<String>,

        /// Create the item as not available
        #[arg(long)]
        unavailable: bool,
    },

    /// Update fields of a menu item
    Update {
        id: u64,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        price: Option<Money>,

        #[arg(short, long)]
        category: Option<u64>,

        #[arg(short, long)]
        description: Option<String>,

        /// Set availability
        #[arg(long)]
        available: Option<bool>,
    },

    /// Delete a menu item
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum CategoryAction {
    /// List categories
    List,

    /// Create a category
    Create {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Rename or describe a category
    Update {
        id: u64,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a category
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum RecipeAction {
    /// List recipes
    List {
        #[arg(short, long)]
        menu_item: Option<u64>,
    },

    /// Show one recipe
    Show { id: u64 },

    /// Create a recipe
    Create {
        #[arg(short, long)]
        menu_item: u64,

        /// Ingredient as name:quantity[:unit]; repeatable
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,

        #[arg(long)]
        instructions: Option<String>,
    },

    /// Replace a recipe's ingredients and instructions
    Update {
        id: u64,

        /// Ingredient as name:quantity[:unit]; repeatable
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,

        #[arg(long)]
        instructions: Option<String>,
    },

    /// Delete a recipe
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum CartAction {
    /// Show the cart
    Show,

    /// Add a menu item
    Add {
        menu_item: u64,

        #[arg(short = 'n', long, default_value = "1")]
        quantity: u32,

        /// Selected option id; repeatable
        #[arg(short, long = "option")]
        options: Vec<u64>,

        #[arg(long)]
        note: Option<String>,
    },

    /// Change a line's quantity (0 removes it)
    Update {
        line: u64,

        #[arg(short = 'n', long)]
        quantity: u32,

        #[arg(long)]
        note: Option<String>,
    },

    /// Remove a line
    Remove { line: u64 },

    /// Remove every line
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum OrderAction {
    /// List orders
    List {
        /// Only orders with a line in this kitchen status
        #[arg(short, long)]
        status: Option<KitchenStatus>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Show one order
    Show { id: u64 },

    /// Move an order line to a new kitchen status
    Status {
        order: u64,
        item: u64,
        status: KitchenStatus,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

impl Cli {
    /// Resolve configuration: file, then environment, then flags.
    pub fn resolve_config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(url) = &self.api_url {
            config.api_url.clone_from(url);
        }
        if let Some(url) = &self.hub_url {
            config.hub_url = Some(url.clone());
        }
        if let Some(path) = &self.state {
            config.state_path.clone_from(path);
        }
        Ok(config)
    }
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CliError> {
    let config = cli.resolve_config()?;
    let ctx = Context::open(config, cli.json_mode)?;

    match cli.command {
        Some(Commands::Login { email, password }) => cmd_login(&ctx, email, password).await,
        Some(Commands::Register {
            name,
            email,
            password,
            phone,
        }) => cmd_register(&ctx, name, email, password, phone).await,
        Some(Commands::Logout) => cmd_logout(&ctx),
        Some(Commands::Menu { action }) => cmd_menu(&ctx, action).await,
        Some(Commands::Category { action }) => cmd_category(&ctx, action).await,
        Some(Commands::Recipe { action }) => cmd_recipe(&ctx, action).await,
        Some(Commands::Cart { action }) => {
            cmd_cart(&ctx, action.unwrap_or(CartAction::Show)).await
        }
        Some(Commands::Checkout {
            name,
            phone,
            email,
            payment,
            promo,
            note,
        }) => {
            let request = crate::api::CheckoutRequest {
                customer_name: name,
                phone,
                email,
                payment_method: payment,
                promo_code: promo,
                note,
            };
            cmd_checkout(&ctx, request).await
        }
        Some(Commands::Order { action }) => cmd_order(&ctx, action).await,
        Some(Commands::Dashboard { from, to }) => cmd_dashboard(&ctx, from, to).await,
        Some(Commands::Watch { limit }) => cmd_watch(&ctx, limit).await,
        None => {
            // No subcommand - show the cart by default
            cmd_cart(&ctx, CartAction::Show).await
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
