use clap::{Parser, Subcommand};
use storefront_app::{config::AppConfig, context::AppContext};

mod account;
mod cart;
mod products;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront cart CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and load your cart
    Login(account::LoginArgs),

    /// Create an account and sign in
    Register(account::RegisterArgs),

    /// Sign out and forget the saved session
    Logout,

    /// Show who is signed in
    Whoami,

    /// List catalog products
    Products(products::ProductsArgs),

    /// Inspect or change your cart
    Cart(cart::CartCommand),
}

impl Cli {
    /// Parse arguments, reading a `.env` file first when present.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        let context = AppContext::from_config(&self.config)
            .map_err(|error| format!("{error}: {}", source_message(&error)))?;

        match self.command {
            Commands::Login(args) => account::login(&context, args).await,
            Commands::Register(args) => account::register(&context, args).await,
            Commands::Logout => account::logout(&context),
            Commands::Whoami => account::whoami(&context),
            Commands::Products(args) => products::run(&context, &args),
            Commands::Cart(command) => cart::run(&context, command).await,
        }
    }
}

/// Message of the innermost error in `error`'s source chain.
pub(crate) fn source_message(error: &(dyn std::error::Error + 'static)) -> String {
    let mut current = error;

    while let Some(source) = current.source() {
        current = source;
    }

    current.to_string()
}
