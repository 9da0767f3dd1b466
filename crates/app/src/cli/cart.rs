use std::io;

use clap::{Args, Subcommand};
use storefront::{
    prelude::{CartChange, CartError, ProductId},
    summary::write_summary,
};
use storefront_app::context::AppContext;
use tracing::debug;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart
    Show,

    /// Add a product to the cart
    Add {
        /// Product id
        product: u32,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Set the quantity of a cart line
    Update {
        /// Product id
        product: u32,

        /// New quantity
        quantity: u32,
    },

    /// Remove a product from the cart
    Remove {
        /// Product id
        product: u32,
    },

    /// Empty the local cart view; the next load restores the saved cart
    Clear,
}

pub(crate) async fn run(context: &AppContext, command: CartCommand) -> Result<(), String> {
    let restored = context
        .restore()
        .await
        .map_err(|error| format!("{error}: {}", super::source_message(&error)))?;

    if restored.is_none() {
        return Err("not signed in; run `storefront login` first".to_string());
    }

    let cart = &context.cart;
    let mut notices = cart.subscribe();

    let change = match command.command {
        CartSubcommand::Show => Ok(CartChange::Unchanged),
        CartSubcommand::Add { product, quantity } => {
            cart.add_item(ProductId::new(product), quantity).await
        }
        CartSubcommand::Update { product, quantity } => {
            cart.update_quantity(ProductId::new(product), quantity).await
        }
        CartSubcommand::Remove { product } => cart.remove_item(ProductId::new(product)).await,
        CartSubcommand::Clear => cart.clear_cart().await,
    };

    while let Ok(notice) = notices.try_recv() {
        println!("{notice}");
    }

    match change {
        Ok(change) => debug!(?change, "cart command settled"),
        Err(error) => return Err(describe_error(&error)),
    }

    write_summary(io::stdout().lock(), &cart.cart(), cart.currency())
        .map_err(|error| error.to_string())
}

fn describe_error(error: &CartError) -> String {
    match error {
        CartError::Unauthenticated | CartError::InvalidQuantity(_) => error.to_string(),
        _ => format!("{error}: {}", super::source_message(error)),
    }
}
