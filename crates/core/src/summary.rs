//! Cart summary

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{cart::Cart, products::Product};

/// Errors writing a cart summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// The output could not be written.
    #[error("failed to write cart summary: {0}")]
    Io(#[from] io::Error),
}

/// Write `cart` as a table followed by its count and total.
///
/// Products the catalog does not know are listed as "Unknown product" with no
/// price.
///
/// # Errors
///
/// Returns [`SummaryError::Io`] when writing to `out` fails.
pub fn write_summary(
    mut out: impl io::Write,
    cart: &Cart,
    currency: &'static Currency,
) -> Result<(), SummaryError> {
    if cart.is_empty() {
        writeln!(out, "Your cart is empty")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["#", "Product", "Unit Price", "Qty", "Line Total"]);

    for line in cart.lines() {
        let (name, unit_price) = match line.product() {
            Some(product) => (product.name.clone(), product.price.to_string()),
            None => ("Unknown product".to_string(), "-".to_string()),
        };

        builder.push_record([
            line.product_id().to_string(),
            name,
            unit_price,
            line.quantity().to_string(),
            Money::from_minor(line.total_minor(), currency).to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    writeln!(out, "{table}")?;
    writeln!(out, " Items: {}", cart.count())?;
    writeln!(out, " Total: {}", cart.total(currency))?;

    Ok(())
}

/// Write `products` as a table of id, name, theme, price and stock.
///
/// # Errors
///
/// Returns [`SummaryError::Io`] when writing to `out` fails.
pub fn write_catalog<'a>(
    mut out: impl io::Write,
    products: impl IntoIterator<Item = &'a Product>,
) -> Result<(), SummaryError> {
    let mut products = products.into_iter().peekable();

    if products.peek().is_none() {
        writeln!(out, "No products found")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["#", "Product", "Theme", "Price", "Stock"]);

    for product in products {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.theme.slug().to_string(),
            product.price.to_string(),
            if product.in_stock { "in stock" } else { "sold out" }.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..4), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::{
        cart::{CartLine, test_support::product},
        products::ProductId,
    };

    use super::*;

    #[test]
    fn empty_cart_says_so() -> TestResult {
        let mut out = Vec::new();

        write_summary(&mut out, &Cart::new(), USD)?;

        assert_eq!(String::from_utf8(out)?, "Your cart is empty\n");

        Ok(())
    }

    #[test]
    fn lists_lines_and_totals() -> TestResult {
        let cart = Cart::from_lines(
            [
                CartLine::new(ProductId::new(1), 2, Some(product(1, 10_00))),
                CartLine::new(ProductId::new(9), 1, None),
            ]
            .into_iter()
            .flatten(),
        );

        let mut out = Vec::new();

        write_summary(&mut out, &cart, USD)?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("Product 1"), "missing product name in:\n{text}");
        assert!(text.contains("Unknown product"), "missing unknown line in:\n{text}");
        assert!(text.contains("Items: 3"), "missing count in:\n{text}");
        assert!(text.contains("Total: $20.00"), "missing total in:\n{text}");

        Ok(())
    }

    #[test]
    fn catalog_lists_products() -> TestResult {
        let products = [product(1, 69_99), product(2, 39_99)];
        let mut out = Vec::new();

        write_catalog(&mut out, &products)?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("Product 2"), "missing product in:\n{text}");
        assert!(text.contains("$69.99"), "missing price in:\n{text}");

        Ok(())
    }

    #[test]
    fn empty_catalog_says_so() -> TestResult {
        let mut out = Vec::new();

        write_catalog(&mut out, &[])?;

        assert_eq!(String::from_utf8(out)?, "No products found\n");

        Ok(())
    }
}
