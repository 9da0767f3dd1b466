//! Catalog

use std::{fs, path::Path};

use mockall::automock;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::products::{Product, ProductId, Theme};

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the catalog file
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse catalog YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between products
    #[error("currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The same product id appears twice
    #[error("duplicate product id: {0}")]
    DuplicateProduct(ProductId),

    /// No products were defined, so the currency is unknown
    #[error("catalog has no products; currency unknown")]
    NoCurrency,
}

/// Read-only product lookup.
#[automock]
pub trait Catalog: Send + Sync {
    /// Look up a single product.
    fn get_product(&self, id: ProductId) -> Option<Product>;

    /// All products for the given theme, in catalog order.
    fn products_by_theme(&self, theme: Theme) -> Vec<Product>;

    /// Currency every catalog price is expressed in.
    fn currency(&self) -> &'static Currency;
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
    index: FxHashMap<ProductId, usize>,
    currency: &'static Currency,
}

impl InMemoryCatalog {
    /// Build a catalog from products priced in `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CurrencyMismatch`] when a product is priced in another
    /// currency, or [`CatalogError::DuplicateProduct`] when an id repeats.
    pub fn new(
        currency: &'static Currency,
        products: impl Into<Vec<Product>>,
    ) -> Result<Self, CatalogError> {
        let products = products.into();
        let mut index = FxHashMap::default();

        for (position, product) in products.iter().enumerate() {
            let product_currency = product.price.currency();

            if product_currency != currency {
                return Err(CatalogError::CurrencyMismatch(
                    currency.iso_alpha_code,
                    product_currency.iso_alpha_code,
                ));
            }

            if index.insert(product.id, position).is_some() {
                return Err(CatalogError::DuplicateProduct(product.id));
            }
        }

        Ok(Self {
            products,
            index,
            currency,
        })
    }

    /// Parse a catalog from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, a price is invalid, or the
    /// catalog mixes currencies.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(yaml)?;

        let products = fixture
            .products
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let currency = products
            .first()
            .map(|product| product.price.currency())
            .ok_or(CatalogError::NoCurrency)?;

        Self::new(currency, products)
    }

    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Self::from_yaml_str(&fs::read_to_string(path)?)
    }

    /// All products in catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Catalog for InMemoryCatalog {
    fn get_product(&self, id: ProductId) -> Option<Product> {
        self.index
            .get(&id)
            .and_then(|&position| self.products.get(position))
            .cloned()
    }

    fn products_by_theme(&self, theme: Theme) -> Vec<Product> {
        self.products
            .iter()
            .filter(|product| product.theme == theme)
            .cloned()
            .collect()
    }

    fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFixture {
    products: Vec<ProductFixture>,
}

#[derive(Debug, Deserialize)]
struct ProductFixture {
    id: ProductId,
    name: String,
    /// Price with currency, e.g. "69.99 USD"
    price: String,
    image: String,
    #[serde(default)]
    images: SmallVec<[String; 4]>,
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    colors: SmallVec<[String; 4]>,
    #[serde(default)]
    sizes: SmallVec<[String; 4]>,
    theme: Theme,
    #[serde(default)]
    is_new: bool,
    #[serde(default = "in_stock_default")]
    in_stock: bool,
    #[serde(default)]
    rating: f32,
    #[serde(default)]
    reviews: u32,
}

fn in_stock_default() -> bool {
    true
}

impl TryFrom<ProductFixture> for Product {
    type Error = CatalogError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(Product {
            id: fixture.id,
            name: fixture.name,
            price: Money::from_minor(minor_units, currency),
            image: fixture.image,
            images: fixture.images,
            category: fixture.category,
            description: fixture.description,
            colors: fixture.colors,
            sizes: fixture.sizes,
            theme: fixture.theme,
            is_new: fixture.is_new,
            in_stock: fixture.in_stock,
            rating: fixture.rating,
            reviews: fixture.reviews,
        })
    }
}

/// Parse a price string (e.g. "69.99 USD") into minor units and currency.
///
/// # Errors
///
/// Returns an error if the string is not "AMOUNT CURRENCY", the amount is not
/// a non-negative decimal, or the currency is not recognised.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), CatalogError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(currency_code), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(CatalogError::InvalidPrice(format!(
            "expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(CatalogError::InvalidPrice(s.to_string()));
    }

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| CatalogError::InvalidPrice(s.to_string()))?;

    let currency = match currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(CatalogError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    const CATALOG: &str = r#"
products:
  - id: 1
    name: "Hashirama Sage Art : 1000 hands Hoodie"
    price: "69.99 USD"
    image: /imgs/narutohoodie.webp
    images:
      - /imgs/narutohoodieback.webp
      - /imgs/narutohoodie.webp
    category: Clothing
    description: Premium quality hoodie
    colors: [Black]
    sizes: [S, M, L, XL]
    theme: naruto
    is_new: true
    rating: 4.8
    reviews: 125
  - id: 2
    name: Straw Hat Pirates Tee
    price: "39.99 USD"
    image: /imgs/optshirt1.webp
    category: Clothing
    theme: one-piece
    in_stock: false
"#;

    #[test]
    fn parses_products_from_yaml() -> TestResult {
        let catalog = InMemoryCatalog::from_yaml_str(CATALOG)?;

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.currency(), USD);

        let hoodie = catalog
            .get_product(ProductId::new(1))
            .ok_or("product 1 should exist")?;

        assert_eq!(hoodie.price, Money::from_minor(6999, USD));
        assert_eq!(hoodie.images.len(), 2);
        assert_eq!(hoodie.sizes.len(), 4);
        assert!(hoodie.in_stock);

        let tee = catalog
            .get_product(ProductId::new(2))
            .ok_or("product 2 should exist")?;

        assert_eq!(tee.theme, Theme::OnePiece);
        assert!(!tee.in_stock);
        assert!(tee.colors.is_empty());

        Ok(())
    }

    #[test]
    fn unknown_product_is_none() -> TestResult {
        let catalog = InMemoryCatalog::from_yaml_str(CATALOG)?;

        assert!(catalog.get_product(ProductId::new(99)).is_none());

        Ok(())
    }

    #[test]
    fn products_by_theme_filters_in_order() -> TestResult {
        let catalog = InMemoryCatalog::from_yaml_str(CATALOG)?;

        let naruto = catalog.products_by_theme(Theme::Naruto);

        assert_eq!(naruto.len(), 1);
        assert_eq!(naruto.first().map(|p| p.id), Some(ProductId::new(1)));
        assert!(catalog.products_by_theme(Theme::Bleach).is_empty());

        Ok(())
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let yaml = r"
products:
  - { id: 1, name: A, price: 1.00 USD, image: a, category: C, theme: kaiju }
  - { id: 2, name: B, price: 1.00 GBP, image: b, category: C, theme: kaiju }
";

        let result = InMemoryCatalog::from_yaml_str(yaml);

        assert!(
            matches!(result, Err(CatalogError::CurrencyMismatch("USD", "GBP"))),
            "expected CurrencyMismatch, got {result:?}"
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let yaml = r"
products:
  - { id: 7, name: A, price: 1.00 USD, image: a, category: C, theme: kaiju }
  - { id: 7, name: B, price: 2.00 USD, image: b, category: C, theme: kaiju }
";

        let result = InMemoryCatalog::from_yaml_str(yaml);

        assert!(
            matches!(result, Err(CatalogError::DuplicateProduct(id)) if id == ProductId::new(7)),
            "expected DuplicateProduct, got {result:?}"
        );
    }

    #[test]
    fn empty_catalog_has_no_currency() {
        let result = InMemoryCatalog::from_yaml_str("products: []");

        assert!(matches!(result, Err(CatalogError::NoCurrency)));
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        assert!(matches!(
            parse_price("2.99USD"),
            Err(CatalogError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("2.99 USD extra"),
            Err(CatalogError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("-1.00 USD"),
            Err(CatalogError::InvalidPrice(_))
        ));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(CatalogError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_rounds_to_minor_units() -> TestResult {
        let (minor, currency) = parse_price("10.005 GBP")?;

        assert_eq!(minor, 1000);
        assert_eq!(currency, GBP);

        Ok(())
    }
}
