//! Products

use std::fmt::{Display, Formatter, Result as FmtResult};

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Product identifier, shared with the remote cart store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u32);

impl ProductId {
    /// Wrap a raw product number.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw product number.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for ProductId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

/// Theme a product belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    /// Naruto
    Naruto,

    /// One Piece
    OnePiece,

    /// Kaiju No. 8
    Kaiju,

    /// Bleach
    Bleach,
}

impl Theme {
    /// Slug used in catalog files and on the command line.
    pub const fn slug(self) -> &'static str {
        match self {
            Theme::Naruto => "naruto",
            Theme::OnePiece => "one-piece",
            Theme::Kaiju => "kaiju",
            Theme::Bleach => "bleach",
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.slug())
    }
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Unit price
    pub price: Money<'static, Currency>,

    /// Primary image path
    pub image: String,

    /// Additional gallery images
    pub images: SmallVec<[String; 4]>,

    /// Product category, e.g. "Clothing"
    pub category: String,

    /// Product description
    pub description: String,

    /// Available colours
    pub colors: SmallVec<[String; 4]>,

    /// Available sizes
    pub sizes: SmallVec<[String; 4]>,

    /// Product theme
    pub theme: Theme,

    /// Whether the product is a new arrival
    pub is_new: bool,

    /// Whether the product can currently be shipped
    pub in_stock: bool,

    /// Average review rating
    pub rating: f32,

    /// Number of reviews
    pub reviews: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_slugs_match_serde_names() -> Result<(), serde_norway::Error> {
        for theme in [Theme::Naruto, Theme::OnePiece, Theme::Kaiju, Theme::Bleach] {
            let parsed: Theme = serde_norway::from_str(theme.slug())?;

            assert_eq!(parsed, theme, "slug {} should parse back", theme.slug());
        }

        Ok(())
    }

    #[test]
    fn product_id_displays_raw_number() {
        assert_eq!(ProductId::new(42).to_string(), "42");
    }
}
