//! Cart

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};

use crate::products::{Product, ProductId};

/// One product and its quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    product_id: ProductId,
    quantity: u32,
    product: Option<Product>,
    resolved_at: Timestamp,
}

impl CartLine {
    /// Create a line. Returns `None` when `quantity` is zero.
    pub fn new(product_id: ProductId, quantity: u32, product: Option<Product>) -> Option<Self> {
        (quantity > 0).then(|| Self {
            product_id,
            quantity,
            product,
            resolved_at: Timestamp::now(),
        })
    }

    /// Product identifier
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Quantity, always at least one.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Catalog snapshot, `None` when the catalog did not know the product.
    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    /// When the catalog snapshot was taken.
    pub fn resolved_at(&self) -> Timestamp {
        self.resolved_at
    }

    /// Unit price in minor units; unresolved products are free.
    pub fn unit_price_minor(&self) -> i64 {
        self.product
            .as_ref()
            .map_or(0, |product| product.price.to_minor_units())
    }

    /// Line total in minor units.
    pub fn total_minor(&self) -> i64 {
        self.unit_price_minor()
            .saturating_mul(i64::from(self.quantity))
    }
}

/// Ordered cart lines with at most one line per product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from lines, merging repeated products by summing.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();

        for line in lines {
            match cart.position(line.product_id) {
                Some(position) => {
                    if let Some(existing) = cart.lines.get_mut(position) {
                        existing.quantity = existing.quantity.saturating_add(line.quantity);
                    }
                }
                None => cart.lines.push(line),
            }
        }

        cart
    }

    /// Lines in display order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `product_id`, if present.
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.product_id == product_id)
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.product_id == product_id)
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all quantities.
    pub fn count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of price × quantity in minor units.
    pub fn total_minor(&self) -> i64 {
        self.lines
            .iter()
            .fold(0_i64, |acc, line| acc.saturating_add(line.total_minor()))
    }

    /// Sum of price × quantity in `currency`.
    pub fn total(&self, currency: &'static Currency) -> Money<'static, Currency> {
        Money::from_minor(self.total_minor(), currency)
    }

    /// Add `quantity` to the line for `product_id`, appending a new line when
    /// absent. Returns the previous quantity, if any.
    pub(crate) fn increment(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        resolve: impl FnOnce() -> Option<Product>,
    ) -> Option<u32> {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            let previous = line.quantity;
            line.quantity = previous.saturating_add(quantity);

            return Some(previous);
        }

        if let Some(line) = CartLine::new(product_id, quantity, resolve()) {
            self.lines.push(line);
        }

        None
    }

    /// Replace the quantity of an existing line. Returns the previous quantity,
    /// or `None` when there is no line or `quantity` is zero.
    pub(crate) fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> Option<u32> {
        if quantity == 0 {
            return None;
        }

        let line = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)?;

        Some(std::mem::replace(&mut line.quantity, quantity))
    }

    /// Remove the line for `product_id`, returning it with its position.
    pub(crate) fn remove(&mut self, product_id: ProductId) -> Option<(usize, CartLine)> {
        let position = self.position(product_id)?;

        Some((position, self.lines.remove(position)))
    }

    /// Undo an [`Cart::increment`] that had the given previous quantity.
    pub(crate) fn revert_increment(&mut self, product_id: ProductId, previous: Option<u32>) {
        match previous {
            Some(quantity) => {
                self.set_quantity(product_id, quantity);
            }
            None => {
                self.remove(product_id);
            }
        }
    }

    /// Put a removed line back at its former position.
    pub(crate) fn reinsert(&mut self, position: usize, line: CartLine) {
        if self.position(line.product_id).is_some() {
            return;
        }

        let position = position.min(self.lines.len());

        self.lines.insert(position, line);
    }

    /// Drop every line.
    pub(crate) fn clear(&mut self) {
        self.lines.clear();
    }
}
