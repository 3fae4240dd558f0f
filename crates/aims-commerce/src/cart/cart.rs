//! Cart and cart line types.

use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// A product in the cart with its quantity and checkout selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// The product, as it was when added.
    pub product: Product,
    /// Quantity, always at least 1.
    pub quantity: i64,
    /// Whether this line takes part in the next checkout.
    pub selected: bool,
}

impl CartLine {
    /// A new selected line.
    pub fn new(product: Product, quantity: i64) -> Self {
        Self {
            product,
            quantity,
            selected: true,
        }
    }

    /// The product id this line is keyed by.
    pub fn product_id(&self) -> ProductId {
        self.product.product_id
    }

    /// `price × quantity`.
    pub fn subtotal(&self) -> Result<Money, CommerceError> {
        self.product
            .price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

/// A state transition on the cart.
///
/// Every mutation the storefront can make goes through one of these, so the
/// same sequence of commands always produces the same cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartCommand {
    /// Add `quantity` of `product`, merging into an existing line.
    Add { product: Product, quantity: i64 },
    /// Drop the line for `product_id`.
    Remove { product_id: ProductId },
    /// Replace the quantity; values below 1 are ignored.
    SetQuantity { product_id: ProductId, quantity: i64 },
    /// Flip the selection of one line.
    ToggleSelect { product_id: ProductId },
    /// Select or deselect every line.
    SelectAll { selected: bool },
    /// Remove every line.
    Clear,
    /// Replace the whole cart, e.g. from storage.
    Load { lines: Vec<CartLine> },
}

impl CartCommand {
    pub fn name(&self) -> &'static str {
        match self {
            CartCommand::Add { .. } => "add",
            CartCommand::Remove { .. } => "remove",
            CartCommand::SetQuantity { .. } => "set_quantity",
            CartCommand::ToggleSelect { .. } => "toggle_select",
            CartCommand::SelectAll { .. } => "select_all",
            CartCommand::Clear => "clear",
            CartCommand::Load { .. } => "load",
        }
    }
}

/// A shopping cart.
///
/// Holds at most one line per product id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from stored lines, merging duplicates.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        cart.apply(CartCommand::Load { lines });
        cart
    }

    /// Apply a command. Returns whether the cart changed.
    pub fn apply(&mut self, command: CartCommand) -> bool {
        match command {
            CartCommand::Add { product, quantity } => {
                if quantity < 1 {
                    return false;
                }
                match self.line_mut(product.product_id) {
                    Some(line) => {
                        line.quantity = line.quantity.saturating_add(quantity);
                    }
                    None => self.lines.push(CartLine::new(product, quantity)),
                }
                true
            }
            CartCommand::Remove { product_id } => {
                let len_before = self.lines.len();
                self.lines.retain(|l| l.product_id() != product_id);
                self.lines.len() < len_before
            }
            CartCommand::SetQuantity {
                product_id,
                quantity,
            } => {
                if quantity < 1 {
                    return false;
                }
                match self.line_mut(product_id) {
                    Some(line) if line.quantity != quantity => {
                        line.quantity = quantity;
                        true
                    }
                    _ => false,
                }
            }
            CartCommand::ToggleSelect { product_id } => match self.line_mut(product_id) {
                Some(line) => {
                    line.selected = !line.selected;
                    true
                }
                None => false,
            },
            CartCommand::SelectAll { selected } => {
                let mut changed = false;
                for line in &mut self.lines {
                    changed |= line.selected != selected;
                    line.selected = selected;
                }
                changed
            }
            CartCommand::Clear => {
                let changed = !self.lines.is_empty();
                self.lines.clear();
                changed
            }
            CartCommand::Load { lines } => {
                let before = std::mem::take(&mut self.lines);
                for line in lines {
                    if line.quantity < 1 {
                        continue;
                    }
                    match self.line_mut(line.product_id()) {
                        Some(existing) => {
                            existing.quantity = existing.quantity.saturating_add(line.quantity)
                        }
                        None => self.lines.push(line),
                    }
                }
                before != self.lines
            }
        }
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id() == product_id)
    }

    /// All lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Get the line for a product.
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id() == product_id)
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities over every line.
    pub fn total_item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Number of selected lines.
    pub fn selected_count(&self) -> usize {
        self.lines.iter().filter(|l| l.selected).count()
    }

    /// Sum of `price × quantity` over selected lines.
    pub fn selected_subtotal(&self) -> Result<Money, CommerceError> {
        sum_subtotals(self.lines.iter().filter(|l| l.selected))
    }

    /// Sum of `price × quantity` over every line.
    pub fn cart_total(&self) -> Result<Money, CommerceError> {
        sum_subtotals(self.lines.iter())
    }

    /// Copy of the selected lines, the input to a checkout.
    pub fn selected_lines(&self) -> Vec<CartLine> {
        self.lines.iter().filter(|l| l.selected).cloned().collect()
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }
}

pub(crate) fn sum_subtotals<'a>(
    lines: impl Iterator<Item = &'a CartLine>,
) -> Result<Money, CommerceError> {
    let subtotals = lines
        .map(CartLine::subtotal)
        .collect::<Result<Vec<_>, _>>()?;
    Money::try_sum(subtotals.iter(), Currency::VND).ok_or(CommerceError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductKind;
    use crate::weight::Weight;

    fn product(id: i64, price: i64) -> Product {
        Product::new(
            ProductId::new(id),
            format!("Product {}", id),
            ProductKind::Book,
            Money::vnd(price),
            Weight::grams(300),
        )
        .with_stock(10)
    }

    fn add(cart: &mut Cart, id: i64, price: i64, quantity: i64) -> bool {
        cart.apply(CartCommand::Add {
            product: product(id, price),
            quantity,
        })
    }

    #[test]
    fn test_add_item() {
        let mut cart = Cart::new();
        assert!(add(&mut cart, 1, 1000, 2));

        assert_eq!(cart.total_item_count(), 2);
        assert_eq!(cart.lines().len(), 1);
        assert!(cart.lines()[0].selected);
    }

    #[test]
    fn test_add_same_item_increases_quantity() {
        let mut cart = Cart::new();
        add(&mut cart, 1, 1000, 1);
        add(&mut cart, 1, 1000, 2);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_item_count(), 3);
    }

    #[test]
    fn test_add_keeps_existing_selection() {
        let mut cart = Cart::new();
        add(&mut cart, 1, 1000, 1);
        cart.apply(CartCommand::ToggleSelect {
            product_id: ProductId::new(1),
        });
        add(&mut cart, 1, 1000, 1);
        assert!(!cart.lines()[0].selected);
    }

    #[test]
    fn test_set_quantity_below_one_is_noop() {
        let mut cart = Cart::new();
        add(&mut cart, 1, 1000, 3);

        let changed = cart.apply(CartCommand::SetQuantity {
            product_id: ProductId::new(1),
            quantity: 0,
        });
        assert!(!changed);
        assert_eq!(cart.line(ProductId::new(1)).unwrap().quantity, 3);

        cart.apply(CartCommand::SetQuantity {
            product_id: ProductId::new(1),
            quantity: 5,
        });
        assert_eq!(cart.total_item_count(), 5);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new();
        add(&mut cart, 1, 1000, 1);

        assert!(cart.apply(CartCommand::Remove {
            product_id: ProductId::new(1)
        }));
        assert!(cart.is_empty());
        assert!(!cart.apply(CartCommand::Remove {
            product_id: ProductId::new(1)
        }));
    }

    #[test]
    fn test_selected_subtotal() {
        let mut cart = Cart::new();
        add(&mut cart, 1, 250_000, 1);
        add(&mut cart, 2, 80_000, 2);
        cart.apply(CartCommand::ToggleSelect {
            product_id: ProductId::new(2),
        });

        assert_eq!(cart.selected_subtotal().unwrap(), Money::vnd(250_000));
        assert_eq!(cart.selected_count(), 1);
        assert_eq!(cart.cart_total().unwrap(), Money::vnd(410_000));

        cart.apply(CartCommand::ToggleSelect {
            product_id: ProductId::new(2),
        });
        assert_eq!(cart.selected_subtotal().unwrap(), Money::vnd(410_000));
    }

    #[test]
    fn test_select_all() {
        let mut cart = Cart::new();
        add(&mut cart, 1, 1000, 1);
        add(&mut cart, 2, 1000, 1);

        assert!(cart.apply(CartCommand::SelectAll { selected: false }));
        assert_eq!(cart.selected_count(), 0);
        assert!(cart.selected_lines().is_empty());
        assert!(!cart.apply(CartCommand::SelectAll { selected: false }));
    }

    #[test]
    fn test_load_merges_duplicates() {
        let lines = vec![
            CartLine::new(product(1, 1000), 1),
            CartLine::new(product(2, 1000), 0),
            CartLine::new(product(1, 1000), 2),
        ];
        let cart = Cart::from_lines(lines);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line(ProductId::new(1)).unwrap().quantity, 3);
    }

    #[test]
    fn test_subtotal_overflow() {
        let mut cart = Cart::new();
        add(&mut cart, 1, i64::MAX, 2);
        assert!(matches!(cart.cart_total(), Err(CommerceError::Overflow)));
    }

    #[test]
    fn test_serializes_as_line_list() {
        let mut cart = Cart::new();
        add(&mut cart, 1, 1000, 1);
        let value = serde_json::to_value(&cart).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["product"]["product_id"], 1);
        assert_eq!(value[0]["selected"], true);
    }
}
