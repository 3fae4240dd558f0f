//! Product types as served by the catalog backend.

use crate::ids::ProductId;
use crate::money::{self, Money};
use crate::weight::{self, Weight};
use serde::{Deserialize, Serialize};

/// Product media category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    #[default]
    Book,
    Dvd,
    Cd,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Book => "book",
            ProductKind::Dvd => "dvd",
            ProductKind::Cd => "cd",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProductKind::Book => "Book",
            ProductKind::Dvd => "DVD",
            ProductKind::Cd => "CD",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "book" => Some(ProductKind::Book),
            "dvd" => Some(ProductKind::Dvd),
            "cd" => Some(ProductKind::Cd),
            _ => None,
        }
    }
}

/// A product in the catalog.
///
/// Immutable from the checkout's point of view; the cart stores a full copy
/// so the persisted cart can be priced without another catalog fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub product_id: ProductId,
    /// Display title.
    pub title: String,
    /// Media category.
    #[serde(rename = "type")]
    pub kind: ProductKind,
    /// Unit price in VND.
    #[serde(with = "money::vnd")]
    pub price: Money,
    /// Unit weight.
    #[serde(with = "weight::kg")]
    pub weight: Weight,
    /// Whether the product can be delivered as a rush order.
    #[serde(default)]
    pub rush_order_supported: bool,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub import_date: String,
    #[serde(default)]
    pub introduction: String,
    /// Units in stock.
    #[serde(default)]
    pub quantity: i64,
}

impl Product {
    /// Create a product with the fields checkout cares about.
    pub fn new(
        product_id: ProductId,
        title: impl Into<String>,
        kind: ProductKind,
        price: Money,
        weight: Weight,
    ) -> Self {
        Self {
            product_id,
            title: title.into(),
            kind,
            price,
            weight,
            rush_order_supported: false,
            image_url: String::new(),
            barcode: String::new(),
            import_date: String::new(),
            introduction: String::new(),
            quantity: 0,
        }
    }

    /// Set the stock level.
    pub fn with_stock(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Mark the product as rush-eligible.
    pub fn with_rush_support(mut self, supported: bool) -> Self {
        self.rush_order_supported = supported;
        self
    }

    /// Check if the product is in stock.
    pub fn is_in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Clamp a requested quantity to `[1, stock]`.
    ///
    /// An out-of-stock product still clamps to 1 so a selector never shows
    /// zero.
    pub fn clamp_quantity(&self, requested: i64) -> i64 {
        requested.min(self.quantity).max(1)
    }
}

/// Book-specific attributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BookDetails {
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub page_count: i64,
    #[serde(default)]
    pub publication_date: String,
    #[serde(default)]
    pub authors: String,
    #[serde(default)]
    pub publishers: String,
    #[serde(default)]
    pub cover_type: String,
}

/// DVD-specific attributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DvdDetails {
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub dvd_type: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub studio: String,
    #[serde(default)]
    pub director: String,
}

/// CD-specific attributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CdDetails {
    #[serde(default)]
    pub track_list: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub record_label: String,
    #[serde(default)]
    pub artists: String,
    #[serde(default)]
    pub release_date: String,
}

/// Category-specific attributes of a product detail page.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaDetails {
    Book(BookDetails),
    Dvd(DvdDetails),
    Cd(CdDetails),
}

/// A product together with its category-specific attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
    pub product: Product,
    pub details: MediaDetails,
}

impl ProductDetail {
    /// Split a flat detail document into the common and specific parts.
    ///
    /// The backend returns both halves in one object; which specific half is
    /// present follows the product's `type`.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let product: Product = serde_json::from_value(value.clone())?;
        let details = match product.kind {
            ProductKind::Book => MediaDetails::Book(serde_json::from_value(value)?),
            ProductKind::Dvd => MediaDetails::Dvd(serde_json::from_value(value)?),
            ProductKind::Cd => MediaDetails::Cd(serde_json::from_value(value)?),
        };
        Ok(Self { product, details })
    }

    /// The genre, whatever the category.
    pub fn genre(&self) -> &str {
        match &self.details {
            MediaDetails::Book(b) => &b.genre,
            MediaDetails::Dvd(d) => &d.genre,
            MediaDetails::Cd(c) => &c.genre,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "product_id": 1,
            "title": "Dế Mèn Phiêu Lưu Ký",
            "type": "book",
            "price": 250000,
            "weight": 0.3,
            "rush_order_supported": true,
            "image_url": "/img/1.jpg",
            "barcode": "8935",
            "import_date": "2024-01-15",
            "introduction": "",
            "quantity": 12,
            "book_id": 1,
            "genre": "Thiếu nhi",
            "page_count": 144,
            "publication_date": "1941-01-01",
            "authors": "Tô Hoài",
            "publishers": "Kim Đồng",
            "cover_type": "paperback"
        })
    }

    #[test]
    fn test_product_from_wire() {
        let product: Product = serde_json::from_value(sample()).unwrap();
        assert_eq!(product.product_id, ProductId::new(1));
        assert_eq!(product.kind, ProductKind::Book);
        assert_eq!(product.price, Money::vnd(250_000));
        assert_eq!(product.weight.as_grams(), 300);
        assert!(product.rush_order_supported);
    }

    #[test]
    fn test_product_detail_picks_category() {
        let detail = ProductDetail::from_json(sample()).unwrap();
        assert_eq!(detail.genre(), "Thiếu nhi");
        match detail.details {
            MediaDetails::Book(book) => assert_eq!(book.page_count, 144),
            other => panic!("expected book details, got {:?}", other),
        }
    }

    #[test]
    fn test_clamp_quantity() {
        let product = Product::new(
            ProductId::new(1),
            "CD",
            ProductKind::Cd,
            Money::vnd(100_000),
            Weight::grams(100),
        )
        .with_stock(5);

        assert_eq!(product.clamp_quantity(0), 1);
        assert_eq!(product.clamp_quantity(3), 3);
        assert_eq!(product.clamp_quantity(9), 5);
        assert_eq!(product.clone().with_stock(0).clamp_quantity(4), 1);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(ProductKind::from_str("DVD"), Some(ProductKind::Dvd));
        assert_eq!(ProductKind::from_str("vinyl"), None);
        assert_eq!(ProductKind::Cd.as_str(), "cd");
    }
}
