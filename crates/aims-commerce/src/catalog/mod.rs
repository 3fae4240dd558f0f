//! Product catalog module.
//!
//! Contains the product types the cart and checkout consume.

mod product;

pub use product::{
    BookDetails, CdDetails, DvdDetails, MediaDetails, Product, ProductDetail, ProductKind,
};
