//! `skinfit-core`: skincare domain building blocks.
//!
//! This crate contains **pure domain** types (no IO, no HTTP): products and
//! their normalization rules, routines, skin types, and request generations.

pub mod error;
pub mod generation;
pub mod product;
pub mod routine;
pub mod skin;

pub use error::{DomainError, DomainResult};
pub use generation::Generation;
pub use product::{
    IngredientsField, Product, ProductSource, RawProduct, Sku, SkuGenerator, parse_ingredient_list,
};
pub use routine::{Routine, RoutineCollection};
pub use skin::{COMPATIBILITY_SKIN_TYPES, REVIEW_SKIN_TYPES, SkinType};
