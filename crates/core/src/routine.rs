//! Time-of-day routines and their product collections.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::product::Product;

/// Time of day a routine is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Routine {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl Routine {
    pub const ALL: [Routine; 2] = [Routine::Am, Routine::Pm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Routine::Am => "AM",
            Routine::Pm => "PM",
        }
    }
}

impl core::fmt::Display for Routine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Routine {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AM" => Ok(Routine::Am),
            "PM" => Ok(Routine::Pm),
            other => Err(DomainError::invalid_routine(other)),
        }
    }
}

/// Ordered products of one routine, in insertion order.
///
/// Duplicates are allowed. Removing an entry shifts later entries down by one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutineCollection {
    products: Vec<Product>,
}

impl RoutineCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Remove the product at `index`. Out-of-range indices are ignored.
    pub fn remove_at(&mut self, index: usize) -> Option<Product> {
        if index < self.products.len() {
            Some(self.products.remove(index))
        } else {
            None
        }
    }

    pub fn list(&self) -> &[Product] {
        &self.products
    }

    pub fn count(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn clear(&mut self) {
        self.products.clear();
    }
}
