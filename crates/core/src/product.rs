//! Resolved skincare products and the candidate records they are built from.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

pub const UNKNOWN_PRODUCT: &str = "Unknown Product";
pub const UNKNOWN_BRAND: &str = "Unknown Brand";
pub const MANUAL_ENTRY_TITLE: &str = "Manual Entry";
pub const MANUAL_ENTRY_BRAND: &str = "Custom";

/// Where a product record came from.
///
/// Only `Online` records trigger a save-back to the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductSource {
    Database,
    Online,
    Manual,
}

impl ProductSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductSource::Database => "database",
            ProductSource::Online => "online",
            ProductSource::Manual => "manual",
        }
    }

    pub fn requires_save_back(&self) -> bool {
        matches!(self, ProductSource::Online)
    }
}

impl core::fmt::Display for ProductSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stock keeping unit, unique within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Sku {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Time-based SKU fallback (`<prefix><unix-millis>`).
///
/// Two SKUs requested within the same millisecond get consecutive millisecond
/// values, so generated SKUs never repeat for the lifetime of the generator.
#[derive(Debug, Default)]
pub struct SkuGenerator {
    last_millis: AtomicI64,
}

impl SkuGenerator {
    pub const PRODUCT_PREFIX: &'static str = "prod-";
    pub const MANUAL_PREFIX: &'static str = "manual-";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, prefix: &str, now: DateTime<Utc>) -> Sku {
        let now_millis = now.timestamp_millis();
        let previous = self
            .last_millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now_millis.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        let millis = now_millis.max(previous + 1);
        Sku(format!("{prefix}{millis}"))
    }
}

/// Ingredient field as it arrives from the service: either a list or a
/// comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IngredientsField {
    List(Vec<String>),
    Text(String),
}

impl IngredientsField {
    pub fn normalize(&self) -> Vec<String> {
        match self {
            IngredientsField::List(items) => clean(items.iter().map(String::as_str)),
            IngredientsField::Text(text) => parse_ingredient_list(text),
        }
    }
}

/// Split comma-separated ingredient text into trimmed, non-empty entries.
pub fn parse_ingredient_list(text: &str) -> Vec<String> {
    clean(text.split(','))
}

fn clean<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    items
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Unconfirmed product record returned by a search, pending user selection.
///
/// Every field is optional: the local store and the online lookup both return
/// loosely-shaped records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<IngredientsField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ProductSource>,
}

impl RawProduct {
    pub fn with_source(mut self, source: ProductSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Label shown in a candidate dropdown.
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            non_blank(self.brand.as_deref()).unwrap_or(UNKNOWN_BRAND),
            non_blank(self.title.as_deref()).unwrap_or(UNKNOWN_PRODUCT)
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// A resolved product. Immutable once created: replace, don't edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    title: String,
    brand: String,
    #[serde(default)]
    ingredients: Vec<String>,
    sku: Sku,
    source: ProductSource,
}

impl Product {
    pub fn new(
        title: impl Into<String>,
        brand: impl Into<String>,
        ingredients: Vec<String>,
        sku: Sku,
        source: ProductSource,
    ) -> Self {
        Self {
            title: title.into(),
            brand: brand.into(),
            ingredients,
            sku,
            source,
        }
    }

    /// Normalize a selected candidate.
    ///
    /// Missing title/brand fall back to placeholders, missing SKU is generated
    /// from `now`, a missing source means the record came from the local store.
    pub fn from_candidate(candidate: &RawProduct, skus: &SkuGenerator, now: DateTime<Utc>) -> Self {
        let sku = match non_blank(candidate.sku.as_deref()) {
            Some(sku) => Sku::new(sku),
            None => skus.next(SkuGenerator::PRODUCT_PREFIX, now),
        };

        Self {
            title: non_blank(candidate.title.as_deref())
                .unwrap_or(UNKNOWN_PRODUCT)
                .to_string(),
            brand: non_blank(candidate.brand.as_deref())
                .unwrap_or(UNKNOWN_BRAND)
                .to_string(),
            ingredients: candidate
                .ingredients
                .as_ref()
                .map(IngredientsField::normalize)
                .unwrap_or_default(),
            sku,
            source: candidate.source.unwrap_or(ProductSource::Database),
        }
    }

    /// Build a product from user-typed ingredient text, bypassing any lookup.
    pub fn manual(
        title_hint: &str,
        ingredient_text: &str,
        skus: &SkuGenerator,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let ingredients = parse_ingredient_list(ingredient_text);
        if ingredients.is_empty() {
            return Err(DomainError::validation(
                "ingredient list must contain at least one ingredient",
            ));
        }

        let title = match title_hint.trim() {
            "" => MANUAL_ENTRY_TITLE,
            hint => hint,
        };

        Ok(Self {
            title: title.to_string(),
            brand: MANUAL_ENTRY_BRAND.to_string(),
            ingredients,
            sku: skus.next(SkuGenerator::MANUAL_PREFIX, now),
            source: ProductSource::Manual,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn source(&self) -> ProductSource {
        self.source
    }

    pub fn display_name(&self) -> String {
        format!("{} - {}", self.brand, self.title)
    }
}
