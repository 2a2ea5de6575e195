//! User skin profile.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Skin types offered by the compatibility wizard.
pub const COMPATIBILITY_SKIN_TYPES: [&str; 5] = ["Oily", "Dry", "Combination", "Sensitive", "Normal"];

/// Skin types offered by the product review form.
pub const REVIEW_SKIN_TYPES: [&str; 7] = [
    "Oily",
    "Dry",
    "Combination",
    "Sensitive",
    "Normal",
    "Acne-Prone",
    "Mature",
];

/// A chosen skin type. Free-form but never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkinType(String);

impl SkinType {
    pub fn new(value: impl AsRef<str>) -> DomainResult<Self> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("skin type must not be blank"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SkinType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
