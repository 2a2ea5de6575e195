//! Wire contracts for the AI-backed endpoints.

use serde::{Deserialize, Serialize};

use skinfit_core::{Product, RoutineCollection, SkinType};

use crate::result::AiError;

/// Body of `POST /api/analyze-compatibility`.
///
/// Conflict detection is the service's job; `detected_conflicts` is always
/// submitted empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRequest {
    pub current_products: Vec<Product>,
    pub new_product: Product,
    pub skin_type: SkinType,
    pub detected_conflicts: Vec<String>,
}

impl CompatibilityRequest {
    pub fn new(current: &RoutineCollection, new_product: Product, skin_type: SkinType) -> Self {
        Self {
            current_products: current.list().to_vec(),
            new_product,
            skin_type,
            detected_conflicts: Vec::new(),
        }
    }
}

/// Body of `POST /api/generate-review`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub product_name: String,
    pub skin_type: String,
}

impl ReviewRequest {
    pub fn new(product_name: &str, skin_type: &SkinType) -> Result<Self, AiError> {
        let product_name = product_name.trim();
        if product_name.is_empty() {
            return Err(AiError::InvalidInput("product name must not be blank".into()));
        }
        Ok(Self {
            product_name: product_name.to_string(),
            skin_type: skin_type.as_str().to_string(),
        })
    }
}

/// Response of `POST /api/generate-review`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedReview {
    pub product_name: String,
    pub skin_type: String,
    /// Markdown authored by the model. Never rendered here.
    pub review: String,
}

impl GeneratedReview {
    /// Reject responses that carry no review text.
    pub fn validate(self) -> Result<Self, AiError> {
        if self.review.trim().is_empty() {
            return Err(AiError::MalformedResponse("review text is empty".into()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skinfit_core::{ProductSource, Sku};

    #[test]
    fn compatibility_request_uses_camel_case_and_empty_conflicts() {
        let mut pm = RoutineCollection::new();
        pm.append(Product::new("Foaming Cleanser", "CeraVe", vec![], Sku::new("c-1"), ProductSource::Database));
        let new_product = Product::new(
            "Niacinamide 10% + Zinc 1%",
            "The Ordinary",
            vec!["Niacinamide".into()],
            Sku::new("o-1"),
            ProductSource::Database,
        );

        let request = CompatibilityRequest::new(&pm, new_product, SkinType::new("Oily").unwrap());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["currentProducts"].as_array().unwrap().len(), 1);
        assert_eq!(json["newProduct"]["brand"], "The Ordinary");
        assert_eq!(json["skinType"], "Oily");
        assert_eq!(json["detectedConflicts"], serde_json::json!([]));
    }

    #[test]
    fn review_request_requires_product_name() {
        let skin = SkinType::new("Dry").unwrap();
        assert!(ReviewRequest::new("  ", &skin).is_err());

        let request = ReviewRequest::new(" CeraVe Hydrating Cleanser ", &skin).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["productName"], "CeraVe Hydrating Cleanser");
        assert_eq!(json["skinType"], "Dry");
    }

    #[test]
    fn empty_review_is_malformed() {
        let review = GeneratedReview {
            product_name: "X".into(),
            skin_type: "Dry".into(),
            review: "  ".into(),
        };
        assert!(matches!(review.validate(), Err(AiError::MalformedResponse(_))));
    }
}
