//! Wire shapes of the catalog and image endpoints.

use serde::{Deserialize, Serialize};

use skinfit_core::RawProduct;

/// Response of `POST /api/fetch-ingredients`.
///
/// The service answers `{ "error": ... }` when the online lookup finds nothing,
/// and a product-like record otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FetchIngredientsResponse {
    NotFound { error: String },
    Found(RawProduct),
}

/// Body of `POST /api/fetch-ingredients`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchIngredientsRequest {
    pub product_name: String,
}

/// Outcome of the online lookup, as seen by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnlineLookup {
    Found(RawProduct),
    NotFound(String),
}

/// Response of `GET /api/product-image`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImageResponse {
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Error body of `POST /api/generate-review`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}
