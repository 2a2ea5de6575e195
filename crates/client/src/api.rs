//! Backend service contract and its HTTP implementation.
//!
//! Each capability the client depends on is its own trait so that the
//! resolver, the analysis trigger and the review flow can be exercised against
//! in-memory fakes.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use skinfit_ai::{AnalysisResult, CompatibilityRequest, GeneratedReview, ReviewRequest};
use skinfit_core::{Product, RawProduct};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::types::{
    FetchIngredientsRequest, FetchIngredientsResponse, OnlineLookup, ProductImageResponse,
    ServiceErrorBody,
};

const REVIEW_FAILED: &str = "Failed to generate review";

/// Product lookups: local store search and online fetch-by-name.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// `GET /api/products/search?query=`
    async fn search_products(&self, query: &str) -> Result<Vec<RawProduct>, ApiError>;

    /// `POST /api/fetch-ingredients`
    async fn fetch_ingredients(&self, product_name: &str) -> Result<OnlineLookup, ApiError>;
}

/// Save-back of online-sourced products to the local store.
#[async_trait]
pub trait ProductPersister: Send + Sync {
    /// `POST /api/products/save`
    async fn save_product(&self, product: &Product) -> Result<(), ApiError>;
}

#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// `POST /api/analyze-compatibility`
    async fn analyze_compatibility(
        &self,
        request: &CompatibilityRequest,
    ) -> Result<AnalysisResult, ApiError>;
}

#[async_trait]
pub trait ReviewService: Send + Sync {
    /// `POST /api/generate-review`
    async fn generate_review(&self, request: &ReviewRequest) -> Result<GeneratedReview, ApiError>;

    /// `GET /api/product-image?product_name=`; `None` when the service has no image.
    async fn product_image(&self, product_name: &str) -> Result<Option<String>, ApiError>;
}

/// reqwest-backed implementation of every backend capability.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    api_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn send(req: RequestBuilder) -> Result<Response, ApiError> {
        req.send().await.map_err(ApiError::network)
    }

    /// Decode a 2xx JSON body, or turn anything else into `ApiError::Api`.
    async fn json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        if !resp.status().is_success() {
            let status = resp.status();
            return Err(ApiError::Api(
                status.as_u16(),
                resp.text().await.unwrap_or_default(),
            ));
        }
        resp.json().await.map_err(ApiError::parse)
    }
}

#[async_trait]
impl ProductCatalog for HttpBackend {
    async fn search_products(&self, query: &str) -> Result<Vec<RawProduct>, ApiError> {
        let req = self
            .client
            .get(self.url("/api/products/search"))
            .query(&[("query", query)]);

        let results: Option<Vec<RawProduct>> = Self::json(Self::send(req).await?).await?;
        Ok(results.unwrap_or_default())
    }

    async fn fetch_ingredients(&self, product_name: &str) -> Result<OnlineLookup, ApiError> {
        let req = self
            .client
            .post(self.url("/api/fetch-ingredients"))
            .json(&FetchIngredientsRequest {
                product_name: product_name.to_string(),
            });

        let resp = Self::send(req).await?;
        let status = resp.status();
        let body = resp.text().await.map_err(ApiError::network)?;

        // The not-found answer is a JSON body, and may arrive with any status.
        match serde_json::from_str::<FetchIngredientsResponse>(&body) {
            Ok(FetchIngredientsResponse::NotFound { error }) => Ok(OnlineLookup::NotFound(error)),
            _ if status == StatusCode::NOT_FOUND => Ok(OnlineLookup::NotFound(body)),
            _ if !status.is_success() => Err(ApiError::Api(status.as_u16(), body)),
            Ok(FetchIngredientsResponse::Found(raw)) => Ok(OnlineLookup::Found(raw)),
            Err(e) => Err(ApiError::parse(e)),
        }
    }
}

#[async_trait]
impl ProductPersister for HttpBackend {
    async fn save_product(&self, product: &Product) -> Result<(), ApiError> {
        let req = self.client.post(self.url("/api/products/save")).json(product);
        let ack: serde_json::Value = Self::json(Self::send(req).await?).await?;
        tracing::debug!(sku = %product.sku(), ack = %ack, "product save acknowledged");
        Ok(())
    }
}

#[async_trait]
impl AnalysisService for HttpBackend {
    async fn analyze_compatibility(
        &self,
        request: &CompatibilityRequest,
    ) -> Result<AnalysisResult, ApiError> {
        let req = self
            .client
            .post(self.url("/api/analyze-compatibility"))
            .json(request);
        Self::json(Self::send(req).await?).await
    }
}

#[async_trait]
impl ReviewService for HttpBackend {
    async fn generate_review(&self, request: &ReviewRequest) -> Result<GeneratedReview, ApiError> {
        let req = self.client.post(self.url("/api/generate-review")).json(request);
        let resp = Self::send(req).await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ServiceErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail)
                .unwrap_or_else(|| REVIEW_FAILED.to_string());
            return Err(ApiError::Api(status, detail));
        }

        resp.json().await.map_err(ApiError::parse)
    }

    async fn product_image(&self, product_name: &str) -> Result<Option<String>, ApiError> {
        let req = self
            .client
            .get(self.url("/api/product-image"))
            .query(&[("product_name", product_name)]);

        let body: ProductImageResponse = Self::json(Self::send(req).await?).await?;
        Ok(body.image_url.filter(|url| !url.trim().is_empty()))
    }
}
