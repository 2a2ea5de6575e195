//! In-memory backend for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use skinfit_ai::{AnalysisResult, CompatibilityRequest, GeneratedReview, ReviewRequest};
use skinfit_core::{IngredientsField, Product, RawProduct};

use crate::api::{AnalysisService, ProductCatalog, ProductPersister, ReviewService};
use crate::error::ApiError;
use crate::types::OnlineLookup;

pub(crate) fn raw(brand: &str, title: &str) -> RawProduct {
    RawProduct {
        title: Some(title.to_string()),
        brand: Some(brand.to_string()),
        ingredients: Some(IngredientsField::Text("Water, Glycerin".to_string())),
        ..RawProduct::default()
    }
}

#[derive(Default)]
pub(crate) struct MockBackend {
    local: Vec<RawProduct>,
    online: Option<RawProduct>,
    analysis: Option<AnalysisResult>,
    review: Option<String>,
    image: Option<String>,
    fail_search: bool,
    fail_online: bool,
    fail_save: bool,
    fail_image: bool,
    search_calls: AtomicUsize,
    online_calls: AtomicUsize,
    saved: Mutex<Vec<Product>>,
    analysis_requests: Mutex<Vec<CompatibilityRequest>>,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_local(mut self, product: RawProduct) -> Self {
        self.local.push(product);
        self
    }

    pub(crate) fn with_online(mut self, product: RawProduct) -> Self {
        self.online = Some(product);
        self
    }

    pub(crate) fn with_analysis(mut self, result: AnalysisResult) -> Self {
        self.analysis = Some(result);
        self
    }

    pub(crate) fn with_review(mut self, review: &str) -> Self {
        self.review = Some(review.to_string());
        self
    }

    pub(crate) fn with_image(mut self, url: &str) -> Self {
        self.image = Some(url.to_string());
        self
    }

    pub(crate) fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub(crate) fn failing_online(mut self) -> Self {
        self.fail_online = true;
        self
    }

    pub(crate) fn failing_save(mut self) -> Self {
        self.fail_save = true;
        self
    }

    pub(crate) fn failing_image(mut self) -> Self {
        self.fail_image = true;
        self
    }

    pub(crate) fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn online_calls(&self) -> usize {
        self.online_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn saved(&self) -> Vec<Product> {
        self.saved.lock().unwrap().clone()
    }

    pub(crate) fn analysis_requests(&self) -> Vec<CompatibilityRequest> {
        self.analysis_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductCatalog for MockBackend {
    async fn search_products(&self, query: &str) -> Result<Vec<RawProduct>, ApiError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(ApiError::Network("connection refused".into()));
        }
        let needle = query.to_lowercase();
        Ok(self
            .local
            .iter()
            .filter(|p| {
                let haystack = format!(
                    "{} {}",
                    p.brand.as_deref().unwrap_or_default(),
                    p.title.as_deref().unwrap_or_default()
                );
                haystack.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn fetch_ingredients(&self, product_name: &str) -> Result<OnlineLookup, ApiError> {
        self.online_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_online {
            return Err(ApiError::Api(502, "upstream unavailable".into()));
        }
        Ok(match &self.online {
            Some(product) => OnlineLookup::Found(product.clone()),
            None => OnlineLookup::NotFound(format!("{product_name} not found")),
        })
    }
}

#[async_trait]
impl ProductPersister for MockBackend {
    async fn save_product(&self, product: &Product) -> Result<(), ApiError> {
        if self.fail_save {
            return Err(ApiError::Api(500, "database locked".into()));
        }
        self.saved.lock().unwrap().push(product.clone());
        Ok(())
    }
}

#[async_trait]
impl AnalysisService for MockBackend {
    async fn analyze_compatibility(
        &self,
        request: &CompatibilityRequest,
    ) -> Result<AnalysisResult, ApiError> {
        self.analysis_requests.lock().unwrap().push(request.clone());
        self.analysis
            .clone()
            .ok_or_else(|| ApiError::Api(503, "model overloaded".into()))
    }
}

#[async_trait]
impl ReviewService for MockBackend {
    async fn generate_review(&self, request: &ReviewRequest) -> Result<GeneratedReview, ApiError> {
        match &self.review {
            Some(review) => Ok(GeneratedReview {
                product_name: request.product_name.clone(),
                skin_type: request.skin_type.clone(),
                review: review.clone(),
            }),
            None => Err(ApiError::Api(500, "Failed to generate review".into())),
        }
    }

    async fn product_image(&self, _product_name: &str) -> Result<Option<String>, ApiError> {
        if self.fail_image {
            return Err(ApiError::Network("timeout".into()));
        }
        Ok(self.image.clone())
    }
}
