//! Product review flow: form, generation and the review page.

use tracing::{info, warn};

use skinfit_ai::{GeneratedReview, ReviewKeyPoints, ReviewRequest};
use skinfit_core::SkinType;

use crate::api::ReviewService;
use crate::error::ReviewError;

pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://images.placeholders.dev/?width=400&height=400&text=Product+Image";

pub const FIELD_REQUIRED: &str = "This field is required";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewForm {
    pub product_name: String,
    pub skin_type: String,
}

/// Per-field validation messages; `None` means the field is fine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFormErrors {
    pub product_name: Option<&'static str>,
    pub skin_type: Option<&'static str>,
}

impl ReviewFormErrors {
    pub fn is_empty(&self) -> bool {
        self.product_name.is_none() && self.skin_type.is_none()
    }
}

impl ReviewForm {
    pub fn new(product_name: impl Into<String>, skin_type: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            skin_type: skin_type.into(),
        }
    }

    pub fn validate(&self) -> Result<ReviewRequest, ReviewFormErrors> {
        let skin_type = SkinType::new(&self.skin_type).ok();
        let mut errors = ReviewFormErrors::default();
        if self.product_name.trim().is_empty() {
            errors.product_name = Some(FIELD_REQUIRED);
        }
        if skin_type.is_none() {
            errors.skin_type = Some(FIELD_REQUIRED);
        }

        match skin_type {
            Some(skin_type) if errors.is_empty() => {
                ReviewRequest::new(&self.product_name, &skin_type).map_err(|_| errors)
            }
            _ => Err(errors),
        }
    }

    /// Validate and submit the form.
    pub async fn generate(&self, service: &dyn ReviewService) -> Result<GeneratedReview, ReviewError> {
        let request = self.validate().map_err(ReviewError::Incomplete)?;
        info!(product = %request.product_name, skin_type = %request.skin_type, "generating review");

        let review = service
            .generate_review(&request)
            .await
            .map_err(ReviewError::Service)?;
        Ok(review.validate()?)
    }
}

/// Markdown-to-display conversion. Implementations own sanitization; the page
/// hands them the unabridged review text and shows whatever comes back.
pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewView<'a> {
    Collapsed(&'a ReviewKeyPoints),
    Expanded(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPage {
    review: GeneratedReview,
    key_points: ReviewKeyPoints,
    image_url: String,
    expanded: bool,
}

impl ReviewPage {
    /// Build the page with the product image; missing or failed images use the
    /// placeholder.
    pub async fn load(service: &dyn ReviewService, review: GeneratedReview) -> Self {
        let image_url = match service.product_image(&review.product_name).await {
            Ok(Some(url)) => url,
            Ok(None) => PLACEHOLDER_IMAGE_URL.to_string(),
            Err(e) => {
                warn!(product = %review.product_name, error = %e, "product image lookup failed");
                PLACEHOLDER_IMAGE_URL.to_string()
            }
        };
        Self::new(review, image_url)
    }

    pub fn new(review: GeneratedReview, image_url: impl Into<String>) -> Self {
        let key_points = ReviewKeyPoints::extract(&review.review);
        Self {
            review,
            key_points,
            image_url: image_url.into(),
            expanded: false,
        }
    }

    pub fn review(&self) -> &GeneratedReview {
        &self.review
    }

    pub fn key_points(&self) -> &ReviewKeyPoints {
        &self.key_points
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn expand(&mut self) {
        self.expanded = true;
    }

    pub fn collapse(&mut self) {
        self.expanded = false;
    }

    pub fn view(&self) -> ReviewView<'_> {
        if self.expanded {
            ReviewView::Expanded(&self.review.review)
        } else {
            ReviewView::Collapsed(&self.key_points)
        }
    }

    pub fn render_full(&self, renderer: &dyn MarkdownRenderer) -> String {
        renderer.render(&self.review.review)
    }
}
