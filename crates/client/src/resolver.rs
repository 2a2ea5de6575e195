//! Product resolution: local store first, online fallback second, manual
//! entry as the universal recovery path.

use std::sync::Arc;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use skinfit_core::{DomainResult, Generation, Product, ProductSource, RawProduct, SkuGenerator};

use crate::api::{ProductCatalog, ProductPersister};
use crate::error::LookupError;
use crate::types::OnlineLookup;

/// Queries shorter than this (after trimming) are not sent anywhere.
pub const MIN_QUERY_LEN: usize = 2;

/// Outcome of `ProductResolver::resolve`. Never an error: failures surface as
/// an empty candidate list plus a user-facing `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub candidates: Vec<RawProduct>,
    pub error: Option<LookupError>,
}

impl Resolution {
    fn found(candidates: Vec<RawProduct>) -> Self {
        Self {
            candidates,
            error: None,
        }
    }

    fn failed(error: LookupError) -> Self {
        Self {
            candidates: Vec::new(),
            error: Some(error),
        }
    }
}

/// A confirmed selection.
#[derive(Debug)]
pub struct Selection {
    pub product: Product,
    /// Background save-back of an online-sourced product. Callers may await it
    /// but never need to: its failure is only logged.
    pub save_back: Option<JoinHandle<()>>,
}

pub struct ProductResolver {
    catalog: Arc<dyn ProductCatalog>,
    persister: Arc<dyn ProductPersister>,
    skus: SkuGenerator,
}

impl ProductResolver {
    pub fn new(catalog: Arc<dyn ProductCatalog>, persister: Arc<dyn ProductPersister>) -> Self {
        Self {
            catalog,
            persister,
            skus: SkuGenerator::new(),
        }
    }

    /// Resolve a free-text query into candidates.
    pub async fn resolve(&self, query: &str) -> Resolution {
        match self.search_local(query).await {
            Some(resolution) => resolution,
            None => self.search_online(query).await,
        }
    }

    /// Local store step of `resolve`. `None` means nothing matched locally
    /// and the online lookup is next.
    pub async fn search_local(&self, query: &str) -> Option<Resolution> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            debug!(query, "query too short; not searching");
            return Some(Resolution::default());
        }

        let local = match self.catalog.search_products(query).await {
            Ok(results) => results,
            Err(e) => {
                warn!(query, error = %e, "local product search failed");
                return Some(Resolution::failed(LookupError::Transport(e)));
            }
        };

        if local.is_empty() {
            debug!(query, "{}", LookupError::NotFoundLocally);
            return None;
        }

        debug!(query, count = local.len(), "found products in local store");
        Some(Resolution::found(
            local
                .into_iter()
                .map(|raw| raw.with_source(ProductSource::Database))
                .collect(),
        ))
    }

    /// Online ingredient lookup, run after a local miss.
    pub async fn search_online(&self, query: &str) -> Resolution {
        let query = query.trim();
        match self.catalog.fetch_ingredients(query).await {
            Ok(OnlineLookup::Found(raw)) => {
                info!(query, "found product online");
                Resolution::found(vec![raw.with_source(ProductSource::Online)])
            }
            Ok(OnlineLookup::NotFound(reason)) => {
                info!(query, reason = %reason, "product not found online");
                Resolution::failed(LookupError::NotFoundOnline)
            }
            Err(e) => {
                warn!(query, error = %e, "online product lookup failed");
                Resolution::failed(LookupError::Transport(e))
            }
        }
    }

    /// Normalize a candidate into a product, saving it back to the local store
    /// in the background when it was found online.
    pub fn select(&self, candidate: &RawProduct) -> Selection {
        let product = Product::from_candidate(candidate, &self.skus, Utc::now());
        debug!(
            sku = %product.sku(),
            source = %product.source(),
            ingredients = product.ingredients().len(),
            "selected product"
        );

        let save_back = if product.source().requires_save_back() {
            self.persist_in_background(&product)
        } else {
            None
        };

        Selection { product, save_back }
    }

    /// Build a product from typed-in ingredients. No network involved.
    pub fn manual_entry(&self, title_hint: &str, ingredient_text: &str) -> DomainResult<Product> {
        let product = Product::manual(title_hint, ingredient_text, &self.skus, Utc::now())?;
        debug!(sku = %product.sku(), "created manual product");
        Ok(product)
    }

    /// Fire-and-forget save of `product`. Returns `None` when no async runtime
    /// is available to run it.
    pub fn persist_in_background(&self, product: &Product) -> Option<JoinHandle<()>> {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(sku = %product.sku(), "no async runtime; skipping product save-back");
                return None;
            }
        };

        let persister = Arc::clone(&self.persister);
        let product = product.clone();
        Some(handle.spawn(async move {
            match persister.save_product(&product).await {
                Ok(()) => info!(sku = %product.sku(), "saved online product to local store"),
                Err(e) => warn!(
                    sku = %product.sku(),
                    "{}",
                    LookupError::Persistence(e)
                ),
            }
        }))
    }
}

/// Ticket for one search request; responses are applied only while its
/// generation is current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: Generation,
    pub query: String,
}

/// Ephemeral state of the search box.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    query: String,
    candidates: Vec<RawProduct>,
    visible: bool,
    error: Option<LookupError>,
    /// Interim progress while a request is in flight.
    status: Option<LookupError>,
    generation: Generation,
    loading: bool,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new search, discarding previous results and invalidating any
    /// in-flight request.
    pub fn begin(&mut self, query: &str) -> SearchTicket {
        self.query = query.to_string();
        self.candidates.clear();
        self.visible = false;
        self.error = None;
        self.status = None;
        self.loading = true;
        SearchTicket {
            generation: self.generation.bump(),
            query: self.query.clone(),
        }
    }

    /// Apply a resolution. Returns `false` (and changes nothing) when the
    /// ticket has been superseded.
    pub fn apply(&mut self, ticket: &SearchTicket, resolution: Resolution) -> bool {
        if !self.generation.accepts(ticket.generation) {
            debug!(
                stale = %ticket.generation,
                current = %self.generation,
                query = %ticket.query,
                "discarding stale search response"
            );
            return false;
        }

        self.loading = false;
        self.status = None;
        self.visible = !resolution.candidates.is_empty();
        self.candidates = resolution.candidates;
        self.error = resolution.error;
        true
    }

    /// Record that the local store came up empty and the online lookup for
    /// `ticket` is under way. `false` when the ticket has been superseded.
    pub fn fall_back_online(&mut self, ticket: &SearchTicket) -> bool {
        if !self.generation.accepts(ticket.generation) {
            return false;
        }
        self.status = Some(LookupError::NotFoundLocally);
        true
    }

    /// Reset after a selection or a step change.
    pub fn clear(&mut self) {
        self.query.clear();
        self.candidates.clear();
        self.visible = false;
        self.error = None;
        self.status = None;
        self.loading = false;
        self.generation.bump();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn candidates(&self) -> &[RawProduct] {
        &self.candidates
    }

    pub fn candidate(&self, index: usize) -> Option<&RawProduct> {
        self.candidates.get(index)
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn error(&self) -> Option<&LookupError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Progress message for the search in flight, if there is one to show.
    pub fn status(&self) -> Option<&LookupError> {
        self.status.as_ref()
    }
}
