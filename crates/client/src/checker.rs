//! The compatibility checker: one wizard session wired to its backend.
//!
//! Owns the wizard state, the search box and the analysis trigger. Every
//! mutation goes through `&mut self`, so responses are applied in the order
//! the caller awaits them; generation tickets take care of the stale ones.

use std::sync::Arc;

use tracing::{debug, info};

use skinfit_ai::AnalysisResult;
use skinfit_core::{Product, Routine, SkinType};

use crate::analysis::{self, AnalysisTicket, CompatibilityAnalysisTrigger};
use crate::api::{AnalysisService, ProductCatalog, ProductPersister};
use crate::error::{ApiError, WizardError};
use crate::resolver::{ProductResolver, Resolution, SearchSession, SearchTicket};
use crate::wizard::{Placement, WizardState, WizardStep};

pub struct CompatibilityChecker {
    wizard: WizardState,
    search: SearchSession,
    resolver: ProductResolver,
    trigger: CompatibilityAnalysisTrigger,
    analysis: Arc<dyn AnalysisService>,
}

impl CompatibilityChecker {
    pub fn new(resolver: ProductResolver, analysis: Arc<dyn AnalysisService>) -> Self {
        Self {
            wizard: WizardState::new(),
            search: SearchSession::new(),
            resolver,
            trigger: CompatibilityAnalysisTrigger::new(),
            analysis,
        }
    }

    /// Wire every capability to a single backend.
    pub fn with_backend<B>(backend: Arc<B>) -> Self
    where
        B: ProductCatalog + ProductPersister + AnalysisService + 'static,
    {
        let resolver = ProductResolver::new(backend.clone(), backend.clone());
        Self::new(resolver, backend)
    }

    pub fn wizard(&self) -> &WizardState {
        &self.wizard
    }

    pub fn search(&self) -> &SearchSession {
        &self.search
    }

    pub fn trigger(&self) -> &CompatibilityAnalysisTrigger {
        &self.trigger
    }

    pub fn step(&self) -> WizardStep {
        self.wizard.step()
    }

    pub fn choose_skin_type(&mut self, skin_type: &str) -> Result<(), WizardError> {
        let skin_type = SkinType::new(skin_type)?;
        self.wizard.choose_skin_type(skin_type)
    }

    pub fn choose_routine(&mut self, routine: Routine) -> Result<(), WizardError> {
        self.wizard.choose_routine(routine)
    }

    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let step = self.wizard.advance()?;
        self.search.clear();
        debug!(%step, "advanced");
        Ok(step)
    }

    pub fn back(&mut self) -> Option<WizardStep> {
        let step = self.wizard.back()?;
        self.search.clear();
        debug!(%step, "went back");
        Some(step)
    }

    fn require_search_step(&self, action: &'static str) -> Result<(), WizardError> {
        let step = self.wizard.step();
        if step.accepts_selection() {
            Ok(())
        } else {
            Err(WizardError::WrongStep { action, step })
        }
    }

    /// Start a search on the current step.
    pub fn begin_search(&mut self, query: &str) -> Result<SearchTicket, WizardError> {
        self.require_search_step("search")?;
        Ok(self.search.begin(query))
    }

    pub fn resolver(&self) -> &ProductResolver {
        &self.resolver
    }

    /// Apply a resolution obtained for `ticket`; `false` when it came too late.
    pub fn finish_search(&mut self, ticket: &SearchTicket, resolution: Resolution) -> bool {
        self.search.apply(ticket, resolution)
    }

    /// First half of a search: the local store. Returns the ticket when
    /// nothing matched and the online lookup is due; until it finishes the
    /// search status reports the fallback.
    pub async fn search_local(&mut self, query: &str) -> Result<Option<SearchTicket>, WizardError> {
        let ticket = self.begin_search(query)?;
        match self.resolver.search_local(&ticket.query).await {
            Some(resolution) => {
                self.search.apply(&ticket, resolution);
                Ok(None)
            }
            None => {
                self.search.fall_back_online(&ticket);
                Ok(Some(ticket))
            }
        }
    }

    /// Second half of a search after a local miss.
    pub async fn search_online(&mut self, ticket: &SearchTicket) -> bool {
        let resolution = self.resolver.search_online(&ticket.query).await;
        self.search.apply(ticket, resolution)
    }

    /// Search and apply in one go.
    pub async fn search_products(&mut self, query: &str) -> Result<&SearchSession, WizardError> {
        if let Some(ticket) = self.search_local(query).await? {
            self.search_online(&ticket).await;
        }
        Ok(&self.search)
    }

    /// Pick a candidate from the search results.
    pub fn select_candidate(&mut self, index: usize) -> Result<Placement, WizardError> {
        self.require_search_step("select product")?;
        let candidate = self
            .search
            .candidate(index)
            .cloned()
            .ok_or(WizardError::NoSuchCandidate(index))?;

        // The save-back task runs detached.
        let selection = self.resolver.select(&candidate);
        self.place(selection.product)
    }

    /// Use typed-in ingredients. The current search query becomes the title.
    pub fn submit_manual(&mut self, ingredient_text: &str) -> Result<Placement, WizardError> {
        self.require_search_step("manual entry")?;
        let product = self
            .resolver
            .manual_entry(self.search.query(), ingredient_text)?;
        self.place(product)
    }

    fn place(&mut self, product: Product) -> Result<Placement, WizardError> {
        let name = product.display_name();
        let placement = self.wizard.accept_product(product)?;
        self.search.clear();
        info!(product = %name, ?placement, "product added");
        Ok(placement)
    }

    pub fn remove_product(&mut self, routine: Routine, index: usize) -> Option<Product> {
        self.wizard.remove_product(routine, index)
    }

    /// Start over. Outstanding search and analysis responses are discarded.
    pub fn reset(&mut self) {
        self.wizard.reset();
        self.search.clear();
        self.trigger.reset();
        info!("wizard reset");
    }

    /// Issue an analysis ticket if the wizard calls for one.
    pub fn poll_analysis(&mut self) -> Option<AnalysisTicket> {
        self.trigger.observe(&self.wizard)
    }

    pub async fn run_analysis(&self, ticket: &AnalysisTicket) -> Result<AnalysisResult, ApiError> {
        analysis::run(self.analysis.as_ref(), ticket).await
    }

    pub fn finish_analysis(
        &mut self,
        ticket: &AnalysisTicket,
        outcome: Result<AnalysisResult, ApiError>,
    ) -> bool {
        self.trigger.complete(ticket, outcome)
    }

    /// Poll, run and apply. Returns `true` when a result (or failure) was
    /// applied.
    pub async fn drive_analysis(&mut self) -> bool {
        let Some(ticket) = self.poll_analysis() else {
            return false;
        };
        let outcome = self.run_analysis(&ticket).await;
        self.finish_analysis(&ticket, outcome)
    }
}
