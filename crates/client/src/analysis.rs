//! Compatibility analysis trigger.
//!
//! Fires at most once per distinct request (new product, target routine and
//! skin type) while the wizard is on `results`. The request is submitted
//! asynchronously; a response is applied only if no reset or newer request
//! happened in between.

use tracing::{debug, info, warn};

use skinfit_ai::{AnalysisResult, CompatibilityRequest};
use skinfit_core::Generation;

use crate::api::AnalysisService;
use crate::error::{ApiError, LookupError};
use crate::wizard::{WizardState, WizardStep};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnalysisState {
    #[default]
    Idle,
    Pending,
    Ready(AnalysisResult),
    /// The request failed; the results view shows a zero score.
    Failed,
}

/// One outstanding analysis request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisTicket {
    pub generation: Generation,
    pub request: CompatibilityRequest,
}

#[derive(Debug, Clone, Default)]
pub struct CompatibilityAnalysisTrigger {
    state: AnalysisState,
    generation: Generation,
    /// The last request issued; an identical request is not sent twice.
    fired_for: Option<CompatibilityRequest>,
}

impl CompatibilityAnalysisTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == AnalysisState::Pending
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            AnalysisState::Ready(result) => Some(result),
            _ => None,
        }
    }

    /// Score shown on the results step; failures and pending requests show 0.
    pub fn display_score(&self) -> u8 {
        self.result().map_or(0, |r| r.score)
    }

    /// Inspect the wizard and issue a ticket when a request should go out.
    ///
    /// Requires the `results` step, a skin type and a new product. Existing
    /// products come from the routine chosen for the new product. Nothing is
    /// issued when the request would equal the last one sent.
    pub fn observe(&mut self, wizard: &WizardState) -> Option<AnalysisTicket> {
        if wizard.step() != WizardStep::Results {
            return None;
        }
        let new_product = wizard.new_product()?;
        let skin_type = wizard.skin_type()?;

        let request = CompatibilityRequest::new(
            wizard.target_routine(),
            new_product.clone(),
            skin_type.clone(),
        );
        if self.fired_for.as_ref() == Some(&request) {
            return None;
        }

        self.fired_for = Some(request.clone());
        self.state = AnalysisState::Pending;
        let generation = self.generation.bump();

        info!(
            %generation,
            product = %new_product.display_name(),
            current = request.current_products.len(),
            skin_type = %skin_type,
            "requesting compatibility analysis"
        );

        Some(AnalysisTicket {
            generation,
            request,
        })
    }

    /// Apply a response. Returns `false` for a superseded ticket, which leaves
    /// the state untouched.
    pub fn complete(
        &mut self,
        ticket: &AnalysisTicket,
        outcome: Result<AnalysisResult, ApiError>,
    ) -> bool {
        if !self.generation.accepts(ticket.generation) {
            debug!(stale = %ticket.generation, current = %self.generation, "discarding stale analysis response");
            return false;
        }

        self.state = match outcome {
            Ok(result) => {
                info!(score = result.score, verdict = ?result.verdict(), "compatibility analysis complete");
                AnalysisState::Ready(result)
            }
            Err(e) => {
                warn!("{}", LookupError::Analysis(e));
                AnalysisState::Failed
            }
        };
        true
    }

    /// Forget the last result and re-arm. Invalidates any outstanding ticket.
    pub fn reset(&mut self) {
        self.state = AnalysisState::Idle;
        self.fired_for = None;
        self.generation.bump();
    }
}

/// Submit a ticket's request.
pub async fn run(
    service: &dyn AnalysisService,
    ticket: &AnalysisTicket,
) -> Result<AnalysisResult, ApiError> {
    service.analyze_compatibility(&ticket.request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;
    use skinfit_core::{Product, ProductSource, Routine, SkinType, Sku};

    fn product(title: &str, sku: &str) -> Product {
        Product::new(title, "Brand", vec!["Water".into()], Sku::new(sku), ProductSource::Database)
    }

    fn wizard_with(routine: Routine, new_product: Product) -> WizardState {
        let mut wizard = WizardState::new();
        wizard.choose_skin_type(SkinType::new("Dry").unwrap()).unwrap();
        wizard.advance().unwrap();
        wizard.accept_product(product("AM Cleanser", "am-1")).unwrap();
        wizard.advance().unwrap();
        wizard.accept_product(product("PM Retinol", "pm-1")).unwrap();
        wizard.accept_product(product("PM Cream", "pm-2")).unwrap();
        wizard.advance().unwrap();
        wizard.choose_routine(routine).unwrap();
        wizard.advance().unwrap();
        wizard.accept_product(new_product).unwrap();
        wizard
    }

    #[test]
    fn does_not_fire_before_results() {
        let mut trigger = CompatibilityAnalysisTrigger::new();
        let mut wizard = WizardState::new();
        wizard.choose_skin_type(SkinType::new("Dry").unwrap()).unwrap();

        assert!(trigger.observe(&wizard).is_none());
        assert_eq!(trigger.state(), &AnalysisState::Idle);
    }

    #[test]
    fn fires_once_per_product() {
        let mut trigger = CompatibilityAnalysisTrigger::new();
        let wizard = wizard_with(Routine::Pm, product("Serum", "new-1"));

        let ticket = trigger.observe(&wizard).expect("first observation fires");
        assert!(trigger.is_pending());
        assert!(trigger.observe(&wizard).is_none());

        assert!(trigger.complete(&ticket, Ok(AnalysisResult::new(4))));
        assert!(trigger.observe(&wizard).is_none());
        assert_eq!(trigger.display_score(), 4);
    }

    #[test]
    fn request_uses_routine_of_new_product() {
        let mut trigger = CompatibilityAnalysisTrigger::new();
        let ticket = trigger
            .observe(&wizard_with(Routine::Am, product("Serum", "new-1")))
            .unwrap();
        assert_eq!(ticket.request.current_products.len(), 1);
        assert_eq!(ticket.request.current_products[0].title(), "AM Cleanser");

        let mut trigger = CompatibilityAnalysisTrigger::new();
        let ticket = trigger
            .observe(&wizard_with(Routine::Pm, product("Serum", "new-1")))
            .unwrap();
        assert_eq!(ticket.request.current_products.len(), 2);
        assert_eq!(ticket.request.skin_type.as_str(), "Dry");
        assert!(ticket.request.detected_conflicts.is_empty());
    }

    #[test]
    fn same_product_for_other_routine_fires_again() {
        let mut trigger = CompatibilityAnalysisTrigger::new();
        let first = trigger
            .observe(&wizard_with(Routine::Pm, product("Serum", "new-1")))
            .unwrap();
        assert!(trigger.complete(&first, Ok(AnalysisResult::new(5))));

        let second = trigger
            .observe(&wizard_with(Routine::Am, product("Serum", "new-1")))
            .expect("routine change fires a new request");
        assert_eq!(second.request.current_products.len(), 1);
        assert!(trigger.is_pending());
        assert_eq!(trigger.display_score(), 0);
    }

    #[test]
    fn failure_shows_zero_score() {
        let mut trigger = CompatibilityAnalysisTrigger::new();
        let ticket = trigger
            .observe(&wizard_with(Routine::Pm, product("Serum", "new-1")))
            .unwrap();

        assert!(trigger.complete(&ticket, Err(ApiError::Api(500, "boom".into()))));
        assert_eq!(trigger.state(), &AnalysisState::Failed);
        assert_eq!(trigger.display_score(), 0);
    }

    #[test]
    fn reset_discards_in_flight_response_and_rearms() {
        let mut trigger = CompatibilityAnalysisTrigger::new();
        let wizard = wizard_with(Routine::Pm, product("Serum", "new-1"));
        let ticket = trigger.observe(&wizard).unwrap();

        trigger.reset();
        assert!(!trigger.complete(&ticket, Ok(AnalysisResult::new(5))));
        assert_eq!(trigger.state(), &AnalysisState::Idle);
        assert_eq!(trigger.display_score(), 0);

        assert!(trigger.observe(&wizard).is_some());
    }

    #[test]
    fn different_product_fires_again_and_supersedes() {
        let mut trigger = CompatibilityAnalysisTrigger::new();
        let first = trigger
            .observe(&wizard_with(Routine::Pm, product("Serum", "new-1")))
            .unwrap();
        let second = trigger
            .observe(&wizard_with(Routine::Pm, product("Serum", "new-2")))
            .unwrap();

        assert!(!trigger.complete(&first, Ok(AnalysisResult::new(1))));
        assert!(trigger.complete(&second, Ok(AnalysisResult::new(3))));
        assert_eq!(trigger.display_score(), 3);
    }

    #[tokio::test]
    async fn run_submits_the_ticket_request() {
        let backend = MockBackend::new().with_analysis(AnalysisResult::new(2));
        let mut trigger = CompatibilityAnalysisTrigger::new();
        let ticket = trigger
            .observe(&wizard_with(Routine::Am, product("Serum", "new-1")))
            .unwrap();

        let outcome = run(&backend, &ticket).await;
        assert_eq!(outcome, Ok(AnalysisResult::new(2)));
        assert_eq!(backend.analysis_requests(), vec![ticket.request.clone()]);
    }
}
