//! Client error taxonomy.

use skinfit_ai::AiError;
use skinfit_core::DomainError;
use thiserror::Error;

use crate::wizard::WizardStep;

/// Transport-level failure talking to the backend service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiError {
    pub(crate) fn network(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }

    pub(crate) fn parse(err: impl core::fmt::Display) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Failures of product lookup, save-back and analysis.
///
/// None of these is fatal to the wizard: resolution failures prompt manual
/// entry, persistence failures are only logged, analysis failures show a zero
/// score.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Local store had no match; triggers the online fallback.
    #[error("Not found in database. Searching online...")]
    NotFoundLocally,

    #[error("Product not found online. Please enter ingredients manually.")]
    NotFoundOnline,

    #[error("Failed to search. Please enter ingredients manually.")]
    Transport(#[source] ApiError),

    #[error("failed to save product to the local store: {0}")]
    Persistence(#[source] ApiError),

    #[error("compatibility analysis failed: {0}")]
    Analysis(#[source] ApiError),
}

impl LookupError {
    /// Shown to the user (as opposed to logged only).
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, LookupError::NotFoundLocally | LookupError::Persistence(_))
    }

    pub fn recommends_manual_entry(&self) -> bool {
        matches!(self, LookupError::NotFoundOnline | LookupError::Transport(_))
    }
}

/// An action that the current wizard step does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("choose a skin type first")]
    MissingSkinType,

    #[error("choose a routine (AM or PM) first")]
    MissingRoutine,

    #[error("select a product to see results")]
    SelectionRequired,

    #[error("no step after {0}")]
    NoForwardStep(WizardStep),

    #[error("`{action}` is not available on step {step}")]
    WrongStep {
        action: &'static str,
        step: WizardStep,
    },

    #[error("no search candidate at position {0}")]
    NoSuchCandidate(usize),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Failure of the product review flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("review form is incomplete")]
    Incomplete(crate::review::ReviewFormErrors),

    #[error("{0}")]
    Service(#[source] ApiError),

    #[error(transparent)]
    Malformed(#[from] AiError),
}

impl ReviewError {
    /// Message shown next to the review form.
    pub fn user_message(&self) -> String {
        match self {
            ReviewError::Incomplete(_) => "Please fill in all fields".to_string(),
            ReviewError::Service(ApiError::Api(_, detail)) if !detail.trim().is_empty() => {
                detail.clone()
            }
            ReviewError::Service(_) | ReviewError::Malformed(_) => {
                "Failed to generate review".to_string()
            }
        }
    }
}
