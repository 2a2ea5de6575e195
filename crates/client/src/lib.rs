//! `skinfit-client`
//!
//! **Responsibility:** the skincare compatibility wizard and review flow.
//!
//! This crate provides:
//! - product resolution (local store, online fallback, manual entry)
//! - the wizard step machine and its compatibility analysis trigger
//! - the review form and review page
//! - an HTTP backend plus a terminal shell
//!
//! The backend service is the authority for products, analysis and reviews;
//! the client is a **thin shell** around it.

pub mod analysis;
pub mod api;
pub mod checker;
pub mod config;
pub mod error;
pub mod resolver;
pub mod review;
pub mod shell;
pub mod types;
pub mod wizard;

#[cfg(test)]
mod testing;

pub use analysis::{AnalysisState, AnalysisTicket, CompatibilityAnalysisTrigger};
pub use api::{AnalysisService, HttpBackend, ProductCatalog, ProductPersister, ReviewService};
pub use checker::CompatibilityChecker;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, LookupError, ReviewError, WizardError};
pub use resolver::{ProductResolver, Resolution, SearchSession, SearchTicket, Selection};
pub use review::{MarkdownRenderer, ReviewForm, ReviewFormErrors, ReviewPage, ReviewView};
pub use wizard::{Placement, WizardState, WizardStep};
