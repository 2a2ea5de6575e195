//! `skinfit-ai`
//!
//! **Responsibility:** AI subsystem boundary.
//!
//! The models themselves run behind the remote service. This crate only holds
//! what the client exchanges with them:
//! - request/response contracts for compatibility analysis and review generation
//! - the `AnalysisResult` insight and its display verdict
//! - key-point extraction for the collapsed review view
//!
//! It must not mutate routines or products: results are insights, not state.

pub mod request;
pub mod result;
pub mod review;

pub use request::{CompatibilityRequest, GeneratedReview, ReviewRequest};
pub use result::{AiError, AnalysisResult, CompatibilityVerdict, MAX_SCORE, clamp_score};
pub use review::{MAX_KEY_POINTS, ReviewKeyPoints};
