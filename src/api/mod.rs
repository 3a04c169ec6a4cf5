//! HTTP query surface for persisted pool logs.
//!
//! A thin axum layer over the store: it validates path/query input, applies
//! a per-request deadline, and maps store outcomes onto the original
//! service's response contract (202 success envelope, 400 invalid input,
//! 500 storage failure).

pub mod correlation;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
