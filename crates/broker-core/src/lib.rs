//! Core domain logic for the carrier load service.
//!
//! Everything in this crate is pure: no database access, no clocks. Callers
//! pass "now" in explicitly so results are reproducible.
//!
//! - [`Load`] / [`CallRecord`] - the two persisted entities
//! - [`location`] - city table, [`resolve_city`] and [`parse_lane`]
//! - [`pricing`] - dynamic target/cap carrier rates
//! - [`scoring`] - relevance of a load to a carrier's stated lane
//! - [`negotiation`] - accept/reject a carrier offer against the listed rate
//! - [`analytics`] - dashboard response types and reshaping helpers
//!
//! # Example
//!
//! ```rust
//! use broker_core::{parse_lane, resolve_city};
//!
//! assert_eq!(resolve_city("dallas"), Some("Dallas, TX"));
//! assert_eq!(
//!     parse_lane("Chicago, IL -> Dallas, TX"),
//!     Some(("Chicago, IL", "Dallas, TX"))
//! );
//! ```

pub mod analytics;
pub mod call;
pub mod location;
pub mod models;
pub mod negotiation;
pub mod pricing;
pub mod scoring;

mod error;

pub use call::CallRecord;
pub use error::NegotiationError;
pub use location::{parse_lane, resolve_city, Coordinates};
pub use models::{Load, LoadStatus, DATETIME_FORMAT};
pub use negotiation::{Decision, NegotiationRequest, NegotiationResponse};
pub use pricing::{CallPressure, PricedRates};
