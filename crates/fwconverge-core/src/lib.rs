//! Reconciliation engine between declared firewall rules and the remote
//! policy API exposed by `fwconverge-api`.
//!
//! - **[`Controller`]**: drives one rule at a time through
//!   create / move / update / publish / read-back, and plans without
//!   mutating via [`Controller::plan`].
//!
//! - **Domain model** ([`model`]): declared [`WanRule`] and
//!   [`InternetRule`] with their exceptions. Every collection is a
//!   [`TriState`], which keeps "not declared", "declared empty" and
//!   "declared with items" apart on the wire and in drift checks.
//!
//! - **[`Hydrator`]**: reads a remote rule back into the declared shape,
//!   keeping undeclared fields unset so they never show up as drift.
//!
//! - **[`Plan`]** / **[`FieldDrift`]**: field-by-field comparison of a
//!   declaration against what the remote holds.

pub mod api;
pub mod config;
pub mod controller;
pub mod drift;
pub mod error;
mod exceptions;
pub mod family;
pub mod hydrate;
pub mod model;
mod payload;
mod position;
pub mod resolve;

// ── Primary re-exports ──────────────────────────────────────────────
pub use api::PolicyApi;
pub use config::{EngineConfig, InterfaceNames, PublishSettings};
pub use controller::{
    ConvergenceFailure, Controller, DeleteOutcome, Observed, PlanOutcome, ReadOutcome, RuleState,
    validate,
};
pub use drift::{Converge, FieldDrift, Plan};
pub use error::{CoreError, ErrorEntry};
pub use family::RuleFamily;
pub use hydrate::{HydrationWarning, Hydrator};

pub use fwconverge_api::{InternetFirewall, WanFirewall};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ActivePeriod, ExceptionSet, InternetException, InternetRule, Position, PositionAnchor,
    Reference, RuleAction, TriState, WanException, WanRule,
};
