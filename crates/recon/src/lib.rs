//! `tcgsync-recon`: Card identifier normalization and reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded records, returns canonical results.
//! No CLI or IO dependencies.

pub mod canonical;
pub mod enrich;
pub mod error;
pub mod extras;
pub mod merge;
pub mod missing;
pub mod model;
pub mod normalize;
pub mod reference;
pub mod sets;
pub mod source;
pub mod sync;

pub use canonical::{canonicalize, canonicalize_all, CanonicalizeOptions};
pub use error::ReconError;
pub use merge::{merge, upgrade_legacy, MergeOutcome, OverridePolicy};
pub use model::{Card, Catalog, MissingSet, RawCard, SyncMapping};
pub use sync::{build_sync_mapping, SyncReport};
