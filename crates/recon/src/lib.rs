//! `bomsync-recon`: BOM status reconciliation engine.
//!
//! Pure engine crate: receives a working table and a reference (master)
//! table, classifies every working row against the reference and returns the
//! mutated reference, the extended working table and a change log.
//! No CLI or IO dependencies.

pub mod changelog;
pub mod clean;
pub mod column;
pub mod commit;
pub mod config;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod model;
pub mod normalize;
pub mod policy;

pub use changelog::ChangeLog;
pub use config::ReconConfig;
pub use engine::run;
pub use error::ReconError;
pub use model::{Action, ReconResult, Status, StatusCounts, Table};
