//! # drift-core
//!
//! Foundation crate for the Drift analysis engine.
//!
//! Defines every type, trait, error, config section, and event shared across
//! the rest of the workspace: the scan/parse/extract/resolve/aggregate
//! pipeline in `drift-analysis` and the Knowledge Store in `drift-storage`
//! both program against the surface defined here. Nothing in this crate
//! touches a syntax tree or a database connection directly.

#![allow(clippy::module_inception)]

pub mod config;
pub mod errors;
pub mod events;
pub mod traits;
pub mod types;
pub mod workspace;

pub use config::DriftConfig;
pub use errors::error_code::DriftErrorCode;
pub use events::dispatcher::EventDispatcher;
pub use events::handler::DriftEventHandler;
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::identifiers::{ClassId, DetectorId, FileId, FunctionId, ModuleId, PatternId, SymbolId};
pub use types::interning::{PathInterner, QualifiedNameInterner};
pub use types::revision::RevisionCounter;
