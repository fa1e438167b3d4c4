//! Storage trait surface — the contract between the analysis pipeline and
//! the Knowledge Store. The SQLite implementation lives in
//! `drift-storage`; any future backend implements the same traits. All
//! traits are object-safe, `Send + Sync`, with blanket `Arc<T>` impls so a
//! `Arc<dyn IDriftFiles>` is itself `IDriftFiles`.

pub mod drift_analysis;
pub mod drift_batch;
pub mod drift_enforcement;
pub mod drift_files;
pub mod drift_structural;
pub mod workspace;
pub mod workspace_types;

pub use drift_analysis::IDriftAnalysis;
pub use drift_batch::IDriftBatchWriter;
pub use drift_enforcement::IDriftEnforcement;
pub use drift_files::IDriftFiles;
pub use drift_structural::IDriftStructural;
pub use workspace::IWorkspaceStorage;

/// The full Knowledge Store contract. One concrete type — `drift-storage`'s
/// `DriftStorageEngine` — implements all of these at once; analysis code
/// that only needs one facet should take the narrower trait instead.
pub trait KnowledgeStore:
    IDriftFiles + IDriftAnalysis + IDriftStructural + IDriftEnforcement + IWorkspaceStorage
{
}

impl<T> KnowledgeStore for T where
    T: IDriftFiles + IDriftAnalysis + IDriftStructural + IDriftEnforcement + IWorkspaceStorage
{
}
