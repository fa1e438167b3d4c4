//! Workspace lifecycle: init, lock, migration, backup, GC, integrity
//! verification, CI/monorepo detection and the `IWorkspaceStorage`
//! implementation tying them together.

mod backup;
mod ci;
mod context;
mod destructive;
mod detect;
mod errors;
mod gc;
mod init;
mod integrity;
mod lock;
mod migration;
mod monorepo;
mod project;
mod sqlite_storage;
mod status;

pub use backup::{create_backup, prune_backups, restore_from_backup, BackupManifest, BackupReason, BackupRetention};
pub use ci::{detect_ci_environment, is_ci, CiEnvironment};
pub use context::{get_context, refresh_workspace_context, set_context};
pub use destructive::{guard_destructive_operation, DestructiveOperation};
pub use detect::{detect_frameworks, detect_languages, generate_config_template};
pub use errors::{WorkspaceError, WorkspaceResult};
pub use gc::{garbage_collect, GcOptions, GcReport};
pub use init::{is_initialized, open_workspace, workspace_init, InitOptions, WorkspaceInfo};
pub use integrity::{auto_recover, verify_workspace, DatabaseIntegrity, IntegrityReport};
pub use lock::WorkspaceLock;
pub use migration::{get_schema_version, initialize_workspace_db, latest_schema_version};
pub use monorepo::{detect_workspace, register_packages, PackageInfo, WorkspaceLayout};
pub use project::{
    generate_project_id, get_active_project, list_projects, register_project, switch_project,
    ProjectRegistryEntry,
};
pub use sqlite_storage::SqliteWorkspaceStorage;
pub use status::workspace_status;
