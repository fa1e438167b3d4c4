//! `IDriftStructural` — boundaries, contracts, secrets, and coupling
//! metrics.
//!
//! Maps to `drift-storage/src/queries/boundaries.rs`, `contracts.rs`,
//! `secrets.rs`, `coupling.rs`.

use std::sync::Arc;

use crate::errors::StorageError;

#[derive(Debug, Clone)]
pub struct BoundaryRow {
    pub id: i64,
    pub file: String,
    pub line: i64,
    pub framework: String,
    pub table_name: String,
    pub field_name: String,
    /// `read` | `write` | `delete` | `update`.
    pub operation: String,
    /// `pii` | `financial` | `auth` | `health` | `custom:<label>`.
    pub sensitivity: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone)]
pub struct ContractRow {
    pub id: String,
    pub http_method: String,
    pub normalised_path: String,
    pub source_file: String,
    pub framework: String,
    /// Recursive `ContractField` tree, serialised.
    pub backend_fields_json: String,
    pub frontend_fields_json: Option<String>,
    pub confidence: f64,
    /// `discovered` | `verified` | `mismatch` | `ignored`.
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct ContractMismatchRow {
    pub id: i64,
    pub contract_id: String,
    pub field_path: String,
    /// `missing_in_frontend` | `missing_in_backend` | `type_mismatch` |
    /// `optionality` | `nullability`.
    pub mismatch_type: String,
    /// `error` | `warning`.
    pub severity: String,
    pub message: String,
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct SecretRow {
    pub id: Option<i64>,
    pub provider_label: String,
    pub redacted_value: String,
    pub file: String,
    pub line: i64,
    pub severity: String,
    pub entropy: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone)]
pub struct CouplingMetricsRow {
    pub module: String,
    pub ca: u32,
    pub ce: u32,
    pub instability: f64,
    pub abstractness: f64,
    pub distance: f64,
}

#[derive(Debug, Clone)]
pub struct CouplingCycleRow {
    pub id: i64,
    /// JSON array of module names forming the strongly-connected component.
    pub members_json: String,
    /// JSON array of candidate edges to break, ranked by `Ce(source)/Ca(target)`.
    pub break_suggestions_json: String,
    pub created_at: i64,
}

/// Boundary, contract, secret, and coupling storage operations.
pub trait IDriftStructural: Send + Sync {
    fn replace_boundaries_for_file(
        &self,
        file: &str,
        rows: &[BoundaryRow],
    ) -> Result<(), StorageError>;
    fn boundaries_with_sensitivity(
        &self,
        sensitivity: &str,
    ) -> Result<Vec<BoundaryRow>, StorageError>;

    fn upsert_contract(&self, row: &ContractRow) -> Result<(), StorageError>;
    fn get_contract(
        &self,
        http_method: &str,
        normalised_path: &str,
    ) -> Result<Option<ContractRow>, StorageError>;
    fn list_contracts(
        &self,
        status: Option<&str>,
        cursor: Option<String>,
        limit: u32,
    ) -> Result<(Vec<ContractRow>, Option<String>), StorageError>;
    fn replace_contract_mismatches(
        &self,
        contract_id: &str,
        rows: &[ContractMismatchRow],
    ) -> Result<(), StorageError>;

    fn replace_secrets_for_file(&self, file: &str, rows: &[SecretRow]) -> Result<(), StorageError>;
    fn count_secrets(&self) -> Result<i64, StorageError>;

    fn replace_coupling_metrics(&self, rows: &[CouplingMetricsRow]) -> Result<(), StorageError>;
    fn replace_coupling_cycles(&self, rows: &[CouplingCycleRow]) -> Result<(), StorageError>;
    fn coupling_metric(&self, module: &str) -> Result<Option<CouplingMetricsRow>, StorageError>;
}

impl<T: IDriftStructural + ?Sized> IDriftStructural for Arc<T> {
    fn replace_boundaries_for_file(
        &self,
        file: &str,
        rows: &[BoundaryRow],
    ) -> Result<(), StorageError> {
        (**self).replace_boundaries_for_file(file, rows)
    }
    fn boundaries_with_sensitivity(
        &self,
        sensitivity: &str,
    ) -> Result<Vec<BoundaryRow>, StorageError> {
        (**self).boundaries_with_sensitivity(sensitivity)
    }
    fn upsert_contract(&self, row: &ContractRow) -> Result<(), StorageError> {
        (**self).upsert_contract(row)
    }
    fn get_contract(
        &self,
        http_method: &str,
        normalised_path: &str,
    ) -> Result<Option<ContractRow>, StorageError> {
        (**self).get_contract(http_method, normalised_path)
    }
    fn list_contracts(
        &self,
        status: Option<&str>,
        cursor: Option<String>,
        limit: u32,
    ) -> Result<(Vec<ContractRow>, Option<String>), StorageError> {
        (**self).list_contracts(status, cursor, limit)
    }
    fn replace_contract_mismatches(
        &self,
        contract_id: &str,
        rows: &[ContractMismatchRow],
    ) -> Result<(), StorageError> {
        (**self).replace_contract_mismatches(contract_id, rows)
    }
    fn replace_secrets_for_file(&self, file: &str, rows: &[SecretRow]) -> Result<(), StorageError> {
        (**self).replace_secrets_for_file(file, rows)
    }
    fn count_secrets(&self) -> Result<i64, StorageError> {
        (**self).count_secrets()
    }
    fn replace_coupling_metrics(&self, rows: &[CouplingMetricsRow]) -> Result<(), StorageError> {
        (**self).replace_coupling_metrics(rows)
    }
    fn replace_coupling_cycles(&self, rows: &[CouplingCycleRow]) -> Result<(), StorageError> {
        (**self).replace_coupling_cycles(rows)
    }
    fn coupling_metric(&self, module: &str) -> Result<Option<CouplingMetricsRow>, StorageError> {
        (**self).coupling_metric(module)
    }
}
