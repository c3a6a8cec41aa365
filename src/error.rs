/// Errors raised while loading resolved-type snapshots.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Json(#[from] serde_path_to_error::Error<serde_json::Error>),
    #[error(transparent)]
    Yaml(#[from] serde_path_to_error::Error<serde_yaml::Error>),
    #[error("type reference #{index} is out of range (the table has {len} entries)")]
    BadTypeRef { index: usize, len: usize },
}

/// Errors raised while converting a project.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("no source unit named `{unit}` in the project")]
    UnitNotFound { unit: String },
}
