use chrono::{DateTime, Utc};
use thiserror::Error;

/// Fatal engine outcomes for one case. Gating rejections and exhausted
/// searches are ordinary control flow, not errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackError {
    /// Neither rotational sense yielded an anchor cluster; the case is
    /// skipped, the batch may continue.
    #[error("no reference cluster found for either rotational sense")]
    NoReferenceCluster,

    /// A candidate that would otherwise have been accepted lacks required
    /// wind/shear model fields. Fatal to the case.
    #[error("{kind} cluster at {timestamp} is missing model field {field}")]
    MissingAuxiliaryModelData {
        kind: &'static str,
        timestamp: DateTime<Utc>,
        field: &'static str,
    },
}
