use chrono::{DateTime, Utc};
use common::storage::ObjectMeta;
use serde::Serialize;

use crate::coordinator::RecordMeta;

/// A record stuck in partial creation (no bundle pointer).
#[derive(Serialize, utoipa::ToSchema)]
pub struct OrphanRecord {
    pub id: i32,
    pub created_at: DateTime<Utc>,
}

impl OrphanRecord {
    pub fn from_record<R: RecordMeta>(r: &R) -> Self {
        Self {
            id: r.id(),
            created_at: r.created_at(),
        }
    }
}

/// A stored bundle object no record points at.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UnreferencedObject {
    pub name: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

impl From<ObjectMeta> for UnreferencedObject {
    fn from(o: ObjectMeta) -> Self {
        Self {
            name: o.name,
            size: o.size,
            last_modified: o.last_modified,
        }
    }
}

/// Consistency findings for one resource kind.
#[derive(Serialize, utoipa::ToSchema)]
pub struct KindReport {
    pub orphan_records: Vec<OrphanRecord>,
    pub unreferenced_objects: Vec<UnreferencedObject>,
}

/// Full cross-store consistency report.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ConsistencyReport {
    pub templates: KindReport,
    pub assignments: KindReport,
    pub attempts: KindReport,
}

/// Outcome of a repair request.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RepairResponse {
    pub kind: String,
    pub id: i32,
    pub blob_pointer: Option<String>,
    /// True when this call patched the pointer; false when it was already set.
    pub repaired: bool,
}
