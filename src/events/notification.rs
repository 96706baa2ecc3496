//! # Storage Notification Structures
//!
//! Wire shapes of object-storage notifications and the typed trigger record
//! extracted from them.

use serde::{Deserialize, Serialize};

/// One actionable (bucket, object key) pair extracted from a notification
///
/// Immutable once parsed. The key is carried exactly as the notification
/// delivered it, still in its URL-encoded form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerRecord {
    /// Storage container (bucket) the object was written to
    pub bucket_name: String,
    /// Object key within the bucket
    pub object_key: String,
}

impl TriggerRecord {
    pub fn new(bucket_name: impl Into<String>, object_key: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            object_key: object_key.into(),
        }
    }
}

impl std::fmt::Display for TriggerRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket_name, self.object_key)
    }
}

/// A single entry of the notification `Records` array
///
/// The storage block is named `s3` by the storage service; `source` is
/// accepted for producers that relay a normalised shape.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawRecord {
    #[serde(alias = "source")]
    pub s3: RawStorageEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawStorageEntity {
    pub bucket: RawBucket,
    pub object: RawObject,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawBucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawObject {
    pub key: String,
}
