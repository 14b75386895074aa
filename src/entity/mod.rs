//! Curation entities.
//!
//! This module groups the concrete record types stored by the curation
//! backend and the tagged union used when related records are
//! materialized by eager reads.

pub mod device_usage_indication;
pub mod feature_flag;
pub mod flag;
pub mod gene;
pub mod transcript;
pub mod user;

use serde::Serialize;

pub use device_usage_indication::DeviceUsageIndication;
pub use feature_flag::FeatureFlag;
pub use flag::Flag;
pub use gene::Gene;
pub use transcript::Transcript;
pub use user::User;

/// A related record of any kind, serialized as the record itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RelatedRecord {
    Gene(Gene),
    Transcript(Transcript),
    Flag(Flag),
    FeatureFlag(FeatureFlag),
    User(User),
    DeviceUsageIndication(DeviceUsageIndication),
}

impl RelatedRecord {
    #[must_use]
    pub const fn id(&self) -> i64 {
        match self {
            Self::Gene(r) => r.id,
            Self::Transcript(r) => r.id,
            Self::Flag(r) => r.id,
            Self::FeatureFlag(r) => r.id,
            Self::User(r) => r.id,
            Self::DeviceUsageIndication(r) => r.id,
        }
    }
}
