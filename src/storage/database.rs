//! The full set of curation tables.

use std::collections::BTreeSet;

use crate::entity::device_usage_indication::FDA_SUBMISSION_INDEX;
use crate::entity::{
    DeviceUsageIndication, FeatureFlag, Flag, Gene, RelatedRecord, Transcript, User,
};
use crate::schema::{EntityKind, FieldKind, Record};
use crate::storage::memory::InMemoryTable;
use crate::storage::traits::{EntityStore, HasStore, RelationSource, Select, StorageError};

/// One in-memory table per entity.
#[derive(Debug, Default)]
pub struct Database {
    pub genes: InMemoryTable<Gene>,
    pub transcripts: InMemoryTable<Transcript>,
    pub flags: InMemoryTable<Flag>,
    pub feature_flags: InMemoryTable<FeatureFlag>,
    pub users: InMemoryTable<User>,
    pub device_usage_indications: InMemoryTable<DeviceUsageIndication>,
}

impl Database {
    /// Create an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Device usage indications filed under one FDA submission, by id.
    ///
    /// # Errors
    /// Propagates [`StorageError`] from the table.
    pub fn find_by_fda_submission_id(
        &self,
        fda_submission_id: i64,
    ) -> Result<Vec<DeviceUsageIndication>, StorageError> {
        self.device_usage_indications
            .find_by_index(FDA_SUBMISSION_INDEX, &fda_submission_id.to_string())
    }

    /// Ids stored in the table for `kind`.
    ///
    /// # Errors
    /// Propagates [`StorageError`] from the table.
    pub fn ids(&self, kind: EntityKind) -> Result<BTreeSet<i64>, StorageError> {
        match kind {
            EntityKind::Gene => self.genes.ids(),
            EntityKind::Transcript => self.transcripts.ids(),
            EntityKind::Flag => self.flags.ids(),
            EntityKind::FeatureFlag => self.feature_flags.ids(),
            EntityKind::User => self.users.ids(),
            EntityKind::DeviceUsageIndication => self.device_usage_indications.ids(),
        }
    }

    /// Checks that every relationship id in `E`'s table points at a stored
    /// record.
    ///
    /// # Errors
    /// Returns [`StorageError::DanglingReference`] for the first missing
    /// target found.
    pub fn check_references<E: Record>(&self) -> Result<(), StorageError>
    where
        Self: HasStore<E>,
    {
        let store = <Self as HasStore<E>>::store(self);
        let records = store.select(&Select::all())?;
        for def in E::SCHEMA.relations() {
            let FieldKind::Relation { target, .. } = def.kind else {
                continue;
            };
            let known = self.ids(target)?;
            for record in &records {
                if let Some(missing) = record
                    .related_ids(def.name)
                    .into_iter()
                    .find(|id| !known.contains(id))
                {
                    return Err(StorageError::DanglingReference {
                        entity: E::SCHEMA.entity,
                        id: record.id(),
                        target,
                        target_id: missing,
                    });
                }
            }
        }
        Ok(())
    }
}

macro_rules! has_store {
    ($entity:ty, $field:ident) => {
        impl HasStore<$entity> for Database {
            fn store(&self) -> &dyn EntityStore<$entity> {
                &self.$field
            }
        }
    };
}

has_store!(Gene, genes);
has_store!(Transcript, transcripts);
has_store!(Flag, flags);
has_store!(FeatureFlag, feature_flags);
has_store!(User, users);
has_store!(DeviceUsageIndication, device_usage_indications);

impl RelationSource for Database {
    fn load_related(
        &self,
        target: EntityKind,
        ids: &[i64],
    ) -> Result<Vec<RelatedRecord>, StorageError> {
        let ids: Vec<i64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let related = match target {
            EntityKind::Gene => self
                .genes
                .get_many(&ids)?
                .into_iter()
                .map(RelatedRecord::Gene)
                .collect(),
            EntityKind::Transcript => self
                .transcripts
                .get_many(&ids)?
                .into_iter()
                .map(RelatedRecord::Transcript)
                .collect(),
            EntityKind::Flag => self
                .flags
                .get_many(&ids)?
                .into_iter()
                .map(RelatedRecord::Flag)
                .collect(),
            EntityKind::FeatureFlag => self
                .feature_flags
                .get_many(&ids)?
                .into_iter()
                .map(RelatedRecord::FeatureFlag)
                .collect(),
            EntityKind::User => self
                .users
                .get_many(&ids)?
                .into_iter()
                .map(RelatedRecord::User)
                .collect(),
            EntityKind::DeviceUsageIndication => self
                .device_usage_indications
                .get_many(&ids)?
                .into_iter()
                .map(RelatedRecord::DeviceUsageIndication)
                .collect(),
        };
        Ok(related)
    }
}
