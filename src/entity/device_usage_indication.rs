use serde::{Deserialize, Serialize};

use crate::schema::{EntityKind, FieldDef, Record, Schema};
use crate::value::{FieldType, Value};

/// Index on the owning FDA submission.
pub const FDA_SUBMISSION_INDEX: &str = "fdaSubmissionId";

/// Links an FDA submission to the alteration, cancer type and drug it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUsageIndication {
    pub id: i64,
    #[serde(default)]
    pub fda_submission_id: Option<i64>,
    #[serde(default)]
    pub alteration_id: Option<i64>,
    #[serde(default)]
    pub cancer_type_id: Option<i64>,
    #[serde(default)]
    pub drug_id: Option<i64>,
}

impl DeviceUsageIndication {
    #[must_use]
    pub const fn new(id: i64, fda_submission_id: Option<i64>) -> Self {
        Self {
            id,
            fda_submission_id,
            alteration_id: None,
            cancer_type_id: None,
            drug_id: None,
        }
    }
}

const FIELDS: &[FieldDef] = &[
    FieldDef::column("id", FieldType::Long),
    FieldDef::column("fdaSubmissionId", FieldType::Long),
    FieldDef::column("alterationId", FieldType::Long),
    FieldDef::column("cancerTypeId", FieldType::Long),
    FieldDef::column("drugId", FieldType::Long),
];

impl Record for DeviceUsageIndication {
    const SCHEMA: Schema = Schema {
        entity: EntityKind::DeviceUsageIndication,
        fields: FIELDS,
    };

    fn id(&self) -> i64 {
        self.id
    }

    fn column(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(Value::Int(self.id)),
            "fdaSubmissionId" => self.fda_submission_id.map(Value::Int),
            "alterationId" => self.alteration_id.map(Value::Int),
            "cancerTypeId" => self.cancer_type_id.map(Value::Int),
            "drugId" => self.drug_id.map(Value::Int),
            _ => None,
        }
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        self.fda_submission_id
            .iter()
            .map(|id| (FDA_SUBMISSION_INDEX, id.to_string()))
            .collect()
    }
}
