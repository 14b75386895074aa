//! Transcripts of a gene on a reference genome.

use serde::{Deserialize, Serialize};

use crate::schema::{EntityKind, FieldDef, Record, Schema};
use crate::value::{FieldType, Value};

/// Index on the Ensembl transcript id (not unique: one id per genome build).
pub const ENSEMBL_INDEX: &str = "ensemblTranscriptId";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub id: i64,
    #[serde(default)]
    pub gene_id: Option<i64>,
    #[serde(default)]
    pub ensembl_transcript_id: Option<String>,
    pub reference_genome: String,
    #[serde(default)]
    pub canonical: bool,
    #[serde(default)]
    pub flag_ids: Vec<i64>,
}

impl Transcript {
    #[must_use]
    pub fn new(id: i64, reference_genome: impl Into<String>) -> Self {
        Self {
            id,
            gene_id: None,
            ensembl_transcript_id: None,
            reference_genome: reference_genome.into(),
            canonical: false,
            flag_ids: Vec::new(),
        }
    }
}

const FIELDS: &[FieldDef] = &[
    FieldDef::column("id", FieldType::Long),
    FieldDef::column("geneId", FieldType::Long),
    FieldDef::column("ensemblTranscriptId", FieldType::String),
    FieldDef::column("referenceGenome", FieldType::String),
    FieldDef::column("canonical", FieldType::Boolean),
    FieldDef::relation("flagId", "flags", EntityKind::Flag),
];

impl Record for Transcript {
    const SCHEMA: Schema = Schema {
        entity: EntityKind::Transcript,
        fields: FIELDS,
    };

    fn id(&self) -> i64 {
        self.id
    }

    fn column(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(Value::Int(self.id)),
            "geneId" => self.gene_id.map(Value::Int),
            "ensemblTranscriptId" => self.ensembl_transcript_id.as_deref().map(Value::from),
            "referenceGenome" => Some(Value::from(self.reference_genome.as_str())),
            "canonical" => Some(Value::Bool(self.canonical)),
            _ => None,
        }
    }

    fn related_ids(&self, field: &str) -> Vec<i64> {
        match field {
            "flagId" => self.flag_ids.clone(),
            _ => Vec::new(),
        }
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        self.ensembl_transcript_id
            .iter()
            .map(|t| (ENSEMBL_INDEX, t.clone()))
            .collect()
    }
}
