//! Curation flags attached to genes and transcripts.

use serde::{Deserialize, Serialize};

use crate::schema::{EntityKind, FieldDef, Record, Schema};
use crate::value::{FieldType, Value};

/// A flag such as a gene type (`ONCOGENE`) or a transcript annotation.
///
/// Flags relate to many genes and many transcripts; filtering on `geneId`
/// or `transcriptId` joins the relationship and fans a flag out into one
/// row per related entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    pub id: i64,
    #[serde(rename = "type")]
    pub flag_type: String,
    pub flag: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub transcript_ids: Vec<i64>,
    #[serde(default)]
    pub gene_ids: Vec<i64>,
}

impl Flag {
    #[must_use]
    pub fn new(
        id: i64,
        flag_type: impl Into<String>,
        flag: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            flag_type: flag_type.into(),
            flag: flag.into(),
            name: name.into(),
            description: None,
            transcript_ids: Vec::new(),
            gene_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_genes(mut self, gene_ids: impl IntoIterator<Item = i64>) -> Self {
        self.gene_ids.extend(gene_ids);
        self
    }

    #[must_use]
    pub fn with_transcripts(mut self, transcript_ids: impl IntoIterator<Item = i64>) -> Self {
        self.transcript_ids.extend(transcript_ids);
        self
    }
}

const FIELDS: &[FieldDef] = &[
    FieldDef::column("id", FieldType::Long),
    FieldDef::column("type", FieldType::String),
    FieldDef::column("flag", FieldType::String),
    FieldDef::column("name", FieldType::String),
    FieldDef::relation("transcriptId", "transcripts", EntityKind::Transcript),
    FieldDef::relation("geneId", "genes", EntityKind::Gene),
];

impl Record for Flag {
    const SCHEMA: Schema = Schema {
        entity: EntityKind::Flag,
        fields: FIELDS,
    };

    const EAGER: &'static [&'static str] = &["genes", "transcripts"];

    fn id(&self) -> i64 {
        self.id
    }

    fn column(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(Value::Int(self.id)),
            "type" => Some(Value::from(self.flag_type.as_str())),
            "flag" => Some(Value::from(self.flag.as_str())),
            "name" => Some(Value::from(self.name.as_str())),
            _ => None,
        }
    }

    fn related_ids(&self, field: &str) -> Vec<i64> {
        match field {
            "transcriptId" => self.transcript_ids.clone(),
            "geneId" => self.gene_ids.clone(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_type_serializes_as_type() {
        let flag = Flag::new(1, "GENE_TYPE", "ONCOGENE", "Oncogene");
        let json = serde_json::to_value(&flag).unwrap();
        assert_eq!(json["type"], "GENE_TYPE");
        assert_eq!(flag.column("type"), Some(Value::from("GENE_TYPE")));
    }

    #[test]
    fn test_related_ids() {
        let flag = Flag::new(1, "T", "F", "N").with_genes([1, 2]).with_transcripts([9]);
        assert_eq!(flag.related_ids("geneId"), vec![1, 2]);
        assert_eq!(flag.related_ids("transcriptId"), vec![9]);
        assert!(flag.related_ids("name").is_empty());
    }
}
