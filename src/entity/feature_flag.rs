use serde::{Deserialize, Serialize};

use crate::schema::{EntityKind, FieldDef, Record, Schema};
use crate::value::{FieldType, Value};

pub const NAME_INDEX: &str = "name";

/// An application feature toggle, enabled for a set of users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlag {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub user_ids: Vec<i64>,
}

impl FeatureFlag {
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, enabled: bool) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            enabled,
            user_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_users(mut self, user_ids: impl IntoIterator<Item = i64>) -> Self {
        self.user_ids.extend(user_ids);
        self
    }
}

const FIELDS: &[FieldDef] = &[
    FieldDef::column("id", FieldType::Long),
    FieldDef::column("name", FieldType::String),
    FieldDef::column("description", FieldType::String),
    FieldDef::column("enabled", FieldType::Boolean),
    FieldDef::relation("userId", "users", EntityKind::User),
];

impl Record for FeatureFlag {
    const SCHEMA: Schema = Schema {
        entity: EntityKind::FeatureFlag,
        fields: FIELDS,
    };

    const UNIQUE_INDEXES: &'static [&'static str] = &[NAME_INDEX];

    const EAGER: &'static [&'static str] = &["users"];

    fn id(&self) -> i64 {
        self.id
    }

    fn column(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(Value::Int(self.id)),
            "name" => Some(Value::from(self.name.as_str())),
            "description" => self.description.as_deref().map(Value::from),
            "enabled" => Some(Value::Bool(self.enabled)),
            _ => None,
        }
    }

    fn related_ids(&self, field: &str) -> Vec<i64> {
        match field {
            "userId" => self.user_ids.clone(),
            _ => Vec::new(),
        }
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        vec![(NAME_INDEX, self.name.clone())]
    }
}
