use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{EntityKind, FieldDef, Record, Schema};
use crate::value::{FieldType, Value};

pub const LOGIN_INDEX: &str = "login";

/// A curator account. Only the fields needed for feature-flag assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub activated: bool,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

impl User {
    #[must_use]
    pub fn new(id: i64, login: impl Into<String>) -> Self {
        Self {
            id,
            login: login.into(),
            email: None,
            activated: true,
            created_date: None,
        }
    }
}

const FIELDS: &[FieldDef] = &[
    FieldDef::column("id", FieldType::Long),
    FieldDef::column("login", FieldType::String),
    FieldDef::column("email", FieldType::String),
    FieldDef::column("activated", FieldType::Boolean),
    FieldDef::column("createdDate", FieldType::Instant),
];

impl Record for User {
    const SCHEMA: Schema = Schema {
        entity: EntityKind::User,
        fields: FIELDS,
    };

    const UNIQUE_INDEXES: &'static [&'static str] = &[LOGIN_INDEX];

    fn id(&self) -> i64 {
        self.id
    }

    fn column(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(Value::Int(self.id)),
            "login" => Some(Value::from(self.login.as_str())),
            "email" => self.email.as_deref().map(Value::from),
            "activated" => Some(Value::Bool(self.activated)),
            "createdDate" => self.created_date.map(Value::Instant),
            _ => None,
        }
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        vec![(LOGIN_INDEX, self.login.clone())]
    }
}
