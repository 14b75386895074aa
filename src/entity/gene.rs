//! Genes, identified by Entrez id, HUGO symbol or any registered alias.

use serde::{Deserialize, Serialize};

use crate::resolver::{Resolvable, ResolutionKey};
use crate::schema::{EntityKind, FieldDef, Record, Schema};
use crate::value::{FieldType, Value};

/// Index on the Entrez gene id.
pub const ENTREZ_INDEX: &str = "entrezGeneId";
/// Index on the HUGO symbol.
pub const SYMBOL_INDEX: &str = "hugoSymbol";
/// Index on gene aliases.
pub const ALIAS_INDEX: &str = "alias";

/// A gene.
///
/// Entrez ids, symbols and aliases are unique across all genes; the store
/// rejects an insert that would make any of them ambiguous.
///
/// # Examples
///
/// ```
/// use curation_api::entity::Gene;
///
/// let gene = Gene::new(1, 673, "BRAF").with_alias("BRAF1");
/// assert_eq!(gene.hugo_symbol, "BRAF");
/// assert_eq!(gene.aliases, vec!["BRAF1".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gene {
    pub id: i64,
    pub entrez_gene_id: i32,
    pub hugo_symbol: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub flag_ids: Vec<i64>,
}

impl Gene {
    #[must_use]
    pub fn new(id: i64, entrez_gene_id: i32, hugo_symbol: impl Into<String>) -> Self {
        Self {
            id,
            entrez_gene_id,
            hugo_symbol: hugo_symbol.into(),
            aliases: Vec::new(),
            flag_ids: Vec::new(),
        }
    }

    /// Adds an alias unless already present.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flag_ids: impl IntoIterator<Item = i64>) -> Self {
        self.flag_ids.extend(flag_ids);
        self
    }
}

const FIELDS: &[FieldDef] = &[
    FieldDef::column("id", FieldType::Long),
    FieldDef::column("entrezGeneId", FieldType::Integer),
    FieldDef::column("hugoSymbol", FieldType::String),
    FieldDef::relation("flagId", "flags", EntityKind::Flag),
];

impl Record for Gene {
    const SCHEMA: Schema = Schema {
        entity: EntityKind::Gene,
        fields: FIELDS,
    };

    const UNIQUE_INDEXES: &'static [&'static str] = &[ENTREZ_INDEX, SYMBOL_INDEX, ALIAS_INDEX];

    fn id(&self) -> i64 {
        self.id
    }

    fn column(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(Value::Int(self.id)),
            "entrezGeneId" => Some(Value::from(self.entrez_gene_id)),
            "hugoSymbol" => Some(Value::from(self.hugo_symbol.as_str())),
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
        let mut keys = vec![
            (ENTREZ_INDEX, self.entrez_gene_id.to_string()),
            (SYMBOL_INDEX, self.hugo_symbol.clone()),
        ];
        keys.extend(self.aliases.iter().map(|a| (ALIAS_INDEX, a.clone())));
        keys
    }
}

impl Resolvable for Gene {
    fn resolution_index(key: ResolutionKey) -> Option<&'static str> {
        Some(match key {
            ResolutionKey::NumericId => ENTREZ_INDEX,
            ResolutionKey::PrimaryName => SYMBOL_INDEX,
            ResolutionKey::Alias => ALIAS_INDEX,
        })
    }
}
