use serde::{Deserialize, Serialize};

/// Insert record for a new framework document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    pub doc_id: String,
    pub title: String,
}

/// Insert record for a new framework item.
///
/// `identifier` is the item's external key and must be unique across the
/// store; `human_coding_scheme` is a human-readable code with no uniqueness
/// guarantee. `rank` and `list_enum_in_source` are ordering hints consumed
/// by the per-document ordering query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewItem {
    pub item_id: String,
    pub doc_id: String,
    pub identifier: String,
    pub human_coding_scheme: Option<String>,
    pub full_statement: String,
    pub rank: Option<i64>,
    pub list_enum_in_source: Option<String>,
}

impl Default for NewItem {
    fn default() -> Self {
        Self {
            item_id: String::new(),
            doc_id: String::new(),
            identifier: String::new(),
            human_coding_scheme: None,
            full_statement: String::new(),
            rank: None,
            list_enum_in_source: None,
        }
    }
}
