use serde::{Deserialize, Serialize};
use std::fmt;

/// The type of a directed association between two items.
///
/// The enumeration is open-ended on the wire: values this build does not
/// recognize parse into [`AssociationType::Other`] instead of failing, so
/// stores written by newer tools remain readable. Conversion from a string
/// is therefore total.
///
/// Two types carry engine semantics:
///
/// - [`AssociationType::ChildOf`] — stored as `origin = child`,
///   `destination = parent` ("child is-child-of parent"). The children of
///   an item are always derived from these rows.
/// - [`AssociationType::ExactMatchOf`] — stored directionally but treated
///   as an undirected equivalence relation by the closure resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssociationType {
    ChildOf,
    ExactMatchOf,
    IsRelatedTo,
    IsPartOf,
    Precedes,
    Replaces,
    ExemplarOf,
    /// An association type this build does not recognize.
    Other(String),
}

impl AssociationType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ChildOf => "is_child_of",
            Self::ExactMatchOf => "exact_match_of",
            Self::IsRelatedTo => "is_related_to",
            Self::IsPartOf => "is_part_of",
            Self::Precedes => "precedes",
            Self::Replaces => "replaces",
            Self::ExemplarOf => "exemplar_of",
            Self::Other(value) => value,
        }
    }
}

impl fmt::Display for AssociationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AssociationType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "is_child_of" => Self::ChildOf,
            "exact_match_of" => Self::ExactMatchOf,
            "is_related_to" => Self::IsRelatedTo,
            "is_part_of" => Self::IsPartOf,
            "precedes" => Self::Precedes,
            "replaces" => Self::Replaces,
            "exemplar_of" => Self::ExemplarOf,
            _ => Self::Other(value.trim().to_string()),
        }
    }
}

impl From<&str> for AssociationType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<AssociationType> for String {
    fn from(value: AssociationType) -> Self {
        value.as_str().to_string()
    }
}

/// Insert record for a new association row.
///
/// The endpoint identifiers are always present; the store resolves them to
/// item ids at insert time where possible and leaves the resolved columns
/// NULL otherwise (cross-document or not-yet-loaded endpoints).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAssociation {
    pub assoc_id: String,
    pub doc_id: String,
    pub assoc_type: AssociationType,
    pub origin_identifier: String,
    pub destination_identifier: String,
}
