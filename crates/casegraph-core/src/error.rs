use std::fmt;

/// Machine-readable error codes for callers that dispatch on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    StoreNotInitialized,
    ConfigParseError,
    ItemNotFound,
    ItemHasChildren,
    CorruptHierarchy,
    LockContention,
    StoreFault,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::StoreNotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::ItemNotFound => "E2001",
            Self::ItemHasChildren => "E2002",
            Self::CorruptHierarchy => "E2003",
            Self::LockContention => "E5001",
            Self::StoreFault => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::StoreNotInitialized => "Graph store not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::ItemNotFound => "Item not found",
            Self::ItemHasChildren => "Item still has children",
            Self::CorruptHierarchy => "Corrupt item hierarchy",
            Self::LockContention => "Lock contention",
            Self::StoreFault => "Graph store failure",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::StoreNotInitialized => {
                Some("Open or create the store before running graph operations.")
            }
            Self::ConfigParseError => Some("Fix syntax in .casegraph/config.toml and retry."),
            Self::ItemNotFound => None,
            Self::ItemHasChildren => {
                Some("Remove the item's children first, or remove the whole subtree.")
            }
            Self::CorruptHierarchy => {
                Some("A child-of cycle exists in the store; repair the data before retrying.")
            }
            Self::LockContention => {
                Some("Retry after the other casegraph process releases its lock.")
            }
            Self::StoreFault => Some("Check the store file and disk, then retry."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
