use std::fmt;

/// Machine-readable error codes for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    PartitionOverlap,
    CycleDetected,
    MissingColumn,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::PartitionOverlap => "E2101",
            Self::CycleDetected => "E2102",
            Self::MissingColumn => "E3101",
        }
    }

    /// Short human-facing summary for logs.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::PartitionOverlap => "Reach sets of declared sources overlap",
            Self::CycleDetected => "Network contains a cycle",
            Self::MissingColumn => "Route-link column not found",
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::PartitionOverlap => {
                Some("Choose source nodes whose downstream reaches do not share any reach.")
            }
            Self::CycleDetected => Some("Fix the route-link table so every reach drains downstream."),
            Self::MissingColumn => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors produced while validating or ordering a network.
///
/// Node ids are rendered with their `Debug` form so the error type stays
/// independent of the key type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// Two declared sources reach at least one common node.
    #[error("networks not disjoint: sources {first} and {second} both reach {shared:?}")]
    PartitionOverlap {
        first: String,
        second: String,
        shared: Vec<String>,
    },

    /// Kahn's algorithm could not schedule every node.
    #[error("cycle detected: {unscheduled} node(s) could not be ordered, cycles {cycles:?}")]
    CycleDetected {
        unscheduled: usize,
        /// Members of each strongly connected component that forms a cycle.
        cycles: Vec<Vec<String>>,
    },

    /// The route-link table has no column with this name.
    #[error("route-link column not found: {0}")]
    MissingColumn(String),
}

impl NetworkError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::PartitionOverlap { .. } => ErrorCode::PartitionOverlap,
            Self::CycleDetected { .. } => ErrorCode::CycleDetected,
            Self::MissingColumn(_) => ErrorCode::MissingColumn,
        }
    }
}
