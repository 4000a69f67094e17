// Error types surfaced by TaskStore commands

/// Rejected input on `add`; the collection is left unchanged
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("task title cannot be empty")]
    EmptyTitle,
}
