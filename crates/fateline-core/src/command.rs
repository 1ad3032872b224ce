//! Command abstractions.

/// Trait that all inbound requests implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The wire name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Whether a successful command changes room state and must be
    /// followed by a broadcast.
    fn is_mutating(&self) -> bool;
}
