//! Per-operation message collection.
//!
//! Callers pass a mutable `MessageCollection` into every queue operation.
//! Validation failures surface here as warnings, not-found conditions as
//! errors; operations never panic for caller mistakes.

/// Severity of a collected message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// Mutable collector of warnings and errors surfaced to the caller of
/// enqueue/dequeue/reorder operations.
#[derive(Debug, Default)]
pub struct MessageCollection {
    messages: Vec<(MessageLevel, String)>,
}

impl MessageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_info(&mut self, message: impl Into<String>) {
        self.messages.push((MessageLevel::Info, message.into()));
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.messages.push((MessageLevel::Warning, message.into()));
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.messages.push((MessageLevel::Error, message.into()));
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|(level, _)| *level == MessageLevel::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.messages
            .iter()
            .any(|(level, _)| *level == MessageLevel::Warning)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.of_level(MessageLevel::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.of_level(MessageLevel::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &str> {
        self.of_level(MessageLevel::Info)
    }

    fn of_level(&self, level: MessageLevel) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(move |(l, _)| *l == level)
            .map(|(_, m)| m.as_str())
    }

    /// All messages in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (MessageLevel, &str)> {
        self.messages.iter().map(|(l, m)| (*l, m.as_str()))
    }
}
