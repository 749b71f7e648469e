//! Conversation turns and the append-only history owned by a dispatcher.

use std::fmt;

/// Role label the remote service uses for model-authored messages.
pub const MODEL_ROLE: &str = "model";
/// Role label the remote service uses for user-authored messages.
pub const USER_ROLE: &str = "user";

/// Who authored a turn, independent of the remote service's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationRole {
    User,
    Assistant,
}

impl ConversationRole {
    /// Translate a remote role label. Only the model label maps to `Assistant`;
    /// anything else, including empty or unknown labels, is treated as `User`.
    pub fn from_remote_label(label: &str) -> Self {
        if label == MODEL_ROLE {
            ConversationRole::Assistant
        } else {
            ConversationRole::User
        }
    }

    pub fn remote_label(self) -> &'static str {
        match self {
            ConversationRole::User => USER_ROLE,
            ConversationRole::Assistant => MODEL_ROLE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConversationRole::User => "user",
            ConversationRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ConversationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    role: ConversationRole,
    text: String,
    sequence_index: usize,
}

impl ConversationTurn {
    pub fn new(role: ConversationRole, text: impl Into<String>, sequence_index: usize) -> Self {
        Self {
            role,
            text: text.into(),
            sequence_index,
        }
    }

    pub fn role(&self) -> ConversationRole {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Position of this turn in its history (0-based).
    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }
}

/// Ordered, append-only list of turns.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the owning dispatcher appends.
    pub(crate) fn push(
        &mut self,
        role: ConversationRole,
        text: impl Into<String>,
    ) -> &ConversationTurn {
        let sequence_index = self.turns.len();
        self.turns.push(ConversationTurn::new(role, text, sequence_index));
        &self.turns[sequence_index]
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConversationTurn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a ConversationTurn;
    type IntoIter = std::slice::Iter<'a, ConversationTurn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_label_is_assistant() {
        assert_eq!(
            ConversationRole::from_remote_label("model"),
            ConversationRole::Assistant
        );
    }

    #[test]
    fn everything_else_is_user() {
        for label in ["user", "", "Model", "assistant", "system", "tool"] {
            assert_eq!(
                ConversationRole::from_remote_label(label),
                ConversationRole::User,
                "label {label:?}"
            );
        }
    }

    #[test]
    fn remote_label_round_trips_through_translation() {
        for role in [ConversationRole::User, ConversationRole::Assistant] {
            assert_eq!(ConversationRole::from_remote_label(role.remote_label()), role);
        }
    }

    #[test]
    fn push_assigns_sequence_index() {
        let mut h = ConversationHistory::new();
        assert!(h.is_empty());
        h.push(ConversationRole::User, "hi");
        let t = h.push(ConversationRole::Assistant, "hello").clone();
        assert_eq!(t.sequence_index(), 1);
        assert_eq!(t.role(), ConversationRole::Assistant);
        assert_eq!(t.text(), "hello");
        assert_eq!(h.len(), 2);
        let indices: Vec<_> = h.iter().map(|t| t.sequence_index()).collect();
        assert_eq!(indices, vec![0, 1]);
    }
}
