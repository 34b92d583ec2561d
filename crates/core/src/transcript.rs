//! The per-call conversation transcript.
//!
//! A `Transcript` is an ordered list of role-tagged turns. It is seeded with
//! the fixed system prompt at construction; that seed turn is never removed
//! or reordered. Turns are immutable once appended.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The speaker of a single conversation turn.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Function => write!(f, "function"),
        }
    }
}

/// One conversation turn.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// An ordered, capped conversation transcript.
///
/// The cap bounds how much history is carried into each completion request.
/// When an append would exceed it, the oldest turn after the system prompt
/// is dropped. `max_turns` below 2 is treated as 2 so the seed turn and at
/// least one conversation turn always fit.
#[derive(Debug, Clone)]
pub struct Transcript {
    turns: Vec<Turn>,
    max_turns: usize,
}

impl Transcript {
    /// Creates a transcript seeded with the system prompt.
    pub fn new(system_prompt: impl Into<String>, max_turns: usize) -> Self {
        let turns = vec![Turn {
            role: Role::System,
            content: system_prompt.into(),
        }];
        Self {
            turns,
            max_turns: max_turns.max(2),
        }
    }

    /// Appends a turn, evicting the oldest non-system turn if the cap is hit.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(Turn {
            role,
            content: content.into(),
        });
        while self.turns.len() > self.max_turns {
            self.turns.remove(1);
        }
    }

    /// All turns in insertion order. The first is always the system prompt.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The most recently appended turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}
