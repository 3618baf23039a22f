//! # Message Log
//!
//! Player-facing messages emitted by the simulation.
//!
//! The kernel never draws anything; it appends text tagged with an opaque
//! color to the log, and a frontend decides how to show it.

use serde::{Deserialize, Serialize};

/// An RGB color passed through to the frontend untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

/// Named colors used by the simulation when emitting messages and
/// transforming entities.
pub mod colors {
    use super::Color;

    pub const WHITE: Color = Color(0xFF, 0xFF, 0xFF);

    pub const PLAYER_ATK: Color = Color(0xE0, 0xE0, 0xE0);
    pub const ENEMY_ATK: Color = Color(0xFF, 0xC0, 0xC0);
    pub const STATUS_EFFECT_APPLIED: Color = Color(0x3F, 0xFF, 0x3F);
    pub const DESCEND: Color = Color(0x9F, 0x3F, 0xFF);

    pub const PLAYER_DIE: Color = Color(0xFF, 0x30, 0x30);
    pub const ENEMY_DIE: Color = Color(0xFF, 0xA0, 0x30);

    pub const IMPOSSIBLE: Color = Color(0x80, 0x80, 0x80);

    pub const WELCOME_TEXT: Color = Color(0x20, 0xA0, 0xFF);
    pub const HEALTH_RECOVERED: Color = Color(0x00, 0xFF, 0x00);

    pub const CORPSE: Color = Color(191, 0, 0);
}

/// A single line in the message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub color: Color,
    /// How many times this exact message was emitted back to back
    pub count: u32,
}

impl Message {
    pub fn new(text: String, color: Color) -> Self {
        Self {
            text,
            color,
            count: 1,
        }
    }

    /// The text with a repeat counter appended when stacked, e.g. `"Hit (x3)"`.
    pub fn full_text(&self) -> String {
        if self.count > 1 {
            format!("{} (x{})", self.text, self.count)
        } else {
            self.text.clone()
        }
    }
}

/// Ordered log of everything the simulation told the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message, stacking it onto the previous one when identical.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{colors, MessageLog};
    ///
    /// let mut log = MessageLog::new();
    /// log.add_message("The orc attacks.", colors::ENEMY_ATK);
    /// log.add_message("The orc attacks.", colors::ENEMY_ATK);
    /// assert_eq!(log.len(), 1);
    /// assert_eq!(log.last().unwrap().count, 2);
    /// ```
    pub fn add_message(&mut self, text: impl Into<String>, color: Color) {
        let text = text.into();
        if let Some(last) = self.messages.last_mut() {
            if last.text == text {
                last.count += 1;
                return;
            }
        }
        self.messages.push(Message::new(text, color));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Texts of the newest `n` messages, oldest first.
    pub fn recent_texts(&self, n: usize) -> Vec<String> {
        let start = self.messages.len().saturating_sub(n);
        self.messages[start..].iter().map(Message::full_text).collect()
    }

    /// Whether any message in the log has exactly this text.
    pub fn contains(&self, text: &str) -> bool {
        self.messages.iter().any(|message| message.text == text)
    }
}
