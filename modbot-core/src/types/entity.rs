//! Message entities: (type, UTF-16 offset, UTF-16 length) annotations over message text.

use serde::{Deserialize, Serialize};

use super::user::User;

/// Entity type. Types this crate does not act on deserialize as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Mention,
    Hashtag,
    Cashtag,
    BotCommand,
    Url,
    Email,
    PhoneNumber,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Blockquote,
    ExpandableBlockquote,
    Code,
    Pre,
    TextLink,
    TextMention,
    CustomEmoji,
    #[serde(other)]
    Other,
}

/// One entity; `offset` and `length` count UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub offset: usize,
    pub length: usize,
    #[serde(default)]
    pub url: Option<String>,
    /// Set for `text_mention` entities (users without a username).
    #[serde(default)]
    pub user: Option<User>,
    /// Set for `pre` entities.
    #[serde(default)]
    pub language: Option<String>,
}

impl MessageEntity {
    pub fn new(kind: EntityKind, offset: usize, length: usize) -> Self {
        Self {
            kind,
            offset,
            length,
            url: None,
            user: None,
            language: None,
        }
    }

    /// Exclusive UTF-16 end offset, `None` when `offset + length` overflows.
    pub fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.length)
    }
}
