//! Chat member status used to classify join/leave transitions.

use serde::Deserialize;

use super::{chat::Chat, user::User};

/// Membership status of a user in a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted { is_member: bool },
    Left,
    Kicked,
    Banned,
    Other(String),
}

impl ChatMemberStatus {
    pub fn from_wire(status: &str, is_member: Option<bool>) -> Self {
        match status {
            "creator" => Self::Creator,
            "administrator" => Self::Administrator,
            "member" => Self::Member,
            "restricted" => Self::Restricted {
                is_member: is_member.unwrap_or(true),
            },
            "left" => Self::Left,
            "kicked" => Self::Kicked,
            "banned" => Self::Banned,
            other => Self::Other(other.to_string()),
        }
    }

    /// True when the user is an active member of the chat.
    ///
    /// Unknown statuses count as present so they never produce a spurious leave.
    pub fn is_present(&self) -> bool {
        match self {
            Self::Creator | Self::Administrator | Self::Member | Self::Other(_) => true,
            Self::Restricted { is_member } => *is_member,
            Self::Left | Self::Kicked | Self::Banned => false,
        }
    }
}

/// `ChatMember` as it appears inside a chat-member update.
#[derive(Debug, Clone, Deserialize)]
pub struct RawChatMember {
    pub status: String,
    pub user: User,
    #[serde(default)]
    pub is_member: Option<bool>,
}

impl RawChatMember {
    pub fn status(&self) -> ChatMemberStatus {
        ChatMemberStatus::from_wire(&self.status, self.is_member)
    }
}

/// Payload of `my_chat_member` and `chat_member` updates.
#[derive(Debug, Clone, Deserialize)]
pub struct RawChatMemberUpdated {
    #[serde(default)]
    pub chat: Option<Chat>,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub date: i64,
    pub old_chat_member: RawChatMember,
    pub new_chat_member: RawChatMember,
}

/// Direction of a membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    Joined,
    Left,
    Unchanged,
}

impl RawChatMemberUpdated {
    /// Classifies the old → new status transition.
    pub fn change(&self) -> MembershipChange {
        let was_present = self.old_chat_member.status().is_present();
        let is_present = self.new_chat_member.status().is_present();
        match (was_present, is_present) {
            (false, true) => MembershipChange::Joined,
            (_, false) => MembershipChange::Left,
            (true, true) => MembershipChange::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restricted_non_member_is_absent() {
        assert!(!ChatMemberStatus::from_wire("restricted", Some(false)).is_present());
        assert!(ChatMemberStatus::from_wire("restricted", Some(true)).is_present());
        assert!(!ChatMemberStatus::from_wire("kicked", None).is_present());
        assert!(ChatMemberStatus::from_wire("administrator", None).is_present());
    }
}
