use serde::Deserialize;

/// Stream event pushed by the host transport. Payloads carry camelCase
/// field names on the wire; only the fields the classifier consumes are
/// modeled here.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StreamEvent {
    /// A relationship of any kind was removed (friend, pending request, block).
    RelationshipRemoved { relationship: RelationshipRef },

    /// A member left or was removed from a guild.
    GuildMemberRemoved { guild_id: String, user: UserRef },

    /// A member was banned from a guild. Legacy companion to
    /// GuildMemberRemoved; newer stream versions may fold it in.
    GuildBanAdded { guild_id: String, user: UserRef },

    /// A guild became available (joined or loaded).
    GuildCreated { guild: GuildRef },

    /// A private channel was opened.
    ChannelCreated { channel: ChannelRef },

    /// A private channel was deleted or closed.
    ChannelDeleted { channel: ChannelRef },
}

/// The removed relationship: the other party's user id plus the kind code.
#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildRef {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
}

/// A private channel as carried by channel_created/channel_deleted.
/// Deletion payloads omit name/recipients, hence the defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub name: String,
    pub icon: Option<String>,
    #[serde(default)]
    pub recipients: Vec<String>,
}

/// Kind of a removed relationship, decoded from the wire code at the
/// boundary so the classifier can match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    Friend,
    PendingOutgoing,
    PendingIncoming,
    Blocked,
}

impl RelationshipKind {
    /// Decode a wire code. Unknown codes return None and the event is dropped.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Friend),
            2 => Some(Self::PendingOutgoing),
            3 => Some(Self::PendingIncoming),
            4 => Some(Self::Blocked),
            _ => None,
        }
    }
}

/// Kind of a channel. Everything that is neither a 1:1 DM nor a group
/// chat belongs to a guild and is never tracked here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Dm,
    Group,
    Guild,
}

impl ChannelKind {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Dm,
            3 => Self::Group,
            _ => Self::Guild,
        }
    }
}

/// Notification classification axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Someone removed the local user from their friends list.
    Remove,
    /// Someone cancelled a friend request they had sent to the local user.
    FriendCancel,
    /// The local user was kicked from a guild.
    Kick,
    /// The local user was banned from a guild.
    Ban,
    /// The local user was removed from a group chat.
    Group,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::FriendCancel => "friend_cancel",
            Self::Kick => "kick",
            Self::Ban => "ban",
            Self::Group => "group",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_guild_member_removed() {
        let json = r#"{"type":"guild_member_removed","guildId":"g1","user":{"id":"u1"}}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();
        match event {
            StreamEvent::GuildMemberRemoved { guild_id, user } => {
                assert_eq!(guild_id, "g1");
                assert_eq!(user.id, "u1");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_decode_relationship_removed() {
        let json = r#"{"type":"relationship_removed","relationship":{"id":"u9","type":3}}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();
        match event {
            StreamEvent::RelationshipRemoved { relationship } => {
                assert_eq!(relationship.id, "u9");
                assert_eq!(
                    RelationshipKind::from_code(relationship.kind),
                    Some(RelationshipKind::PendingIncoming)
                );
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_decode_channel_deleted_without_name_or_recipients() {
        let json = r#"{"type":"channel_deleted","channel":{"id":"c1","type":3}}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();
        match event {
            StreamEvent::ChannelDeleted { channel } => {
                assert_eq!(channel.id, "c1");
                assert_eq!(ChannelKind::from_code(channel.kind), ChannelKind::Group);
                assert!(channel.name.is_empty());
                assert!(channel.recipients.is_empty());
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_decode_guild_created() {
        let json =
            r#"{"type":"guild_created","guild":{"id":"g2","name":"Harbor","icon":null}}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();
        match event {
            StreamEvent::GuildCreated { guild } => {
                assert_eq!(guild.id, "g2");
                assert_eq!(guild.name, "Harbor");
                assert!(guild.icon.is_none());
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_relationship_code_is_none() {
        assert_eq!(RelationshipKind::from_code(0), None);
        assert_eq!(RelationshipKind::from_code(9), None);
    }

    #[test]
    fn test_channel_kind_fallback_is_guild() {
        assert_eq!(ChannelKind::from_code(0), ChannelKind::Guild);
        assert_eq!(ChannelKind::from_code(2), ChannelKind::Guild);
        assert_eq!(ChannelKind::from_code(1), ChannelKind::Dm);
    }
}
