use dashmap::DashMap;
use tracing::debug;

use super::events::{ChannelKind, ChannelRef, GuildRef};

/// Display-relevant fields of a guild the local user belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildSnapshot {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
}

impl From<&GuildRef> for GuildSnapshot {
    fn from(guild: &GuildRef) -> Self {
        Self {
            id: guild.id.clone(),
            name: guild.name.clone(),
            icon: guild.icon.clone(),
        }
    }
}

/// Display-relevant fields of a group chat the local user belongs to.
/// An empty name means "unnamed" and is derived from the member list
/// at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSnapshot {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub member_ids: Vec<String>,
}

impl From<&ChannelRef> for GroupSnapshot {
    fn from(channel: &ChannelRef) -> Self {
        Self {
            id: channel.id.clone(),
            name: channel.name.clone(),
            icon: channel.icon.clone(),
            member_ids: channel.recipients.clone(),
        }
    }
}

/// The local user's current guild and group-chat memberships, keyed by id.
/// Answers "was I in this guild/group" synchronously when a removal event
/// arrives. Population can lag process start, so absence is never an error.
pub struct EntityCache {
    guilds: DashMap<String, GuildSnapshot>,
    groups: DashMap<String, GroupSnapshot>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self {
            guilds: DashMap::new(),
            groups: DashMap::new(),
        }
    }

    // ── Guilds ──────────────────────────────────────────────────────

    /// Insert or replace a guild snapshot. Idempotent.
    pub fn upsert_guild(&self, snapshot: GuildSnapshot) {
        self.guilds.insert(snapshot.id.clone(), snapshot);
    }

    /// Remove a guild. Returns whether it was present; removing an
    /// unknown id is a no-op.
    pub fn remove_guild(&self, id: &str) -> bool {
        self.guilds.remove(id).is_some()
    }

    pub fn guild(&self, id: &str) -> Option<GuildSnapshot> {
        self.guilds.get(id).map(|g| g.value().clone())
    }

    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }

    // ── Groups ──────────────────────────────────────────────────────

    /// Track a private channel if it is a group chat. 1:1 DMs and guild
    /// channels are ignored, as are channels already tracked (the create
    /// event can replay what the startup prime already saw). Returns
    /// whether the channel is now tracked because of this call.
    pub fn upsert_group(&self, channel: &ChannelRef) -> bool {
        if ChannelKind::from_code(channel.kind) != ChannelKind::Group {
            return false;
        }
        if self.groups.contains_key(&channel.id) {
            return false;
        }
        self.groups
            .insert(channel.id.clone(), GroupSnapshot::from(channel));
        true
    }

    /// Remove a group. Returns whether it was present.
    pub fn remove_group(&self, id: &str) -> bool {
        self.groups.remove(id).is_some()
    }

    pub fn group(&self, id: &str) -> Option<GroupSnapshot> {
        self.groups.get(id).map(|g| g.value().clone())
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    // ── Startup priming ─────────────────────────────────────────────

    /// Seed the guild set from the host's guild store at startup.
    pub fn prime_guilds<I>(&self, guilds: I)
    where
        I: IntoIterator<Item = GuildSnapshot>,
    {
        for guild in guilds {
            self.guilds.insert(guild.id.clone(), guild);
        }
        debug!(count = self.guilds.len(), "primed guild cache");
    }

    /// Seed the group set from the host's channel store at startup.
    /// Non-group channels are filtered out here so the host can pass
    /// its channel list unfiltered.
    pub fn prime_groups<'a, I>(&self, channels: I)
    where
        I: IntoIterator<Item = &'a ChannelRef>,
    {
        for channel in channels {
            self.upsert_group(channel);
        }
        debug!(count = self.groups.len(), "primed group cache");
    }
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new()
    }
}
