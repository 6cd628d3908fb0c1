use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::NotifierConfig;
use crate::directory::UserDirectory;

use super::cache::{EntityCache, GuildSnapshot};
use super::delivery::{DeliveryPolicy, DesktopNotification, RenderedNotification, ToastRequest};
use super::events::{Category, ChannelKind, ChannelRef, RelationshipKind, StreamEvent};
use super::intent::{ActionCategory, IntentTracker};
use super::render::{RenderEntity, render, render_button};

/// The disambiguation-and-notification hub. Consumes the transport's
/// stream events serially, decides per event whether the membership
/// change was involuntary from the local user's perspective, and fans
/// notifications out through the delivery policy.
///
/// All handling is synchronous; the transport delivers events one at a
/// time, so cache and intent state see no concurrent event mutation.
pub struct Notifier {
    config: NotifierConfig,
    cache: EntityCache,
    intents: IntentTracker,
    directory: Arc<dyn UserDirectory>,
    delivery: DeliveryPolicy,
    focused: AtomicBool,
}

impl Notifier {
    pub fn new(
        config: NotifierConfig,
        directory: Arc<dyn UserDirectory>,
        toast_tx: mpsc::UnboundedSender<ToastRequest>,
        desktop_tx: mpsc::UnboundedSender<DesktopNotification>,
    ) -> Self {
        Self {
            config,
            cache: EntityCache::new(),
            intents: IntentTracker::new(),
            directory,
            delivery: DeliveryPolicy::new(toast_tx, desktop_tx),
            focused: AtomicBool::new(true),
        }
    }

    /// Membership cache, exposed for startup priming.
    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    /// Host callback for window focus changes.
    pub fn set_focused(&self, focused: bool) {
        self.focused.store(focused, Ordering::Relaxed);
    }

    // ── Local-action observation ────────────────────────────────────
    //
    // The host must call these when the local user *initiates* the
    // corresponding action, before the call resolves, so the intent is
    // recorded ahead of the confirmation event.

    /// The local user is removing a relationship (unfriending,
    /// withdrawing a request, unblocking).
    pub fn observe_remove_relationship(&self, user_id: &str) {
        self.intents.mark(ActionCategory::Relationship, user_id);
    }

    /// The local user is leaving a guild. The cache entry goes away
    /// immediately; the confirmation event's removal is then a no-op.
    pub fn observe_leave_guild(&self, guild_id: &str) {
        self.intents.mark(ActionCategory::Guild, guild_id);
        self.cache.remove_guild(guild_id);
    }

    /// The local user is closing a private channel. Only marks intent
    /// when the channel is a tracked group; closing a 1:1 DM must not
    /// leave a stray group intent behind.
    pub fn observe_close_private_channel(&self, channel_id: &str) {
        if self.cache.remove_group(channel_id) {
            self.intents.mark(ActionCategory::Group, channel_id);
        }
    }

    // ── Event intake ────────────────────────────────────────────────

    /// Decode and handle one raw transport payload. Undecodable payloads
    /// are logged and dropped; nothing here is ever fatal to the host.
    pub fn handle_raw(&self, payload: &str) {
        match serde_json::from_str::<StreamEvent>(payload) {
            Ok(event) => self.handle_event(event),
            Err(e) => debug!(error = %e, "dropping undecodable stream event"),
        }
    }

    pub fn handle_event(&self, event: StreamEvent) {
        match event {
            StreamEvent::RelationshipRemoved { relationship } => {
                self.on_relationship_removed(&relationship.id, relationship.kind);
            }
            StreamEvent::GuildMemberRemoved { guild_id, user } => {
                self.on_membership_loss(&guild_id, &user.id, Category::Kick);
            }
            StreamEvent::GuildBanAdded { guild_id, user } => {
                self.on_membership_loss(&guild_id, &user.id, Category::Ban);
            }
            StreamEvent::GuildCreated { guild } => {
                self.cache.upsert_guild(GuildSnapshot::from(&guild));
            }
            StreamEvent::ChannelCreated { channel } => {
                if self.cache.upsert_group(&channel) {
                    debug!(channel_id = %channel.id, "tracking new group chat");
                }
            }
            StreamEvent::ChannelDeleted { channel } => {
                self.on_channel_deleted(&channel);
            }
        }
    }

    fn on_relationship_removed(&self, user_id: &str, kind_code: u8) {
        let Some(kind) = RelationshipKind::from_code(kind_code) else {
            debug!(user_id, kind_code, "unknown relationship kind, dropping");
            return;
        };
        // Consume before the kind filter: a local unblock or request
        // withdrawal confirms with a suppressed kind and must still clear
        // its record, or it would swallow a later genuine removal.
        let self_initiated = self
            .intents
            .consume_if_matches(ActionCategory::Relationship, user_id);
        let category = match kind {
            // Blocking someone and withdrawing an outgoing request are
            // local-user actions at the relationship level; never notify.
            RelationshipKind::Blocked | RelationshipKind::PendingOutgoing => return,
            RelationshipKind::Friend => Category::Remove,
            RelationshipKind::PendingIncoming => Category::FriendCancel,
        };
        if self_initiated {
            return;
        }
        let Some(user) = self.directory.user(user_id) else {
            debug!(user_id, "removed relationship with unknown user, dropping");
            return;
        };
        self.notify(category, RenderEntity::User(&user));
    }

    /// Shared path for guild_member_removed and guild_ban_added; they
    /// differ only in notification category.
    fn on_membership_loss(&self, guild_id: &str, user_id: &str, category: Category) {
        if user_id != self.directory.current_user_id() {
            return;
        }
        if self.intents.consume_if_matches(ActionCategory::Guild, guild_id) {
            // Ours. Cache consistency still applies.
            self.cache.remove_guild(guild_id);
            return;
        }
        let Some(guild) = self.cache.guild(guild_id) else {
            // Never saw this guild as joined (e.g. event raced plugin load).
            debug!(guild_id, "membership loss for unknown guild, dropping");
            return;
        };
        self.cache.remove_guild(guild_id);
        info!(guild_id, category = category.as_str(), "involuntary guild removal");
        self.notify(category, RenderEntity::Guild(&guild));
    }

    fn on_channel_deleted(&self, channel: &ChannelRef) {
        if ChannelKind::from_code(channel.kind) != ChannelKind::Group {
            return;
        }
        // Consume before the cache-presence check: the close hook evicts
        // the group at call time, so the confirming event arrives with the
        // entry already gone.
        if self
            .intents
            .consume_if_matches(ActionCategory::Group, &channel.id)
        {
            // Ours. Cache consistency still applies.
            self.cache.remove_group(&channel.id);
            return;
        }
        let Some(group) = self.cache.group(&channel.id) else {
            debug!(channel_id = %channel.id, "deleted group was not tracked, dropping");
            return;
        };
        self.cache.remove_group(&channel.id);
        info!(channel_id = %channel.id, "removed from group chat");
        self.notify(Category::Group, RenderEntity::Group(&group));
    }

    /// Render and dispatch one notification. Render failures skip the
    /// notification (warned, never fatal); sink failures are swallowed
    /// by the delivery policy.
    fn notify(&self, category: Category, entity: RenderEntity<'_>) {
        if !self.config.enabled(category) {
            return;
        }
        let template = self.config.template(category);
        let directory = self.directory.as_ref();
        let rendered = render(category, &template.title, &entity, directory)
            .and_then(|title| {
                render(category, &template.body, &entity, directory).map(|body| (title, body))
            })
            .and_then(|(title, body)| {
                render_button(&self.config.templates.button, &entity, directory)
                    .map(|button_text| (title, body, button_text))
            });
        let (title, body, button_text) = match rendered {
            Ok(parts) => parts,
            Err(e) => {
                warn!(category = category.as_str(), error = %e, "skipping notification");
                return;
            }
        };
        self.delivery.dispatch(
            &self.config.delivery,
            self.focused.load(Ordering::Relaxed),
            RenderedNotification {
                category,
                title,
                body,
                button_text,
                icon_url: entity.icon(),
            },
        );
    }
}
