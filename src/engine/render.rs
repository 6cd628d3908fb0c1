use crate::directory::{UserDirectory, UserRecord};

use super::cache::{GroupSnapshot, GuildSnapshot};
use super::events::Category;

/// The entity a notification is about, borrowed from the cache or the
/// user directory for the duration of one render.
#[derive(Debug, Clone, Copy)]
pub enum RenderEntity<'a> {
    User(&'a UserRecord),
    Guild(&'a GuildSnapshot),
    Group(&'a GroupSnapshot),
}

impl RenderEntity<'_> {
    pub fn icon(&self) -> Option<String> {
        match self {
            Self::User(_) => None,
            Self::Guild(guild) => guild.icon.clone(),
            Self::Group(group) => group.icon.clone(),
        }
    }
}

/// Substitute a category's placeholder tokens into a template. Each
/// recognized token is replaced everywhere it occurs, in a single literal
/// pass; unrecognized tokens are left verbatim. Errors only when a group
/// name has to be derived from members and a directory lookup fails.
pub fn render(
    category: Category,
    template: &str,
    entity: &RenderEntity<'_>,
    directory: &dyn UserDirectory,
) -> Result<String, String> {
    match (category, entity) {
        (Category::Remove | Category::FriendCancel, RenderEntity::User(user)) => Ok(template
            .replace("%username", &user.username)
            .replace("%usertag", &user.discriminator)
            .replace("%userid", &user.id)),
        (Category::Kick | Category::Ban, RenderEntity::Guild(guild)) => Ok(template
            .replace("%servername", &guild.name)
            .replace("%serverid", &guild.id)),
        (Category::Group, RenderEntity::Group(group)) => {
            let name = group_display_name(group, directory)?;
            Ok(template
                .replace("%groupname", &name)
                .replace("%groupid", &group.id))
        }
        (category, entity) => Err(format!(
            "cannot render {} notification against {:?}",
            category.as_str(),
            entity
        )),
    }
}

/// Substitute `%name` in the toast button template with the entity's
/// display name.
pub fn render_button(
    template: &str,
    entity: &RenderEntity<'_>,
    directory: &dyn UserDirectory,
) -> Result<String, String> {
    let name = match entity {
        RenderEntity::User(user) => user.username.clone(),
        RenderEntity::Guild(guild) => guild.name.clone(),
        RenderEntity::Group(group) => group_display_name(group, directory)?,
    };
    Ok(template.replace("%name", &name))
}

/// Display name of a group chat. Unnamed groups derive their name from
/// the member list; the directory is authoritative for cached members,
/// so a failed lookup aborts this render.
fn group_display_name(
    group: &GroupSnapshot,
    directory: &dyn UserDirectory,
) -> Result<String, String> {
    if !group.name.is_empty() {
        return Ok(group.name.clone());
    }
    let mut names = Vec::with_capacity(group.member_ids.len());
    for member_id in &group.member_ids {
        let user = directory.user(member_id).ok_or_else(|| {
            format!("user {member_id} not in directory while naming group {}", group.id)
        })?;
        names.push(user.username);
    }
    Ok(names.join(", "))
}
