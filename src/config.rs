use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::engine::events::Category;

/// Notifier configuration, loaded from relnotify.toml. Every field has a
/// default, so an absent file or a partial file both work. The struct is
/// passed into the engine at construction; nothing reads settings ambiently.
#[derive(Deserialize, Default, Clone)]
#[serde(default)]
pub struct NotifierConfig {
    pub categories: CategoriesSection,
    pub delivery: DeliverySection,
    pub templates: TemplatesSection,
}

/// Per-category notification enable flags. All default to on.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct CategoriesSection {
    pub remove: bool,
    pub friend_cancel: bool,
    pub kick: bool,
    pub ban: bool,
    pub group: bool,
}

impl Default for CategoriesSection {
    fn default() -> Self {
        Self {
            remove: true,
            friend_cancel: true,
            kick: true,
            ban: true,
            group: true,
        }
    }
}

/// Global sink gating. The toast and desktop sinks carry independent
/// focus gates: `app_toasts_focus` means "toast only while the app is
/// focused", `desktop_notif_focus` flips the desktop sink from its
/// default only-while-unfocused behavior to only-while-focused.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct DeliverySection {
    pub app_toasts: bool,
    pub app_toasts_focus: bool,
    pub desktop_notif: bool,
    pub desktop_notif_focus: bool,
}

impl Default for DeliverySection {
    fn default() -> Self {
        Self {
            app_toasts: true,
            app_toasts_focus: false,
            desktop_notif: true,
            desktop_notif_focus: false,
        }
    }
}

/// Title/body pair for one notification category. Bodies may reference
/// the category's placeholder tokens (see the render module).
#[derive(Deserialize, Clone)]
pub struct Template {
    pub title: String,
    pub body: String,
}

impl Template {
    fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct TemplatesSection {
    /// Text of the toast's action button; `%name` resolves to the
    /// entity's display name.
    pub button: String,
    pub remove: Template,
    pub friend_cancel: Template,
    pub kick: Template,
    pub ban: Template,
    pub group: Template,
}

impl Default for TemplatesSection {
    fn default() -> Self {
        Self {
            button: "Dismiss".to_string(),
            remove: Template::new("Someone removed you", "Tag: %username#%usertag"),
            friend_cancel: Template::new(
                "Friend request cancelled",
                "Tag: %username#%usertag",
            ),
            kick: Template::new("You've been kicked", "Server Name: %servername"),
            ban: Template::new("You've been banned", "Server Name: %servername"),
            group: Template::new(
                "You've been removed from a group",
                "Group Name: %groupname",
            ),
        }
    }
}

impl NotifierConfig {
    /// Load config from a TOML file. Falls back to defaults if the file
    /// doesn't exist. Environment variables override the global sink flags.
    pub fn load(path: &str) -> Self {
        let mut config = if Path::new(path).exists() {
            let contents = std::fs::read_to_string(path)
                .unwrap_or_else(|e| panic!("failed to read config file {}: {}", path, e));
            toml::from_str(&contents)
                .unwrap_or_else(|e| panic!("failed to parse config file {}: {}", path, e))
        } else {
            info!("No config file found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("RELNOTIFY_APP_TOASTS")
            && let Ok(enabled) = v.parse()
        {
            self.delivery.app_toasts = enabled;
        }
        if let Ok(v) = std::env::var("RELNOTIFY_DESKTOP_NOTIF")
            && let Ok(enabled) = v.parse()
        {
            self.delivery.desktop_notif = enabled;
        }
    }

    /// Whether notifications for a category are enabled.
    pub fn enabled(&self, category: Category) -> bool {
        match category {
            Category::Remove => self.categories.remove,
            Category::FriendCancel => self.categories.friend_cancel,
            Category::Kick => self.categories.kick,
            Category::Ban => self.categories.ban,
            Category::Group => self.categories.group,
        }
    }

    /// Title/body template for a category (user-supplied or default).
    pub fn template(&self, category: Category) -> &Template {
        match category {
            Category::Remove => &self.templates.remove,
            Category::FriendCancel => &self.templates.friend_cancel,
            Category::Kick => &self.templates.kick,
            Category::Ban => &self.templates.ban,
            Category::Group => &self.templates.group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let config = NotifierConfig::default();
        assert!(config.enabled(Category::Remove));
        assert!(config.enabled(Category::FriendCancel));
        assert!(config.enabled(Category::Kick));
        assert!(config.enabled(Category::Ban));
        assert!(config.enabled(Category::Group));
        assert_eq!(config.template(Category::Kick).title, "You've been kicked");
        assert_eq!(
            config.template(Category::Kick).body,
            "Server Name: %servername"
        );
        assert!(config.delivery.app_toasts);
        assert!(!config.delivery.app_toasts_focus);
        assert!(config.delivery.desktop_notif);
        assert!(!config.delivery.desktop_notif_focus);
        assert_eq!(config.templates.button, "Dismiss");
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: NotifierConfig = toml::from_str(
            r#"
            [categories]
            kick = false

            [delivery]
            app_toasts_focus = true

            [templates.group]
            title = "Gone"
            body = "%groupname (%groupid)"
            "#,
        )
        .unwrap();
        assert!(!config.enabled(Category::Kick));
        assert!(config.enabled(Category::Ban));
        assert!(config.delivery.app_toasts);
        assert!(config.delivery.app_toasts_focus);
        assert_eq!(config.template(Category::Group).title, "Gone");
        assert_eq!(config.template(Category::Group).body, "%groupname (%groupid)");
        assert_eq!(config.template(Category::Remove).title, "Someone removed you");
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config: NotifierConfig = toml::from_str("").unwrap();
        assert!(config.enabled(Category::Group));
        assert_eq!(
            config.template(Category::Group).body,
            "Group Name: %groupname"
        );
    }
}
