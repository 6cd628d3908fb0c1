use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::config::DeliverySection;

use super::events::Category;

/// An in-app toast, handed to the host's toast widget.
#[derive(Debug, Clone, Serialize)]
pub struct ToastRequest {
    pub id: String,
    pub header: String,
    pub content: String,
    pub severity: ToastSeverity,
    pub buttons: Vec<ToastButton>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastSeverity {
    Danger,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToastButton {
    pub text: String,
    pub color: String,
    pub size: String,
    pub look: String,
}

impl ToastButton {
    fn dismiss(text: String) -> Self {
        Self {
            text,
            color: "red".to_string(),
            size: "small".to_string(),
            look: "outlined".to_string(),
        }
    }
}

/// A system-level notification, handed to the host's desktop bridge.
#[derive(Debug, Clone, Serialize)]
pub struct DesktopNotification {
    pub title: String,
    pub body: String,
    pub icon_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One fully rendered notification, before sink fan-out.
#[derive(Debug, Clone)]
pub struct RenderedNotification {
    pub category: Category,
    pub title: String,
    pub body: String,
    pub button_text: String,
    pub icon_url: Option<String>,
}

/// Fans a rendered notification out to zero or more sinks based on the
/// delivery config and current focus state. Sinks are fire-and-forget
/// channels: a closed or unwilling receiver never surfaces an error and
/// never affects cache or intent state.
pub struct DeliveryPolicy {
    toast_tx: mpsc::UnboundedSender<ToastRequest>,
    desktop_tx: mpsc::UnboundedSender<DesktopNotification>,
}

impl DeliveryPolicy {
    pub fn new(
        toast_tx: mpsc::UnboundedSender<ToastRequest>,
        desktop_tx: mpsc::UnboundedSender<DesktopNotification>,
    ) -> Self {
        Self {
            toast_tx,
            desktop_tx,
        }
    }

    pub fn dispatch(
        &self,
        delivery: &DeliverySection,
        focused: bool,
        notification: RenderedNotification,
    ) {
        let toast = toast_allowed(delivery, focused);
        let desktop = desktop_allowed(delivery, focused);
        debug!(
            category = notification.category.as_str(),
            toast, desktop, focused, "dispatching notification"
        );

        if toast {
            let _ = self.toast_tx.send(ToastRequest {
                id: format!("rn_{}", Uuid::new_v4().simple()),
                header: notification.title.clone(),
                content: notification.body.clone(),
                severity: ToastSeverity::Danger,
                buttons: vec![ToastButton::dismiss(notification.button_text.clone())],
                created_at: Utc::now(),
            });
        }
        if desktop {
            let _ = self.desktop_tx.send(DesktopNotification {
                title: notification.title,
                body: notification.body,
                icon_url: notification.icon_url,
                created_at: Utc::now(),
            });
        }
    }
}

/// Toast gate: globally enabled, and when `app_toasts_focus` is set the
/// app must currently be focused.
fn toast_allowed(delivery: &DeliverySection, focused: bool) -> bool {
    delivery.app_toasts && (!delivery.app_toasts_focus || focused)
}

/// Desktop gate: globally enabled, and focus-gated independently of the
/// toast. By default (`desktop_notif_focus = false`) desktop notifications
/// fire only while the app is unfocused; setting the flag inverts that.
fn desktop_allowed(delivery: &DeliverySection, focused: bool) -> bool {
    delivery.desktop_notif && (delivery.desktop_notif_focus ^ !focused)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delivery(
        app_toasts: bool,
        app_toasts_focus: bool,
        desktop_notif: bool,
        desktop_notif_focus: bool,
    ) -> DeliverySection {
        DeliverySection {
            app_toasts,
            app_toasts_focus,
            desktop_notif,
            desktop_notif_focus,
        }
    }

    #[test]
    fn test_toast_gate() {
        // Enabled, no focus gating: fires regardless of focus.
        assert!(toast_allowed(&delivery(true, false, false, false), true));
        assert!(toast_allowed(&delivery(true, false, false, false), false));
        // Focus-gated: only while focused.
        assert!(toast_allowed(&delivery(true, true, false, false), true));
        assert!(!toast_allowed(&delivery(true, true, false, false), false));
        // Disabled: never.
        assert!(!toast_allowed(&delivery(false, false, false, false), true));
    }

    #[test]
    fn test_desktop_gate_defaults_to_only_when_unfocused() {
        assert!(desktop_allowed(&delivery(false, false, true, false), false));
        assert!(!desktop_allowed(&delivery(false, false, true, false), true));
    }

    #[test]
    fn test_desktop_gate_inverted_fires_only_when_focused() {
        assert!(desktop_allowed(&delivery(false, false, true, true), true));
        assert!(!desktop_allowed(&delivery(false, false, true, true), false));
    }

    #[test]
    fn test_desktop_gate_disabled() {
        assert!(!desktop_allowed(&delivery(false, false, false, false), true));
        assert!(!desktop_allowed(&delivery(false, false, false, false), false));
    }

    #[test]
    fn test_dispatch_to_both_sinks() {
        let (toast_tx, mut toast_rx) = mpsc::unbounded_channel();
        let (desktop_tx, mut desktop_rx) = mpsc::unbounded_channel();
        let policy = DeliveryPolicy::new(toast_tx, desktop_tx);

        // Toast fires while focused; desktop inverted to fire while focused too.
        policy.dispatch(
            &delivery(true, true, true, true),
            true,
            RenderedNotification {
                category: Category::Kick,
                title: "You've been kicked".to_string(),
                body: "Server Name: Harbor".to_string(),
                button_text: "Dismiss".to_string(),
                icon_url: Some("icon-hash".to_string()),
            },
        );

        let toast = toast_rx.try_recv().unwrap();
        assert!(toast.id.starts_with("rn_"));
        assert_eq!(toast.header, "You've been kicked");
        assert_eq!(toast.content, "Server Name: Harbor");
        assert_eq!(toast.severity, ToastSeverity::Danger);
        assert_eq!(toast.buttons.len(), 1);
        assert_eq!(toast.buttons[0].text, "Dismiss");

        let desktop = desktop_rx.try_recv().unwrap();
        assert_eq!(desktop.title, "You've been kicked");
        assert_eq!(desktop.icon_url.as_deref(), Some("icon-hash"));
    }

    #[test]
    fn test_dispatch_with_dropped_receiver_is_silent() {
        let (toast_tx, toast_rx) = mpsc::unbounded_channel();
        let (desktop_tx, desktop_rx) = mpsc::unbounded_channel();
        drop(toast_rx);
        drop(desktop_rx);
        let policy = DeliveryPolicy::new(toast_tx, desktop_tx);

        // Must not panic even with both receivers gone.
        policy.dispatch(
            &delivery(true, false, true, false),
            false,
            RenderedNotification {
                category: Category::Group,
                title: "t".to_string(),
                body: "b".to_string(),
                button_text: "x".to_string(),
                icon_url: None,
            },
        );
    }
}
