use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display category of a notification. Ordering is informational only.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    #[default]
    Info,
    Warning,
    Alert,
    Emergency,
    #[serde(other)]
    Unknown,
}

impl NotificationType {
    pub fn color(self) -> &'static str {
        match self {
            NotificationType::Info => "#2196F3",
            NotificationType::Warning => "#FFC107",
            NotificationType::Alert => "#FF9800",
            NotificationType::Emergency => "#F44336",
            NotificationType::Unknown => "#9E9E9E",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            NotificationType::Info => "ℹ️",
            NotificationType::Warning => "⚠️",
            NotificationType::Alert => "🔔",
            NotificationType::Emergency => "🚨",
            NotificationType::Unknown => "📌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
}

/// Caller-supplied content for a new notification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotificationDraft {
    pub title: String,
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: NotificationType,
    #[serde(default)]
    pub action_url: Option<String>,
    #[serde(default)]
    pub action_label: Option<String>,
}

impl NotificationDraft {
    pub fn new(title: impl Into<String>, message: impl Into<String>, kind: NotificationType) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
            action_url: None,
            action_label: None,
        }
    }

    pub fn with_action(mut self, url: impl Into<String>, label: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self.action_label = Some(label.into());
        self
    }
}
