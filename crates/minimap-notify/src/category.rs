use serde::Serialize;

/// Notification categories the app sends. Each maps to a fixed
/// title/body/target-URL triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyCategory {
    Welcome,
    NearbyUsers,
    Events,
}

impl NotifyCategory {
    /// Parse the wire value (`welcome`, `nearby_users`, `events`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "welcome" => Some(Self::Welcome),
            "nearby_users" => Some(Self::NearbyUsers),
            "events" => Some(Self::Events),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::NearbyUsers => "nearby_users",
            Self::Events => "events",
        }
    }

    /// Resolve the notification content, with target links built off the
    /// configured base app URL.
    pub fn content(self, app_url: &str) -> NotificationContent {
        let app_url = app_url.trim_end_matches('/');
        match self {
            Self::Welcome => NotificationContent {
                title: "Congrats! 🎉".to_string(),
                body: "Welcome notifications are working!".to_string(),
                target_url: format!("{}/", app_url),
            },
            Self::NearbyUsers => NotificationContent {
                title: "👥 Community Update!".to_string(),
                body: "Connect with the Farcaster community on Minimap!".to_string(),
                target_url: format!("{}/", app_url),
            },
            Self::Events => NotificationContent {
                title: "🗓️ Local Events!".to_string(),
                body: "Discover events on Minimap!".to_string(),
                target_url: format!("{}/events", app_url),
            },
        }
    }
}

/// Payload sent to the provider for one notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub target_url: String,
}

impl NotificationContent {
    /// Fixed content for the manual test endpoint.
    pub fn test_message(app_url: &str) -> Self {
        Self {
            title: "Test Notification 🧪".to_string(),
            body: "This is a test notification from the test endpoint".to_string(),
            target_url: format!("{}/", app_url.trim_end_matches('/')),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_categories_only() {
        assert_eq!(NotifyCategory::parse("welcome"), Some(NotifyCategory::Welcome));
        assert_eq!(
            NotifyCategory::parse("nearby_users"),
            Some(NotifyCategory::NearbyUsers)
        );
        assert_eq!(NotifyCategory::parse("events"), Some(NotifyCategory::Events));
        assert_eq!(NotifyCategory::parse("Welcome"), None);
        assert_eq!(NotifyCategory::parse(""), None);
    }

    #[test]
    fn welcome_content_is_fixed() {
        let content = NotifyCategory::Welcome.content("https://minimap.xyz");
        assert_eq!(content.title, "Congrats! 🎉");
        assert_eq!(content.target_url, "https://minimap.xyz/");
    }

    #[test]
    fn events_targets_the_events_path() {
        let content = NotifyCategory::Events.content("https://minimap.xyz/");
        assert_eq!(content.target_url, "https://minimap.xyz/events");
    }
}
