//! Account settings update form: one key/value pair per update.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Schema, wire_enum};
use crate::domain::validation::{Issues, Validator};

wire_enum! {
    /// Setting being changed.
    pub enum SettingKey {
        Theme => "theme",
        Language => "language",
        Notifications => "notifications",
    }
}

/// Delivery channels for notifications. Absent channels are off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct NotificationPreferences {
    /// Email notifications.
    pub email: bool,
    /// SMS notifications.
    pub sms: bool,
    /// Push notifications.
    pub push: bool,
}

/// Raw settings update.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SettingsUpdateInput {
    /// Member whose setting changes.
    pub user_id: Option<String>,
    /// Setting name.
    pub setting_key: Option<String>,
    /// New value.
    pub setting_value: Option<String>,
    /// Notification channels; all off when absent.
    pub notification_preferences: Option<NotificationPreferences>,
}

/// Validated settings update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsUpdate {
    user_id: String,
    setting_key: SettingKey,
    setting_value: String,
    notification_preferences: NotificationPreferences,
}

impl SettingsUpdate {
    /// Member whose setting changes.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Setting name.
    pub fn setting_key(&self) -> SettingKey {
        self.setting_key
    }

    /// New value.
    pub fn setting_value(&self) -> &str {
        &self.setting_value
    }
}

impl Schema for SettingsUpdate {
    type Input = SettingsUpdateInput;

    fn validate(input: SettingsUpdateInput) -> Result<Self, Issues> {
        let mut v = Validator::new();
        let user_id = v.required("user_id", input.user_id);
        let setting_key = v
            .required("setting_key", input.setting_key)
            .and_then(|k| v.one_of::<SettingKey>("setting_key", k, SettingKey::VALUES));
        let setting_value = v
            .required("setting_value", input.setting_value)
            .and_then(|s| v.length("setting_value", s, 1, 100));
        v.finish(|| {
            Some(Self {
                user_id: user_id?,
                setting_key: setting_key?,
                setting_value: setting_value?,
                notification_preferences: input.notification_preferences.unwrap_or_default(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_notification_preferences_to_off() {
        let update = SettingsUpdate::parse_json(json!({
            "user_id": "member-1",
            "setting_key": "theme",
            "setting_value": "dark"
        }))
        .expect("valid update");
        assert_eq!(update.setting_key(), SettingKey::Theme);
        assert_eq!(
            serde_json::to_value(&update).expect("serialise")["notification_preferences"],
            json!({ "email": false, "sms": false, "push": false })
        );
    }

    #[test]
    fn partial_notification_preferences_fill_missing_channels() {
        let update = SettingsUpdate::parse_json(json!({
            "user_id": "member-1",
            "setting_key": "notifications",
            "setting_value": "custom",
            "notification_preferences": { "email": true }
        }))
        .expect("valid update");
        assert_eq!(
            update.notification_preferences,
            NotificationPreferences {
                email: true,
                sms: false,
                push: false
            }
        );
    }

    #[test]
    fn unknown_setting_key_is_rejected() {
        let issues = SettingsUpdate::parse_json(json!({
            "user_id": "member-1",
            "setting_key": "font",
            "setting_value": "serif"
        }))
        .expect_err("unknown key");
        assert!(issues.has_field("setting_key"));
    }

    #[test]
    fn wrong_json_types_become_a_root_issue() {
        let issues = SettingsUpdate::parse_json(json!({ "setting_key": 7 }))
            .expect_err("type mismatch");
        assert_eq!(issues.roots().count(), 1);
    }
}
