//! Data models for Microsoft Graph Teams resources.
//!
//! Field names follow Graph's camelCase wire names.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A channel within a team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    /// Channel ID, assigned by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Channel name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Channel description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A team, either as listed by `/me/joinedTeams` or as a settings payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Team ID (same as the backing group ID).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Team name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Team description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// What guests may do with channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_settings: Option<TeamGuestSettings>,
}

impl Team {
    /// A settings-only payload carrying just `guestSettings`.
    #[must_use]
    pub fn with_guest_settings(settings: TeamGuestSettings) -> Self {
        Self {
            guest_settings: Some(settings),
            ..Self::default()
        }
    }
}

/// Guest permissions on a team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamGuestSettings {
    /// Guests may create and update channels.
    pub allow_create_update_channels: bool,
    /// Guests may delete channels.
    pub allow_delete_channels: bool,
}

/// An Office 365 group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    /// Group ID, assigned by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Group name.
    pub display_name: String,
    /// Mail alias, unique in the tenant.
    pub mail_nickname: String,
    /// Group description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Group types, e.g. `Unified` for Office 365 groups.
    pub group_types: Vec<String>,
    /// Whether the group is mail-enabled.
    pub mail_enabled: bool,
    /// Whether the group is a security group.
    pub security_enabled: bool,
    /// `Private` or `Public`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
}

impl Group {
    /// A private, mail-enabled Office 365 group that can be promoted to a team.
    #[must_use]
    pub fn unified(display_name: &str, mail_nickname: &str, description: &str) -> Self {
        Self {
            id: None,
            display_name: display_name.to_string(),
            mail_nickname: mail_nickname.to_string(),
            description: Some(description.to_string()),
            group_types: vec!["Unified".to_string()],
            mail_enabled: true,
            security_enabled: false,
            visibility: Some("Private".to_string()),
        }
    }
}

/// A user to add to a team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// User principal name.
    pub upn: String,
    /// User object ID, once resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Also add the user to the team's owners.
    #[serde(default)]
    pub owner: bool,
}

impl Member {
    /// A member identified by UPN.
    #[must_use]
    pub fn new(upn: impl Into<String>, owner: bool) -> Self {
        Self {
            upn: upn.into(),
            id: None,
            owner,
        }
    }
}

/// Message body content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Body text.
    pub content: String,
}

/// The first message of a chat thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootMessage {
    /// Message body.
    pub body: Message,
}

/// Payload for starting a chat thread in a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessage {
    /// Thread root.
    pub root_message: RootMessage,
}

impl PostMessage {
    /// Wrap plain content as a thread root.
    #[must_use]
    pub fn new(content: &str) -> Self {
        Self {
            root_message: RootMessage {
                body: Message {
                    content: content.to_string(),
                },
            },
        }
    }
}

/// An app installed in a team.
///
/// Only `id` and `displayName` are typed; everything else is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamsApp {
    /// App ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// App name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Remaining properties.
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

/// Envelope of a Graph collection response. Paging links are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultList<T> {
    /// Items on this page, in server order.
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// Any directory object, projected down to its ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryObject {
    /// Object ID.
    pub id: String,
}

/// OData reference used to add an existing object to a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ODataReference {
    /// Absolute URI of the referenced object.
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

impl ODataReference {
    /// Reference to the user `user_id` under `root`.
    #[must_use]
    pub fn user(root: &str, user_id: &str) -> Self {
        Self {
            odata_id: format!("{root}/users/{user_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn channel_round_trips_name_and_description() {
        let channel = Channel {
            id: None,
            display_name: Some("X".to_string()),
            description: Some("Y".to_string()),
        };
        let json = serde_json::to_string(&channel).unwrap();
        assert_eq!(json, r#"{"displayName":"X","description":"Y"}"#);

        let parsed: Channel = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.display_name.as_deref(), Some("X"));
        assert_eq!(parsed.description.as_deref(), Some("Y"));
    }

    #[test]
    fn guest_settings_payload_uses_graph_names() {
        let team = Team::with_guest_settings(TeamGuestSettings {
            allow_create_update_channels: true,
            allow_delete_channels: false,
        });
        assert_eq!(
            serde_json::to_value(&team).unwrap(),
            json!({
                "guestSettings": {
                    "allowCreateUpdateChannels": true,
                    "allowDeleteChannels": false
                }
            })
        );
    }

    #[test]
    fn unified_group_has_teams_attributes() {
        let group = Group::unified("Ops", "ops", "Operations");
        let value = serde_json::to_value(&group).unwrap();
        assert_eq!(
            value,
            json!({
                "displayName": "Ops",
                "mailNickname": "ops",
                "description": "Operations",
                "groupTypes": ["Unified"],
                "mailEnabled": true,
                "securityEnabled": false,
                "visibility": "Private"
            })
        );
    }

    #[test]
    fn group_tolerates_null_fields_from_server() {
        let group: Group = serde_json::from_value(json!({
            "id": "g-1",
            "displayName": "Ops",
            "mailNickname": "ops",
            "description": null,
            "groupTypes": ["Unified"],
            "mailEnabled": true,
            "securityEnabled": false,
            "visibility": null,
            "createdDateTime": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(group.id.as_deref(), Some("g-1"));
        assert!(group.description.is_none());
        assert!(group.visibility.is_none());
    }

    #[test]
    fn post_message_nests_content() {
        let value = serde_json::to_value(PostMessage::new("hi")).unwrap();
        assert_eq!(value, json!({"rootMessage": {"body": {"content": "hi"}}}));
    }

    #[test]
    fn odata_reference_is_valid_json() {
        let reference = ODataReference::user("https://graph.microsoft.com/v1.0", "u-1");
        assert_eq!(
            serde_json::to_string(&reference).unwrap(),
            r#"{"@odata.id":"https://graph.microsoft.com/v1.0/users/u-1"}"#
        );
    }

    #[test]
    fn result_list_without_value_is_empty() {
        let list: ResultList<Channel> = serde_json::from_str("{}").unwrap();
        assert!(list.value.is_empty());
    }

    #[test]
    fn teams_app_keeps_unknown_properties() {
        let app: TeamsApp = serde_json::from_value(json!({
            "id": "app-1",
            "displayName": "Planner",
            "version": "1.2"
        }))
        .unwrap();
        assert_eq!(app.id.as_deref(), Some("app-1"));
        assert_eq!(app.properties.get("version"), Some(&json!("1.2")));
    }
}
