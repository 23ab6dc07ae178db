//! Teams management operations over Microsoft Graph.
//!
//! Every method maps onto one Graph endpoint, or a short fixed sequence of
//! them. Two failure policies apply:
//!
//! - reads (`get_*`) fold every failure (transport error, non-success status,
//!   unexpected body) into an empty result and log a warning;
//! - writes that return a reason phrase fail with [`CoreError::Status`], whose
//!   message is that reason phrase.
//!
//! `create_channel` and `post_message` hand the raw response back instead, so
//! the caller decides what a status means. Nothing is retried and multi-step
//! operations are not rolled back when a later step fails.

use log::{info, warn};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use urlencoding::encode;

use crate::config::AppConfig;
use crate::graph::models::{
    Channel, DirectoryObject, Group, Member, ODataReference, PostMessage, ResultList, Team,
    TeamGuestSettings, TeamsApp,
};
use crate::graph::sender::{GraphResponse, HttpSender, RequestSender};
use crate::{CoreError, Result};

/// Guest settings applied when a group is promoted to a team.
const NEW_TEAM_GUEST_SETTINGS: TeamGuestSettings = TeamGuestSettings {
    allow_create_update_channels: false,
    allow_delete_channels: false,
};

/// Guest settings applied by [`GraphService::update_team`].
const UPDATED_TEAM_GUEST_SETTINGS: TeamGuestSettings = TeamGuestSettings {
    allow_create_update_channels: true,
    allow_delete_channels: false,
};

/// Graph client for Teams management.
#[derive(Debug, Clone)]
pub struct GraphService<S = HttpSender> {
    sender: S,
    root: String,
}

impl GraphService<HttpSender> {
    /// Create a service from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let sender = HttpSender::from_runtime(&config.runtime)?;
        Ok(Self::new(sender, &config.graph.root_uri))
    }
}

impl<S: RequestSender> GraphService<S> {
    /// Create a service sending through `sender`, rooted at `root_uri`
    /// (e.g. `https://graph.microsoft.com/v1.0`).
    #[must_use]
    pub fn new(sender: S, root_uri: &str) -> Self {
        Self {
            sender,
            root: root_uri.trim().trim_end_matches('/').to_string(),
        }
    }

    /// The configured Graph root, without a trailing slash.
    #[must_use]
    pub fn root_uri(&self) -> &str {
        &self.root
    }

    /// Create a channel in a team.
    ///
    /// # Errors
    ///
    /// Returns an error only if the request could not be sent. The status is
    /// left for the caller to inspect.
    pub async fn create_channel(
        &self,
        access_token: &str,
        team_id: &str,
        name: &str,
        description: &str,
    ) -> Result<GraphResponse> {
        let channel = Channel {
            id: None,
            display_name: Some(name.to_string()),
            description: Some(description.to_string()),
        };
        let uri = format!("{}/teams/{}/channels", self.root, encode(team_id));
        self.send_json(Method::POST, &uri, access_token, &channel)
            .await
    }

    /// List the channels of a team. Empty on any failure.
    pub async fn get_channels(&self, access_token: &str, team_id: &str) -> Vec<Channel> {
        let uri = format!("{}/teams/{}/channels", self.root, encode(team_id));
        self.get_list(access_token, &uri).await
    }

    /// List the apps of a team. Empty on any failure.
    pub async fn get_apps(&self, access_token: &str, team_id: &str) -> Vec<TeamsApp> {
        let uri = format!("{}/teams/{}/apps", self.root, encode(team_id));
        self.get_list(access_token, &uri).await
    }

    /// The signed-in user's object ID. Empty on any failure.
    pub async fn get_my_id(&self, access_token: &str) -> String {
        let uri = format!("{}/me?$select=id", self.root);
        match self.sender.send(Method::GET, &uri, access_token, None).await {
            Ok(response) if response.is_success() => match response.json::<DirectoryObject>() {
                Ok(me) => me.id.trim().to_string(),
                Err(e) => {
                    warn!("GET {uri}: unexpected body: {e}");
                    String::new()
                }
            },
            Ok(response) => {
                warn!("GET {uri}: {} {}", response.status, response.reason);
                String::new()
            }
            Err(e) => {
                warn!("GET {uri}: {e}");
                String::new()
            }
        }
    }

    /// The teams the signed-in user has joined. Empty on any failure.
    pub async fn get_my_teams(&self, access_token: &str) -> Vec<Team> {
        let uri = format!("{}/me/joinedTeams", self.root);
        self.get_list(access_token, &uri).await
    }

    /// Start a chat thread in a channel.
    ///
    /// # Errors
    ///
    /// Returns an error only if the request could not be sent.
    pub async fn post_message(
        &self,
        access_token: &str,
        team_id: &str,
        channel_id: &str,
        message: &str,
    ) -> Result<GraphResponse> {
        let uri = format!(
            "{}/teams/{}/channels/{}/chatThreads",
            self.root,
            encode(team_id),
            encode(channel_id)
        );
        self.send_json(Method::POST, &uri, access_token, &PostMessage::new(message))
            .await
    }

    /// Create an Office 365 group, add the signed-in user to it, and promote
    /// it to a team.
    ///
    /// Returns `Ok(None)` when Graph refuses to create the group; nothing else
    /// is attempted then. A failed member add is logged and skipped. Earlier
    /// steps are not undone when a later one fails.
    ///
    /// # Errors
    ///
    /// Returns an error if a request cannot be sent, the created group cannot
    /// be read, or the team cannot be created.
    pub async fn create_team_and_group(
        &self,
        access_token: &str,
        display_name: &str,
        mail_nickname: &str,
        description: &str,
    ) -> Result<Option<Group>> {
        let params = Group::unified(display_name, mail_nickname, description);
        let uri = format!("{}/groups", self.root);
        let response = self
            .send_json(Method::POST, &uri, access_token, &params)
            .await?;
        if !response.is_success() {
            warn!(
                "creating group {mail_nickname}: {} {}",
                response.status, response.reason
            );
            return Ok(None);
        }

        let created: Group = response.json()?;
        // The team shares its ID with the group.
        let group_id = created
            .id
            .clone()
            .ok_or_else(|| CoreError::Api("created group has no id".to_string()))?;
        info!("created group {group_id}");

        let me = self.get_my_id(access_token).await;
        let reference = ODataReference::user(&self.root, &me);
        let uri = format!("{}/groups/{}/members/$ref", self.root, encode(&group_id));
        let added = self
            .send_json(Method::POST, &uri, access_token, &reference)
            .await?;
        if added.is_success() {
            info!("added {me} to group {group_id}");
        } else {
            warn!(
                "adding {me} to group {group_id}: {} {}",
                added.status, added.reason
            );
        }

        self.add_team_to_group(access_token, &group_id).await?;
        Ok(Some(created))
    }

    /// Enable Teams on an existing group. Guests may neither create, update
    /// nor delete channels.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Status`] carrying the reason phrase on a
    /// non-success status, or a transport error.
    pub async fn add_team_to_group(&self, access_token: &str, group_id: &str) -> Result<String> {
        let uri = format!("{}/groups/{}/team", self.root, encode(group_id));
        let team = Team::with_guest_settings(NEW_TEAM_GUEST_SETTINGS);
        let response = self
            .send_json(Method::PUT, &uri, access_token, &team)
            .await?
            .error_for_status()?;
        info!("enabled team on group {group_id}");
        Ok(response.reason)
    }

    /// Let guests create and update (but not delete) channels.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Status`] carrying the reason phrase on a
    /// non-success status, or a transport error.
    pub async fn update_team(&self, access_token: &str, team_id: &str) -> Result<String> {
        let uri = format!("{}/teams/{}", self.root, encode(team_id));
        let team = Team::with_guest_settings(UPDATED_TEAM_GUEST_SETTINGS);
        let response = self
            .send_json(Method::PATCH, &uri, access_token, &team)
            .await?
            .error_for_status()?;
        Ok(response.reason)
    }

    /// Add a user to a team by UPN, and to its owners when `member.owner`.
    ///
    /// The UPN is resolved to an object ID first; Teams picks up membership
    /// by ID much faster than by UPN.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Status`] with the reason phrase of whichever step
    /// failed. Steps already done are not undone.
    pub async fn add_member(
        &self,
        access_token: &str,
        team_id: &str,
        member: &Member,
    ) -> Result<()> {
        let uri = format!("{}/users/{}", self.root, encode(&member.upn));
        let user: DirectoryObject = self
            .sender
            .send(Method::GET, &uri, access_token, None)
            .await?
            .error_for_status()?
            .json()?;

        let reference = ODataReference::user(&self.root, &user.id);

        let uri = format!("{}/groups/{}/members/$ref", self.root, encode(team_id));
        self.send_json(Method::POST, &uri, access_token, &reference)
            .await?
            .error_for_status()?;
        info!("added {} to team {team_id}", member.upn);

        if member.owner {
            let uri = format!("{}/groups/{}/owners/$ref", self.root, encode(team_id));
            self.send_json(Method::POST, &uri, access_token, &reference)
                .await?
                .error_for_status()?;
            info!("made {} an owner of team {team_id}", member.upn);
        }

        Ok(())
    }

    async fn send_json<P: Serialize>(
        &self,
        method: Method,
        uri: &str,
        access_token: &str,
        payload: &P,
    ) -> Result<GraphResponse> {
        let body = serde_json::to_value(payload)?;
        self.sender
            .send(method, uri, access_token, Some(&body))
            .await
    }

    async fn get_list<T: DeserializeOwned>(&self, access_token: &str, uri: &str) -> Vec<T> {
        match self.sender.send(Method::GET, uri, access_token, None).await {
            Ok(response) if response.is_success() => match response.json::<ResultList<T>>() {
                Ok(list) => list.value,
                Err(e) => {
                    warn!("GET {uri}: unexpected body: {e}");
                    Vec::new()
                }
            },
            Ok(response) => {
                warn!("GET {uri}: {} {}", response.status, response.reason);
                Vec::new()
            }
            Err(e) => {
                warn!("GET {uri}: {e}");
                Vec::new()
            }
        }
    }
}
