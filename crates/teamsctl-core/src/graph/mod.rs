//! Microsoft Graph client for Teams management.
//!
//! This module provides:
//! - Typed Graph resources (channels, teams, groups, members, messages)
//! - The request transport and its `reqwest` implementation
//! - `GraphService`, one method per supported Teams operation

pub mod models;
pub mod sender;
pub mod service;

pub use models::{
    Channel, DirectoryObject, Group, Member, Message, ODataReference, PostMessage, ResultList,
    RootMessage, Team, TeamGuestSettings, TeamsApp,
};
pub use sender::{GraphResponse, HttpSender, RequestSender};
pub use service::GraphService;
