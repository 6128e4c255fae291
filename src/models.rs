use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    catalog::{RequirementView, RouteId},
    permissions::Permission,
};

// --- Identity Schemas (shape owned by the marketplace API) ---

/// Actor
///
/// The authenticated staff user, exactly as the login endpoint returns it (minus the token).
/// Every field is optional because the API controls the shape; a missing `roles` list simply
/// yields no permissions.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Actor {
    // The API has returned both numeric and string identifiers.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_details: Option<UserDetails>,
    /// Ordered role list. Only the first entry is consulted for permissions.
    #[serde(default)]
    pub roles: Option<Vec<Role>>,
}

/// UserDetails
///
/// Profile block nested in the actor record, used for the dashboard header.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserDetails {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Role
///
/// A role entry on the actor. `permissions` may be absent or `null`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct Role {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<String>>)]
    #[ts(type = "Array<string> | null")]
    pub permissions: Option<Vec<Permission>>,
}

const UNKNOWN_USER: &str = "Unknown User";

impl Actor {
    /// display_name
    ///
    /// Full name, then username, then email. Blank values count as missing.
    pub fn display_name(&self) -> &str {
        let details = self.user_details.as_ref();
        [
            details.and_then(|d| d.full_name.as_deref()),
            details.and_then(|d| d.username.as_deref()),
            self.email.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or(UNKNOWN_USER)
    }

    /// initials
    ///
    /// First letters of the first two words of the display name, or its first two
    /// characters when it is a single word.
    pub fn initials(&self) -> String {
        let name = self.display_name();
        let words: Vec<&str> = name.split_whitespace().collect();
        let initials: String = if words.len() >= 2 {
            words[..2].iter().filter_map(|w| w.chars().next()).collect()
        } else {
            name.chars().take(2).collect()
        };
        initials.to_uppercase()
    }

    pub fn avatar(&self) -> Option<&str> {
        self.user_details.as_ref().and_then(|d| d.avatar.as_deref())
    }
}

/// string_or_number
///
/// Accepts `"42"`, `42` or `null` for identifier fields and normalizes them to a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    }))
}

// --- Request Payloads (Input Schemas) ---

/// EstablishSessionRequest
///
/// The login result as the API returns it: the access token sits next to the actor's own
/// fields (`{ token, ...user }`). The refresh token is optional.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EstablishSessionRequest {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub user: Actor,
}

/// UpdateTokensRequest
///
/// Result of a token refresh. When `refresh_token` is omitted only the access token changes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateTokensRequest {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SetupStepRequest {
    pub step: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct VerifyEmailRequest {
    pub email: String,
}

/// AccessCheckRequest
///
/// Input for `POST /access/check`: the path the dashboard is about to show.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AccessCheckRequest {
    #[schema(example = "/dashboard/orders/42")]
    pub path: String,
}

/// NavigateQuery
///
/// Query parameters for `GET /navigate`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NavigateQuery {
    /// The browser path being navigated to.
    pub path: String,
}

// --- Response Schemas (Output) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

/// SessionSnapshot
///
/// What the dashboard header needs about the current session. Tokens are never echoed back.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub display_name: String,
    pub initials: String,
    pub avatar: Option<String>,
    pub email: Option<String>,
    pub permissions: Vec<String>,
    pub has_refresh_token: bool,
    pub account_setup_complete: bool,
    pub current_setup_step: u8,
    pub verify_email: String,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// CatalogEntry
///
/// One row of the permission catalog, as served by `GET /catalog`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct CatalogEntry {
    pub route: RouteId,
    pub prefix: String,
    pub requirement: RequirementView,
}

/// ViewGrant
///
/// Body of a dashboard navigation that passed the Route Guard.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct ViewGrant {
    pub path: String,
    pub route: Option<RouteId>,
}
