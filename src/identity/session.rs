//! The signed-in session as the backend returns it and as it is persisted.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::claims::{resolve_roles, RoleSet};

pub type SessionToken = String;

/// Authenticated user: the backend-issued token plus the profile fields
/// returned alongside it at login/register time.
///
/// The serialized form is what the backend sends (`userID`, `personName`, ...)
/// and what is persisted under `auth_user`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    #[serde(rename = "userID", alias = "userId", alias = "UserID", alias = "UserId", default, deserialize_with = "lenient_string")]
    pub user_id: String,
    #[serde(rename = "email", alias = "Email", default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(rename = "personName", alias = "PersonName", default, deserialize_with = "lenient_opt_string")]
    pub person_name: Option<String>,
    #[serde(rename = "gender", alias = "Gender", default, deserialize_with = "lenient_opt_string")]
    pub gender: Option<String>,
    #[serde(rename = "token", alias = "Token", default, deserialize_with = "lenient_string")]
    pub token: SessionToken,
    #[serde(rename = "success", alias = "Success", default)]
    pub success: bool,
    #[serde(rename = "roles", alias = "Roles", default, deserialize_with = "lenient_string_list", skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl Session {
    /// Only sessions reported successful and carrying a token count as signed in.
    pub fn is_valid(&self) -> bool {
        self.success && !self.token.trim().is_empty()
    }

    /// Roles granted by the token's claims. The `roles` echo from the response
    /// body is display-only and not consulted.
    pub fn role_set(&self) -> RoleSet {
        resolve_roles(Some(&self.token))
    }

    pub fn display_name(&self) -> &str {
        match self.person_name.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => self.email.as_str(),
        }
    }
}

// Short, non-reversible token description for logs.
pub(crate) fn token_fingerprint(token: &str) -> String {
    let head: String = token.chars().take(6).collect();
    format!("{}..(len={})", head, token.len())
}

fn value_to_string(v: Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(value_to_string(Value::deserialize(d)?).unwrap_or_default())
}

// Gender arrives as a string from login but as the enum integer from some register paths.
pub(crate) fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(value_to_string(Value::deserialize(d)?))
}

// Keeps the string entries of a list; anything else reads as absent.
fn lenient_string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => Some(items.into_iter().filter_map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        }).collect()),
        _ => None,
    })
}
