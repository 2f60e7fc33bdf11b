// Request bodies for the backend's auth endpoints and the rule for accepting
// its answer as a sign-in.
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::session::Session;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Sent on the wire as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Gender {
    Male = 0,
    Female = 1,
    Other = 2,
}

impl Serialize for Gender {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(*self as u8)
    }
}

impl std::str::FromStr for Gender {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" | "0" => Ok(Gender::Male),
            "female" | "f" | "1" => Ok(Gender::Female),
            "other" | "o" | "2" => Ok(Gender::Other),
            other => Err(AppError::user("invalid_gender", format!("unknown gender '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub person_name: String,
    pub gender: Gender,
    pub role_name: String,
}

// Human-readable reason from an error body: `message`, `error`, `title`, or the
// first entry of an `errors` list.
pub(crate) fn failure_message(body: &Value) -> Option<String> {
    for key in ["message", "Message", "error", "Error", "title", "Title"] {
        if let Some(s) = body.get(key).and_then(|v| v.as_str()) {
            if !s.trim().is_empty() { return Some(s.to_string()); }
        }
    }
    match body.get("errors").or_else(|| body.get("Errors")) {
        Some(Value::Array(items)) => items.iter().find_map(|v| v.as_str().map(str::to_string)),
        Some(Value::Object(map)) => map.values().find_map(|v| match v {
            Value::Array(a) => a.first().and_then(|x| x.as_str()).map(str::to_string),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }),
        _ => None,
    }
}

/// Turn an auth endpoint response into a session, or a distinguishable failure.
/// Only a 2xx answer with `success == true` and a non-blank token signs in.
pub fn accept_authentication(action: &str, status: u16, body: &Value) -> AppResult<Session> {
    let reason = failure_message(body);
    if status >= 500 {
        return Err(AppError::from_status(status, reason.unwrap_or_else(|| format!("{} failed: server error", action))));
    }
    if !(200..300).contains(&status) {
        let msg = reason.unwrap_or_else(|| format!("{} failed", action));
        return Err(AppError::Auth { code: format!("{}_failed", action), message: msg });
    }
    let session: Session = serde_json::from_value(body.clone())
        .map_err(|e| AppError::decode("invalid_auth_response", e.to_string()))?;
    if !session.success {
        let msg = reason.unwrap_or_else(|| format!("{} failed", action));
        return Err(AppError::Auth { code: format!("{}_failed", action), message: msg });
    }
    if session.token.trim().is_empty() {
        return Err(AppError::Auth { code: format!("{}_failed", action), message: "response carried no token".into() });
    }
    Ok(session)
}
