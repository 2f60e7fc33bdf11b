use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::authorizer::{dashboard_for, Screen};
use super::claims::TokenClaims;
use super::session::Session;

/// Who is signed in, as shown to the user: cached profile fields plus what the
/// token's claims say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub dashboard: Screen,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Principal {
    pub fn from_session(session: &Session) -> Self {
        let roles = session.role_set();
        let claims = TokenClaims::parse(&session.token).ok();
        Principal {
            user_id: session.user_id.clone(),
            email: session.email.clone(),
            display_name: session.display_name().to_string(),
            gender: session.gender.clone(),
            dashboard: dashboard_for(&roles),
            roles: roles.to_vec(),
            subject: claims.as_ref().and_then(|c| c.subject().map(str::to_string)),
            expires_at: claims.as_ref().and_then(|c| c.expires_at()),
        }
    }
}
