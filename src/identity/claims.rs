//! Role resolution from the session token's claims.
//!
//! The token is a three-part `header.payload.signature` string. Only the payload
//! is decoded and the signature is never checked: roles read here drive screen
//! routing, never authorization. The backend remains the trust boundary.

use std::collections::BTreeSet;

use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

/// Claim keys consulted for role names, in lookup order.
pub const ROLE_CLAIM_KEYS: [&str; 4] = [
    "role",
    "roles",
    "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/role",
];

/// Deduplicated role names. Ordering is only for stable display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    pub fn new() -> Self { Self::default() }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, name: &str) -> bool { self.0.contains(name) }

    pub fn insert(&mut self, name: impl Into<String>) -> bool { self.0.insert(name.into()) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &str> { self.0.iter().map(|s| s.as_str()) }

    pub fn to_vec(&self) -> Vec<String> { self.0.iter().cloned().collect() }
}

impl<S: Into<String>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        RoleSet(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for RoleSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;
    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

/// Decode the payload segment of a compact token into JSON.
pub fn decode_payload(token: &str) -> AppResult<Value> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(AppError::decode("token_segments", format!("expected 3 segments, found {}", parts.len())));
    }
    // base64url -> base64, then pad to a multiple of 4
    let mut b64: String = parts[1]
        .chars()
        .map(|c| match c { '-' => '+', '_' => '/', other => other })
        .collect();
    while b64.len() % 4 != 0 { b64.push('='); }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.as_bytes())
        .map_err(|e| AppError::decode("token_base64", e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| AppError::decode("token_utf8", e.to_string()))?;
    let payload: Value = serde_json::from_str(&text)
        .map_err(|e| AppError::decode("token_json", e.to_string()))?;
    Ok(payload)
}

fn collect_claim(value: &Value, out: &mut RoleSet) {
    match value {
        Value::Array(items) => {
            for item in items {
                if let Value::String(s) = item {
                    if !s.trim().is_empty() { out.insert(s.clone()); }
                }
            }
        }
        Value::String(s) if !s.trim().is_empty() => { out.insert(s.clone()); }
        _ => {}
    }
}

fn roles_from_payload(payload: &Value) -> RoleSet {
    let mut roles = RoleSet::new();
    for key in ROLE_CLAIM_KEYS {
        if let Some(v) = payload.get(key) {
            collect_claim(v, &mut roles);
        }
    }
    roles
}

/// Roles granted by `token`. Missing or malformed tokens yield an empty set,
/// i.e. the lowest-privilege view; this never fails.
pub fn resolve_roles(token: Option<&str>) -> RoleSet {
    let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
        debug!(target: "rolegate::claims", "no token; empty role set");
        return RoleSet::new();
    };
    match decode_payload(token) {
        Ok(payload) => roles_from_payload(&payload),
        Err(e) => {
            warn!(target: "rolegate::claims", "could not decode token payload ({}); treating as no roles", e);
            RoleSet::new()
        }
    }
}

/// Decoded token payload with typed accessors for the claims the client reads.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    payload: Value,
}

impl TokenClaims {
    pub fn parse(token: &str) -> AppResult<Self> {
        let payload = decode_payload(token)?;
        if !payload.is_object() {
            return Err(AppError::decode("token_json", "payload is not a JSON object"));
        }
        Ok(Self { payload })
    }

    pub fn roles(&self) -> RoleSet { roles_from_payload(&self.payload) }

    pub fn subject(&self) -> Option<&str> {
        self.payload.get("sub").and_then(|v| v.as_str())
    }

    /// `exp` as a timestamp. Informational; the backend enforces expiry.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.payload.get("exp").and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))?;
        Utc.timestamp_opt(secs, 0).single()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at(), Some(exp) if exp <= now)
    }

    pub fn raw(&self) -> &Value { &self.payload }
}

#[cfg(test)]
#[path = "claims_tests.rs"]
mod claims_tests;
