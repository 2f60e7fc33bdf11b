//! Canonical shapes returned by the resource gateways.
//!
//! The backend is not consistent about casing or wrapping; `normalize` maps
//! whatever arrives onto these types so nothing else has to care.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::lenient_opt_string;
use crate::identity::lenient_string;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(alias = "CurrentPage", default)]
    pub current_page: u32,
    #[serde(alias = "PageSize", default)]
    pub page_size: u32,
    #[serde(alias = "TotalCount", default)]
    pub total_count: u64,
    #[serde(alias = "TotalPages", default)]
    pub total_pages: u32,
}

impl Pagination {
    pub fn empty(page: u32, page_size: u32) -> Self {
        Pagination { current_page: page, page_size, total_count: 0, total_pages: 0 }
    }

    pub fn has_next(&self) -> bool { self.current_page < self.total_pages }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(rename = "userID", alias = "userId", alias = "UserID", alias = "UserId", default, deserialize_with = "lenient_string")]
    pub user_id: String,
    #[serde(rename = "email", alias = "Email", default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(rename = "personName", alias = "PersonName", default, deserialize_with = "lenient_opt_string")]
    pub person_name: Option<String>,
    #[serde(rename = "gender", alias = "Gender", default, deserialize_with = "lenient_opt_string")]
    pub gender: Option<String>,
    #[serde(rename = "isActive", alias = "IsActive", default)]
    pub is_active: bool,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(rename = "createdDate", alias = "CreatedDate", alias = "createdAt", alias = "CreatedAt", default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemInfo {
    #[serde(rename = "serverTime", alias = "ServerTime", default, deserialize_with = "lenient_string")]
    pub server_time: String,
    #[serde(rename = "version", alias = "Version", default, deserialize_with = "lenient_string")]
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub users_by_role: BTreeMap<String, u64>,
    pub recent_users: Vec<User>,
    pub system_info: Option<SystemInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityLog {
    #[serde(rename = "id", alias = "Id", alias = "ID", default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "adminId", alias = "AdminId", alias = "adminID", alias = "AdminID", default, deserialize_with = "lenient_string")]
    pub admin_id: String,
    #[serde(rename = "adminName", alias = "AdminName", default, deserialize_with = "lenient_string")]
    pub admin_name: String,
    #[serde(rename = "action", alias = "Action", default, deserialize_with = "lenient_string")]
    pub action: String,
    #[serde(rename = "timestamp", alias = "Timestamp", default, deserialize_with = "lenient_string")]
    pub timestamp: String,
    #[serde(rename = "details", alias = "Details", default, deserialize_with = "lenient_string")]
    pub details: String,
}

impl ActivityLog {
    /// Timestamp as UTC. Offset-less values are taken to be UTC already.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        let ts = self.timestamp.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
            .map(|n| n.and_utc())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecuritySettings {
    #[serde(rename = "passwordMinLength", alias = "PasswordMinLength", default)]
    pub password_min_length: u32,
    #[serde(rename = "requireEmailConfirmation", alias = "RequireEmailConfirmation", default)]
    pub require_email_confirmation: bool,
    #[serde(rename = "sessionTimeoutMinutes", alias = "SessionTimeoutMinutes", default)]
    pub session_timeout_minutes: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemSettings {
    #[serde(rename = "applicationName", alias = "ApplicationName", default, deserialize_with = "lenient_string")]
    pub application_name: String,
    #[serde(rename = "version", alias = "Version", default, deserialize_with = "lenient_string")]
    pub version: String,
    #[serde(rename = "environment", alias = "Environment", default, deserialize_with = "lenient_string")]
    pub environment: String,
    #[serde(rename = "maxUsersPerRole", alias = "MaxUsersPerRole", default)]
    pub max_users_per_role: BTreeMap<String, u64>,
    #[serde(rename = "securitySettings", alias = "SecuritySettings", default)]
    pub security_settings: SecuritySettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoleInfo {
    #[serde(rename = "roleID")]
    pub role_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagerProfile {
    pub user: ProfileUser,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    #[serde(rename = "message", alias = "Message", default, deserialize_with = "lenient_string")]
    pub message: String,
}

/// Paging and filters for user listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    pub page: u32,
    pub page_size: u32,
    pub search_term: Option<String>,
    pub role_filter: Option<String>,
}

impl Default for UserQuery {
    fn default() -> Self {
        UserQuery { page: 1, page_size: 20, search_term: None, role_filter: None }
    }
}

impl UserQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", self.page.to_string()), ("pageSize", self.page_size.to_string())];
        if let Some(s) = self.search_term.as_ref().filter(|s| !s.is_empty()) {
            params.push(("searchTerm", s.clone()));
        }
        if let Some(r) = self.role_filter.as_ref().filter(|r| !r.is_empty()) {
            params.push(("roleFilter", r.clone()));
        }
        params
    }
}
