//! Response-shape normalization, one adapter per resource.
//!
//! The backend answers with camelCase or PascalCase keys and wraps payloads at
//! varying depths. Lookups follow JSON `??` semantics: a key that is missing or
//! `null` falls through to the next candidate.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use super::models::{
    ActivityLog, DashboardStats, ManagerProfile, Page, Pagination, ProfileUser, RoleInfo, SystemInfo,
    SystemSettings, User,
};

/// First value under `keys` that is present and not null.
pub fn pick<'a>(v: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| v.get(*k).filter(|x| !x.is_null()))
}

/// Like `pick`, rendered as a string; numbers and booleans are stringified.
pub fn pick_str(v: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match v.get(*k) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn pick_u64(v: &Value, keys: &[&str]) -> Option<u64> {
    pick(v, keys).and_then(|x| x.as_u64().or_else(|| x.as_f64().map(|f| f.max(0.0) as u64)))
}

/// Deserialize each element on its own, dropping the ones that do not fit.
fn parse_each<T: DeserializeOwned>(items: &[Value], what: &str) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match serde_json::from_value::<T>(item.clone()) {
            Ok(x) => out.push(x),
            Err(e) => debug!(target: "rolegate::gateway", "skipping {} #{}: {}", what, i, e),
        }
    }
    out
}

fn as_list(v: Option<&Value>) -> &[Value] {
    match v {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

/// List payload: a bare array, the array inside `data`/`items`, or the array
/// under one of `keys` on the body or on that container.
pub fn unwrap_list(raw: &Value, keys: &[&str]) -> Vec<Value> {
    if let Value::Array(items) = raw {
        return items.clone();
    }
    let container = pick(raw, &["data", "Data", "items", "Items"]).unwrap_or(raw);
    if let Value::Array(items) = container {
        return items.clone();
    }
    for key in keys {
        if let Some(Value::Array(items)) = raw.get(*key) {
            return items.clone();
        }
        if let Some(Value::Array(items)) = container.get(*key) {
            return items.clone();
        }
    }
    Vec::new()
}

/// Role names from `roles`/`Roles`: strings as-is, objects by `object_keys`.
/// Blank names are dropped.
pub fn role_names(raw: &Value, object_keys: &[&str]) -> Vec<String> {
    as_list(pick(raw, &["roles", "Roles"]))
        .iter()
        .filter_map(|x| match x {
            Value::String(s) => Some(s.clone()),
            Value::Object(_) => pick_str(x, object_keys),
            _ => None,
        })
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// Pagination from the first source carrying one, else an empty page descriptor.
pub fn pagination(sources: &[&Value], page: u32, page_size: u32) -> Pagination {
    sources
        .iter()
        .filter_map(|src| pick(src, &["pagination", "Pagination"]))
        .find_map(|p| serde_json::from_value::<Pagination>(p.clone()).ok())
        .unwrap_or_else(|| Pagination::empty(page, page_size))
}

/// A user record. Role entries may be strings or role objects.
pub fn user(v: &Value) -> Option<User> {
    let Value::Object(map) = v else { return None };
    let mut rest: Map<String, Value> = map.clone();
    rest.remove("roles");
    rest.remove("Roles");
    let mut u: User = serde_json::from_value(Value::Object(rest)).ok()?;
    u.roles = role_names(v, &["name", "roleName"]);
    Some(u)
}

fn users(items: &[Value]) -> Vec<User> {
    items.iter().filter_map(user).collect()
}

pub fn users_page(raw: &Value, page: u32, page_size: u32) -> Page<User> {
    Page {
        data: users(as_list(pick(raw, &["users", "Users"]))),
        pagination: pagination(&[raw], page, page_size),
    }
}

pub fn team_page(raw: &Value, page: u32, page_size: u32) -> Page<User> {
    Page {
        data: users(as_list(pick(raw, &["users", "Users", "data", "Data"]))),
        pagination: pagination(&[raw], page, page_size),
    }
}

/// `{ user, roles }` detail response. Roles always come from the top level;
/// without one the user has none.
pub fn user_detail(raw: &Value) -> Option<User> {
    let mut u = user(pick(raw, &["user", "User"])?)?;
    u.roles = role_names(raw, &["name", "roleName"]);
    Some(u)
}

pub fn role_list(raw: &Value) -> Vec<RoleInfo> {
    as_list(pick(raw, &["roles", "Roles"]))
        .iter()
        .filter_map(|x| {
            let name = pick_str(x, &["name", "roleName", "Name", "RoleName"])?;
            Some(RoleInfo { role_id: pick_str(x, &["roleID", "roleId", "RoleID", "RoleId"]), name })
        })
        .collect()
}

pub fn activity_logs_page(raw: &Value, page: u32, page_size: u32) -> Page<ActivityLog> {
    let container = pick(raw, &["activityLogs", "ActivityLogs", "logs", "Logs"]).unwrap_or(raw);
    let data = pick(container, &["data", "Data", "activityLogs", "ActivityLogs", "logs", "Logs", "items", "Items"])
        .or(if container.is_array() { Some(container) } else { None });
    Page {
        data: parse_each(as_list(data), "activity log"),
        pagination: pagination(&[container, raw], page, page_size),
    }
}

pub fn system_settings(raw: &Value) -> SystemSettings {
    let settings = pick(raw, &["settings", "Settings", "data", "Data", "systemSettings", "SystemSettings"]).unwrap_or(raw);
    serde_json::from_value(settings.clone()).unwrap_or_default()
}

pub fn dashboard_stats(raw: &Value) -> DashboardStats {
    let stats = pick(raw, &["stats", "Stats"]).unwrap_or(raw);
    let users_by_role = match pick(stats, &["usersByRole", "UsersByRole"]) {
        Some(Value::Object(m)) => m
            .iter()
            .filter_map(|(k, v)| v.as_u64().map(|n| (k.clone(), n)))
            .collect(),
        _ => Default::default(),
    };
    DashboardStats {
        total_users: pick_u64(stats, &["totalUsers", "TotalUsers"]).unwrap_or(0),
        users_by_role,
        recent_users: users(as_list(pick(stats, &["recentUsers", "RecentUsers"]))),
        system_info: pick(stats, &["systemInfo", "SystemInfo"])
            .and_then(|v| serde_json::from_value::<SystemInfo>(v.clone()).ok()),
    }
}

pub fn manager_profile(raw: &Value) -> ManagerProfile {
    let nested = pick(raw, &["profile", "Profile"]).and_then(|p| pick(p, &["user", "User"]));
    let u = pick(raw, &["user", "User"]).or(nested).unwrap_or(raw);
    ManagerProfile {
        user: ProfileUser {
            user_id: pick_str(u, &["userId", "userID", "UserId", "UserID"]),
            email: pick_str(u, &["email", "Email"]),
            name: pick_str(u, &["name", "personName", "PersonName", "fullName"]),
        },
        roles: role_names(raw, &["name", "roleName", "role"]),
    }
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod normalize_tests;
