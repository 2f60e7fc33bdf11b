use serde_json::{json, Value};

use super::models::{ActivityLog, DashboardStats, MessageResponse, Page, RoleInfo, SystemSettings, User, UserQuery};
use super::{normalize, segment, ApiClient};
use crate::error::{AppError, AppResult};

const BASE: &str = "admin";

#[derive(Clone, Debug)]
pub struct AdminGateway {
    api: ApiClient,
}

fn message(raw: Value) -> MessageResponse {
    serde_json::from_value(raw).unwrap_or_default()
}

impl AdminGateway {
    pub fn new(api: ApiClient) -> Self { Self { api } }

    pub async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        let raw = self.api.get_json(&format!("{}/dashboard", BASE), &[]).await?;
        Ok(normalize::dashboard_stats(&raw))
    }

    pub async fn users(&self, q: &UserQuery) -> AppResult<Page<User>> {
        let raw = self.api.get_json(&format!("{}/users", BASE), &q.to_params()).await?;
        Ok(normalize::users_page(&raw, q.page, q.page_size))
    }

    pub async fn user_by_id(&self, user_id: &str) -> AppResult<User> {
        let raw = self.api.get_json(&format!("{}/users/{}", BASE, segment(user_id)?), &[]).await?;
        normalize::user_detail(&raw)
            .ok_or_else(|| AppError::decode("invalid_user", format!("no user in response for '{}'", user_id)))
    }

    pub async fn update_user_role(&self, user_id: &str, role_name: &str) -> AppResult<MessageResponse> {
        if role_name.trim().is_empty() {
            return Err(AppError::user("missing_role", "a role name is required"));
        }
        let path = format!("{}/users/{}/roles", BASE, segment(user_id)?);
        let raw = self.api.post_json(&path, Some(&json!({ "roleName": role_name }))).await?;
        Ok(message(raw))
    }

    pub async fn toggle_user_status(&self, user_id: &str) -> AppResult<MessageResponse> {
        let path = format!("{}/users/{}/toggle-status", BASE, segment(user_id)?);
        let raw = self.api.post_json(&path, None).await?;
        Ok(message(raw))
    }

    pub async fn roles(&self) -> AppResult<Vec<RoleInfo>> {
        let raw = self.api.get_json(&format!("{}/roles", BASE), &[]).await?;
        Ok(normalize::role_list(&raw))
    }

    pub async fn activity_logs(&self, page: u32, page_size: u32) -> AppResult<Page<ActivityLog>> {
        let params = [("page", page.to_string()), ("pageSize", page_size.to_string())];
        let raw = self.api.get_json(&format!("{}/activity-logs", BASE), &params).await?;
        Ok(normalize::activity_logs_page(&raw, page, page_size))
    }

    pub async fn system_settings(&self) -> AppResult<SystemSettings> {
        let raw = self.api.get_json(&format!("{}/settings", BASE), &[]).await?;
        Ok(normalize::system_settings(&raw))
    }
}
