use serde_json::Value;

use super::models::{ManagerProfile, Page, User, UserQuery};
use super::{normalize, ApiClient};
use crate::error::AppResult;

const BASE: &str = "manager";

#[derive(Clone, Debug)]
pub struct ManagerGateway {
    api: ApiClient,
}

impl ManagerGateway {
    pub fn new(api: ApiClient) -> Self { Self { api } }

    /// Dashboard payload is passed through untouched.
    pub async fn dashboard(&self) -> AppResult<Value> {
        self.api.get_json(&format!("{}/dashboard", BASE), &[]).await
    }

    pub async fn team(&self, q: &UserQuery) -> AppResult<Page<User>> {
        let raw = self.api.get_json(&format!("{}/team", BASE), &q.to_params()).await?;
        Ok(normalize::team_page(&raw, q.page, q.page_size))
    }

    pub async fn profile(&self) -> AppResult<ManagerProfile> {
        let raw = self.api.get_json(&format!("{}/profile", BASE), &[]).await?;
        Ok(normalize::manager_profile(&raw))
    }

    async fn list(&self, resource: &str, keys: &[&str]) -> AppResult<Vec<Value>> {
        let raw = self.api.get_json(&format!("{}/{}", BASE, resource), &[]).await?;
        Ok(normalize::unwrap_list(&raw, keys))
    }

    pub async fn reports(&self) -> AppResult<Vec<Value>> { self.list("reports", &["reports", "Reports"]).await }

    pub async fn tasks(&self) -> AppResult<Vec<Value>> { self.list("tasks", &["tasks", "Tasks"]).await }

    pub async fn inventory(&self) -> AppResult<Vec<Value>> { self.list("inventory", &["inventory", "Inventory"]).await }

    pub async fn schedule(&self) -> AppResult<Vec<Value>> { self.list("schedule", &["schedule", "Schedule"]).await }
}
