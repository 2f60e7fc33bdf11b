use tracing::{info, warn};

use super::ApiClient;
use crate::error::AppResult;
use crate::identity::{accept_authentication, LoginRequest, RegisterRequest, Session, SessionContext};

pub const LOGIN_PATH: &str = "auth/login";
pub const REGISTER_PATH: &str = "auth/register";

/// Login/register against the backend. A successful answer replaces the
/// session held by the context; anything else is returned as an error and
/// leaves the context alone.
#[derive(Clone, Debug)]
pub struct AuthGateway {
    api: ApiClient,
    context: SessionContext,
}

impl AuthGateway {
    pub fn new(api: ApiClient, context: SessionContext) -> Self { Self { api, context } }

    pub fn context(&self) -> &SessionContext { &self.context }

    pub async fn login(&self, req: &LoginRequest) -> AppResult<Session> {
        info!(target: "rolegate::gateway", "login attempt email={}", req.email);
        let builder = self.api.post_builder(LOGIN_PATH)?.json(req);
        let (status, body) = self.api.send_raw(builder).await?;
        let session = accept_authentication("login", status.as_u16(), &body).map_err(|e| {
            warn!(target: "rolegate::gateway", "login rejected email={} status={}: {}", req.email, status, e);
            e
        })?;
        self.context.establish(session.clone())?;
        Ok(session)
    }

    pub async fn register(&self, req: &RegisterRequest) -> AppResult<Session> {
        info!(target: "rolegate::gateway", "register attempt email={} role={}", req.email, req.role_name);
        let builder = self.api.post_builder(REGISTER_PATH)?.json(req);
        let (status, body) = self.api.send_raw(builder).await?;
        let session = accept_authentication("register", status.as_u16(), &body).map_err(|e| {
            warn!(target: "rolegate::gateway", "register rejected email={} status={}: {}", req.email, status, e);
            e
        })?;
        self.context.establish(session.clone())?;
        Ok(session)
    }

    /// Local sign-out; the backend has no logout endpoint.
    pub fn logout(&self) {
        self.context.clear();
    }
}
