//! Client-side screen routing by role.
//!
//! This decides which screen to *show*; it is not an authorization check. Tokens
//! are never signature-verified on the client and every gateway call is still
//! authorized by the backend.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::claims::RoleSet;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::User => "User",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    Login,
    Register,
    Dashboard,
    AdminDashboard,
    ManagerDashboard,
    UserDashboard,
    UserManagement,
    ActivityLogs,
    SystemSettings,
    ManagerTeamManagement,
    ManagerReports,
    ManagerTasks,
    ManagerInventory,
    ManagerSchedule,
    ManagerPerformance,
    ManagerMyProfile,
}

impl Screen {
    pub const ALL: [Screen; 16] = [
        Screen::Login,
        Screen::Register,
        Screen::Dashboard,
        Screen::AdminDashboard,
        Screen::ManagerDashboard,
        Screen::UserDashboard,
        Screen::UserManagement,
        Screen::ActivityLogs,
        Screen::SystemSettings,
        Screen::ManagerTeamManagement,
        Screen::ManagerReports,
        Screen::ManagerTasks,
        Screen::ManagerInventory,
        Screen::ManagerSchedule,
        Screen::ManagerPerformance,
        Screen::ManagerMyProfile,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Screen::Login => "Login",
            Screen::Register => "Register",
            Screen::Dashboard => "Dashboard",
            Screen::AdminDashboard => "AdminDashboard",
            Screen::ManagerDashboard => "ManagerDashboard",
            Screen::UserDashboard => "UserDashboard",
            Screen::UserManagement => "UserManagement",
            Screen::ActivityLogs => "ActivityLogs",
            Screen::SystemSettings => "SystemSettings",
            Screen::ManagerTeamManagement => "ManagerTeamManagement",
            Screen::ManagerReports => "ManagerReports",
            Screen::ManagerTasks => "ManagerTasks",
            Screen::ManagerInventory => "ManagerInventory",
            Screen::ManagerSchedule => "ManagerSchedule",
            Screen::ManagerPerformance => "ManagerPerformance",
            Screen::ManagerMyProfile => "ManagerMyProfile",
        }
    }

    /// Screens reachable without a session.
    pub fn is_public(&self) -> bool {
        matches!(self, Screen::Login | Screen::Register)
    }

    /// Screens that bounce non-admins back to the user dashboard.
    pub fn is_admin_only(&self) -> bool {
        matches!(self, Screen::AdminDashboard | Screen::UserManagement | Screen::ActivityLogs | Screen::SystemSettings)
    }
}

impl Display for Screen {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Screen {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let want = s.trim();
        Screen::ALL
            .iter()
            .copied()
            .find(|sc| sc.name().eq_ignore_ascii_case(want))
            .ok_or_else(|| AppError::user("unknown_screen", format!("unknown screen '{}'", want)))
    }
}

pub fn has_role(roles: &RoleSet, role: Role) -> bool {
    roles.contains(role.as_str())
}

/// Landing dashboard. Admin wins over Manager when both are granted.
pub fn dashboard_for(roles: &RoleSet) -> Screen {
    if has_role(roles, Role::Admin) {
        Screen::AdminDashboard
    } else if has_role(roles, Role::Manager) {
        Screen::ManagerDashboard
    } else {
        Screen::UserDashboard
    }
}

/// Screen to actually display when `requested` is asked for. `roles` is `None`
/// when there is no session.
pub fn route(requested: Screen, roles: Option<&RoleSet>) -> Screen {
    let Some(roles) = roles else {
        return if requested.is_public() { requested } else { Screen::Login };
    };
    let is_admin = has_role(roles, Role::Admin);
    let is_manager = has_role(roles, Role::Manager);
    match requested {
        Screen::Login | Screen::Register | Screen::Dashboard => dashboard_for(roles),
        s if s.is_admin_only() && !is_admin => Screen::UserDashboard,
        Screen::ManagerDashboard if is_admin => Screen::AdminDashboard,
        Screen::ManagerDashboard if !is_manager => Screen::UserDashboard,
        Screen::UserDashboard if is_admin => Screen::AdminDashboard,
        Screen::UserDashboard if is_manager => Screen::ManagerDashboard,
        // manager sub-screens are left to the backend to refuse
        other => other,
    }
}
