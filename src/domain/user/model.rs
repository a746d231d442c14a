use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User role. Administrators and residents see different views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "admin")]
    Administrator,
    #[serde(rename = "resident")]
    Resident,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administrator => "admin",
            Self::Resident => "resident",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" | "administrator" => Ok(Self::Administrator),
            "resident" => Ok(Self::Resident),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// User model
///
/// `flat_number` is only meaningful for residents; use [`User::flat`] rather
/// than reading the field directly when rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Administrator
    }

    /// Flat number, for residents only.
    pub fn flat(&self) -> Option<&str> {
        match self.role {
            UserRole::Resident => self.flat_number.as_deref(),
            UserRole::Administrator => None,
        }
    }

    /// Check the role-dependent field invariant.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("user id is empty".into());
        }
        if self.email.trim().is_empty() {
            return Err("user email is empty".into());
        }
        match (self.role, self.flat_number.as_deref()) {
            (UserRole::Resident, None) => Err(format!("resident {} has no flat number", self.id)),
            (UserRole::Resident, Some(flat)) if flat.trim().is_empty() => {
                Err(format!("resident {} has an empty flat number", self.id))
            }
            (UserRole::Administrator, Some(_)) => {
                Err(format!("administrator {} must not have a flat number", self.id))
            }
            _ => Ok(()),
        }
    }
}
