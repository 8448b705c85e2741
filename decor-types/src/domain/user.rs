//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DomainError;

uuid_id! {
    /// Unique identifier for a User.
    UserId
}

/// Access role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Decorator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Decorator => "decorator",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "decorator" => Ok(Role::Decorator),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::ValidationError(format!(
                "Unknown role: {}",
                other
            ))),
        }
    }
}

/// A registered user, keyed by the email of their verified identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_logged_in: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Registers a new user with the default `user` role.
    pub fn register(
        email: String,
        name: Option<String>,
        photo_url: Option<String>,
    ) -> Result<Self, DomainError> {
        if email.trim().is_empty() {
            return Err(DomainError::ValidationError("Email cannot be empty".into()));
        }

        let now = Utc::now();
        Ok(Self {
            id: UserId::new(),
            email,
            name,
            photo_url,
            phone: None,
            address: None,
            role: Role::User,
            created_at: now,
            last_logged_in: now,
            updated_at: None,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Self-service profile edits. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ProfileChanges {
    pub fn apply(&self, user: &mut User, at: DateTime<Utc>) {
        if let Some(name) = &self.name {
            user.name = Some(name.clone());
        }
        if let Some(phone) = &self.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(address) = &self.address {
            user.address = Some(address.clone());
        }
        user.updated_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_defaults_to_user_role() {
        let user = User::register("a@x.com".into(), Some("Ann".into()), None).unwrap();
        assert_eq!(user.role, Role::User);
        assert!(!user.is_admin());
        assert_eq!(user.created_at, user.last_logged_in);
    }

    #[test]
    fn test_register_empty_email_fails() {
        let result = User::register("  ".into(), None, None);
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_profile_changes_keep_unset_fields() {
        let mut user = User::register("a@x.com".into(), Some("Ann".into()), None).unwrap();
        let changes = ProfileChanges {
            phone: Some("555-0101".into()),
            ..Default::default()
        };
        changes.apply(&mut user, Utc::now());

        assert_eq!(user.name.as_deref(), Some("Ann"));
        assert_eq!(user.phone.as_deref(), Some("555-0101"));
        assert!(user.updated_at.is_some());
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
    }
}
