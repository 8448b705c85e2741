//! Decorator applications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::Role;
use crate::error::DomainError;

uuid_id! {
    /// Unique identifier for a Decorator.
    DecoratorId
}

/// Review state of a decorator application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DecoratorStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl DecoratorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecoratorStatus::Pending => "pending",
            DecoratorStatus::Approved => "approved",
            DecoratorStatus::Rejected => "rejected",
        }
    }

    /// Role the applicant's user account receives when this status is set.
    ///
    /// Only approval changes the role; rejecting or re-opening an
    /// application leaves the account's current role untouched.
    pub fn granted_role(&self) -> Option<Role> {
        match self {
            DecoratorStatus::Approved => Some(Role::Decorator),
            DecoratorStatus::Pending | DecoratorStatus::Rejected => None,
        }
    }
}

impl std::fmt::Display for DecoratorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DecoratorStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DecoratorStatus::Pending),
            "approved" => Ok(DecoratorStatus::Approved),
            "rejected" => Ok(DecoratorStatus::Rejected),
            other => Err(DomainError::ValidationError(format!(
                "Unknown decorator status: {}",
                other
            ))),
        }
    }
}

/// A decorator profile, created by application and reviewed by an admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decorator {
    pub id: DecoratorId,
    pub name: String,
    pub email: String,
    pub specialty: Option<String>,
    pub photo_url: Option<String>,
    pub rating: f64,
    pub status: DecoratorStatus,
    pub created_at: DateTime<Utc>,
}

impl Decorator {
    /// Files a new application in `pending` state.
    pub fn apply(
        name: String,
        email: String,
        specialty: Option<String>,
        photo_url: Option<String>,
        rating: f64,
    ) -> Result<Self, DomainError> {
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Decorator name and email are required".into(),
            ));
        }
        if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
            return Err(DomainError::ValidationError(
                "Rating must be between 0 and 5".into(),
            ));
        }

        Ok(Self {
            id: DecoratorId::new(),
            name,
            email,
            specialty,
            photo_url,
            rating,
            status: DecoratorStatus::Pending,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_starts_pending() {
        let d = Decorator::apply("Dee".into(), "d@x.com".into(), None, None, 4.5).unwrap();
        assert_eq!(d.status, DecoratorStatus::Pending);
    }

    #[test]
    fn test_rating_out_of_range_fails() {
        let result = Decorator::apply("Dee".into(), "d@x.com".into(), None, None, 7.0);
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_only_approval_grants_a_role() {
        assert_eq!(
            DecoratorStatus::Approved.granted_role(),
            Some(Role::Decorator)
        );
        assert_eq!(DecoratorStatus::Rejected.granted_role(), None);
        assert_eq!(DecoratorStatus::Pending.granted_role(), None);
    }
}
