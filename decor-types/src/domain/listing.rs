//! Decoration service catalog entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::money::Money;
use crate::error::DomainError;

uuid_id! {
    /// Unique identifier for a catalog listing.
    ServiceId
}

/// A decoration package offered in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceListing {
    pub id: ServiceId,
    pub service_name: String,
    pub category: Option<String>,
    pub cost: Money,
    /// Pricing unit, e.g. "per event" or "per sq-ft"
    pub unit: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ServiceListing {
    pub fn new(
        service_name: String,
        category: Option<String>,
        cost: Money,
        unit: Option<String>,
        description: Option<String>,
        image: Option<String>,
    ) -> Result<Self, DomainError> {
        if service_name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Service name cannot be empty".into(),
            ));
        }

        Ok(Self {
            id: ServiceId::new(),
            service_name,
            category,
            cost,
            unit,
            description,
            image,
            created_at: Utc::now(),
        })
    }
}
