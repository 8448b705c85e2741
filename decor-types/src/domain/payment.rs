//! Payment ledger domain model and reconciliation outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::booking::BookingId;
use super::money::Money;
use super::outcome::{InsertOutcome, UpdateOutcome};
use super::tracking::TrackingId;
use crate::error::DomainError;

uuid_id! {
    /// Unique identifier for a ledger entry.
    PaymentRecordId
}

/// Payment state of a booking or ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "paid" => Ok(PaymentStatus::Paid),
            other => Err(DomainError::ValidationError(format!(
                "Unknown payment status: {}",
                other
            ))),
        }
    }
}

/// A confirmed payment event.
///
/// Ledger entries are immutable once created - at most one exists per
/// external transaction id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentRecordId,
    pub amount: Money,
    pub customer_email: Option<String>,
    /// Booking the payment was made for (not enforced as a foreign key)
    pub booking_id: BookingId,
    pub service_name: String,
    /// Gateway-issued transaction id
    pub transaction_id: String,
    pub payment_status: PaymentStatus,
    pub tracking_id: TrackingId,
    pub paid_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// Creates a ledger entry for a confirmed payment.
    pub fn paid(
        amount: Money,
        customer_email: Option<String>,
        booking_id: BookingId,
        service_name: String,
        transaction_id: String,
        tracking_id: TrackingId,
        paid_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PaymentRecordId::new(),
            amount,
            customer_email,
            booking_id,
            service_name,
            transaction_id,
            payment_status: PaymentStatus::Paid,
            tracking_id,
            paid_at,
        }
    }
}

/// Result of atomically writing a ledger entry together with its booking update.
#[derive(Debug, Clone)]
pub enum LedgerWrite {
    /// The entry was inserted and the booking updated in the same transaction.
    Recorded {
        booking: UpdateOutcome,
        ledger: InsertOutcome,
    },
    /// An entry for the same transaction id already existed; nothing was written.
    Duplicate(PaymentRecord),
}

/// Outcome of reconciling a checkout session against local records.
#[derive(Debug, Clone)]
pub enum Reconciliation {
    /// The transaction was already in the ledger; nothing changed.
    AlreadyReconciled {
        transaction_id: String,
        tracking_id: TrackingId,
    },
    /// The gateway does not report the session as paid; nothing changed.
    Incomplete,
    /// The booking was marked paid and a ledger entry created.
    Reconciled {
        booking_update: UpdateOutcome,
        ledger_insert: InsertOutcome,
        tracking_id: TrackingId,
        transaction_id: String,
    },
}

impl Reconciliation {
    pub fn tracking_id(&self) -> Option<&TrackingId> {
        match self {
            Reconciliation::AlreadyReconciled { tracking_id, .. }
            | Reconciliation::Reconciled { tracking_id, .. } => Some(tracking_id),
            Reconciliation::Incomplete => None,
        }
    }
}
