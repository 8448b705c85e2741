//! Booking domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::listing::ServiceId;
use super::money::Money;
use super::payment::PaymentStatus;
use super::tracking::TrackingId;
use crate::error::DomainError;

uuid_id! {
    /// Unique identifier for a Booking.
    BookingId
}

/// Fulfillment state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryStatus {
    /// Not yet paid, nothing to deliver
    #[default]
    None,
    /// Paid and waiting for the decorator to pick it up
    PendingPickup,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::None => "none",
            DeliveryStatus::PendingPickup => "pending-pickup",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(DeliveryStatus::None),
            "pending-pickup" => Ok(DeliveryStatus::PendingPickup),
            other => Err(DomainError::ValidationError(format!(
                "Unknown delivery status: {}",
                other
            ))),
        }
    }
}

/// A customer's request for a decoration service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_email: String,
    pub user_name: Option<String>,
    pub service_id: ServiceId,
    pub service_name: String,
    pub cost: Money,
    /// Requested event date as entered on the booking form
    pub event_date: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub payment_time: Option<DateTime<Utc>>,
    pub delivery_status: DeliveryStatus,
    /// Assigned once, when the payment is reconciled
    pub tracking_id: Option<TrackingId>,
}

impl Booking {
    /// Creates a new unpaid booking.
    ///
    /// # Validation
    /// - User email and service name cannot be empty
    /// - Cost must be positive
    pub fn new(
        user_email: String,
        user_name: Option<String>,
        service_id: ServiceId,
        service_name: String,
        cost: Money,
        event_date: Option<String>,
        location: Option<String>,
    ) -> Result<Self, DomainError> {
        if user_email.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "User email cannot be empty".into(),
            ));
        }
        if service_name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Service name cannot be empty".into(),
            ));
        }
        if cost.is_zero() {
            return Err(DomainError::ValidationError(
                "Booking cost must be positive".into(),
            ));
        }

        Ok(Self {
            id: BookingId::new(),
            user_email,
            user_name,
            service_id,
            service_name,
            cost,
            event_date,
            location,
            created_at: Utc::now(),
            payment_status: PaymentStatus::Unpaid,
            payment_time: None,
            delivery_status: DeliveryStatus::None,
            tracking_id: None,
        })
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

/// Filter for listing bookings. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub user_email: Option<String>,
    pub delivery_status: Option<DeliveryStatus>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        self.user_email
            .as_ref()
            .is_none_or(|email| &booking.user_email == email)
            && self
                .delivery_status
                .is_none_or(|status| booking.delivery_status == status)
    }
}

/// Payment fields written to a booking when its payment is confirmed.
#[derive(Debug, Clone)]
pub struct BookingPaymentUpdate {
    pub booking_id: BookingId,
    pub paid_at: DateTime<Utc>,
    pub tracking_id: TrackingId,
}

impl BookingPaymentUpdate {
    pub fn new(booking_id: BookingId, paid_at: DateTime<Utc>, tracking_id: TrackingId) -> Self {
        Self {
            booking_id,
            paid_at,
            tracking_id,
        }
    }

    /// Delivery state a booking enters once paid.
    pub fn delivery_status(&self) -> DeliveryStatus {
        DeliveryStatus::PendingPickup
    }

    /// Applies the update to an in-memory booking.
    ///
    /// A booking that already holds a tracking id is left untouched and
    /// `false` is returned.
    pub fn apply(&self, booking: &mut Booking) -> bool {
        if booking.tracking_id.is_some() {
            return false;
        }
        booking.payment_status = PaymentStatus::Paid;
        booking.payment_time = Some(self.paid_at);
        booking.delivery_status = self.delivery_status();
        booking.tracking_id = Some(self.tracking_id.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Currency;

    fn sample_booking() -> Booking {
        Booking::new(
            "a@x.com".to_string(),
            None,
            ServiceId::new(),
            "Wedding Stage".to_string(),
            Money::new(5000, Currency::USD).unwrap(),
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_booking_starts_unpaid() {
        let booking = sample_booking();
        assert_eq!(booking.payment_status, PaymentStatus::Unpaid);
        assert_eq!(booking.delivery_status, DeliveryStatus::None);
        assert!(booking.tracking_id.is_none());
    }

    #[test]
    fn test_zero_cost_fails() {
        let result = Booking::new(
            "a@x.com".to_string(),
            None,
            ServiceId::new(),
            "Stage".to_string(),
            Money::zero(Currency::USD),
            None,
            None,
        );
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_payment_update_apply() {
        let mut booking = sample_booking();
        let tracking = TrackingId::generate();
        let update = BookingPaymentUpdate::new(booking.id, Utc::now(), tracking.clone());

        assert!(update.apply(&mut booking));

        assert!(booking.is_paid());
        assert_eq!(booking.delivery_status, DeliveryStatus::PendingPickup);
        assert_eq!(booking.tracking_id, Some(tracking));
        assert!(booking.payment_time.is_some());
    }

    #[test]
    fn test_payment_update_keeps_first_tracking_id() {
        let mut booking = sample_booking();
        let first = TrackingId::generate();
        BookingPaymentUpdate::new(booking.id, Utc::now(), first.clone()).apply(&mut booking);
        let paid_at = booking.payment_time;

        let second = BookingPaymentUpdate::new(booking.id, Utc::now(), TrackingId::generate());
        assert!(!second.apply(&mut booking));

        assert_eq!(booking.tracking_id, Some(first));
        assert_eq!(booking.payment_time, paid_at);
    }

    #[test]
    fn test_filter_matches() {
        let booking = sample_booking();
        assert!(BookingFilter::default().matches(&booking));
        assert!(
            BookingFilter {
                user_email: Some("a@x.com".into()),
                delivery_status: Some(DeliveryStatus::None),
            }
            .matches(&booking)
        );
        assert!(
            !BookingFilter {
                user_email: Some("b@x.com".into()),
                delivery_status: None,
            }
            .matches(&booking)
        );
    }

    #[test]
    fn test_delivery_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&DeliveryStatus::PendingPickup).unwrap(),
            "\"pending-pickup\""
        );
        assert_eq!(
            "pending-pickup".parse::<DeliveryStatus>().unwrap(),
            DeliveryStatus::PendingPickup
        );
    }
}
