//! Data Transfer Objects (DTOs) for requests and responses.
//!
//! Field names follow the camelCase wire format the web client already speaks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    Booking, BookingId, Currency, Decorator, DecoratorId, DecoratorStatus, DeliveryStatus,
    InsertOutcome, PaymentRecord, PaymentStatus, Reconciliation, Role, ServiceId,
    ServiceListing, TrackingId, UpdateOutcome, User, UserId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Checkout & Reconciliation DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to open a hosted checkout session for a booking.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    /// Price in major currency units (at most two decimals)
    #[schema(example = 19.99)]
    pub cost: f64,
    #[schema(example = "Wedding Stage Decoration")]
    pub service_name: String,
    #[schema(example = "customer@example.com")]
    pub user_email: String,
    pub booking_id: BookingId,
}

/// Response with the hosted payment page to redirect to.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    #[schema(example = "https://checkout.stripe.com/c/pay/cs_test_a1")]
    pub url: String,
}

/// Query parameters of the payment redirect-back.
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
pub struct PaymentSuccessQuery {
    /// Checkout session id substituted by the gateway
    pub session_id: String,
}

/// Result of reconciling a checkout session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum PaymentSuccessResponse {
    /// The payment had already been recorded
    AlreadyExists {
        #[schema(example = "already exists")]
        message: String,
        transaction_id: String,
        tracking_id: TrackingId,
    },
    /// The booking was marked paid and the payment recorded
    Reconciled {
        success: bool,
        modify_booking: UpdateOutcome,
        payment_info: InsertOutcome,
        tracking_id: TrackingId,
        transaction_id: String,
    },
    /// The gateway does not report the session as paid
    Incomplete {
        success: bool,
        #[schema(example = "Payment not completed yet")]
        message: String,
    },
}

impl From<Reconciliation> for PaymentSuccessResponse {
    fn from(outcome: Reconciliation) -> Self {
        match outcome {
            Reconciliation::AlreadyReconciled {
                transaction_id,
                tracking_id,
            } => PaymentSuccessResponse::AlreadyExists {
                message: "already exists".into(),
                transaction_id,
                tracking_id,
            },
            Reconciliation::Incomplete => PaymentSuccessResponse::Incomplete {
                success: false,
                message: "Payment not completed yet".into(),
            },
            Reconciliation::Reconciled {
                booking_update,
                ledger_insert,
                tracking_id,
                transaction_id,
            } => PaymentSuccessResponse::Reconciled {
                success: true,
                modify_booking: booking_update,
                payment_info: ledger_insert,
                tracking_id,
                transaction_id,
            },
        }
    }
}

/// Query parameters for payment history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct PaymentsQuery {
    /// Restrict to one customer; must equal the caller's verified email
    pub email: Option<String>,
}

/// A ledger entry as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecordResponse {
    pub id: Uuid,
    /// Amount in major currency units
    #[schema(example = 50.0)]
    pub amount: f64,
    pub currency: Currency,
    pub customer_email: Option<String>,
    pub booking_id: BookingId,
    pub service_name: String,
    #[schema(example = "pi_3Nxyz")]
    pub transaction_id: String,
    pub payment_status: PaymentStatus,
    pub tracking_id: TrackingId,
    pub paid_at: DateTime<Utc>,
}

impl From<PaymentRecord> for PaymentRecordResponse {
    fn from(record: PaymentRecord) -> Self {
        Self {
            id: record.id.into_uuid(),
            amount: record.amount.to_major(),
            currency: record.amount.currency(),
            customer_email: record.customer_email,
            booking_id: record.booking_id,
            service_name: record.service_name,
            transaction_id: record.transaction_id,
            payment_status: record.payment_status,
            tracking_id: record.tracking_id,
            paid_at: record.paid_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Booking DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to book a decoration service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[schema(example = "customer@example.com")]
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub service_id: ServiceId,
    pub service_name: String,
    /// Price in major currency units
    #[schema(example = 50.0)]
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "2025-12-24")]
    pub event_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Query parameters for listing bookings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct BookingsQuery {
    pub email: Option<String>,
    pub delivery_status: Option<DeliveryStatus>,
}

/// A booking as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: BookingId,
    pub user_email: String,
    pub user_name: Option<String>,
    pub service_id: ServiceId,
    pub service_name: String,
    /// Price in major currency units
    pub cost: f64,
    pub currency: Currency,
    pub event_date: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub payment_time: Option<DateTime<Utc>>,
    pub delivery_status: DeliveryStatus,
    pub tracking_id: Option<TrackingId>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            user_email: b.user_email,
            user_name: b.user_name,
            service_id: b.service_id,
            service_name: b.service_name,
            cost: b.cost.to_major(),
            currency: b.cost.currency(),
            event_date: b.event_date,
            location: b.location,
            created_at: b.created_at,
            payment_status: b.payment_status,
            payment_time: b.payment_time,
            delivery_status: b.delivery_status,
            tracking_id: b.tracking_id,
        }
    }
}

/// Response after deleting a record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// User DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to register (or re-login) a user after sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[schema(example = "customer@example.com")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Response to a registration: either a new user or a refreshed login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserResponse {
    /// False when the email was already registered
    pub created: bool,
    pub user: UserResponse,
}

/// A user as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
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

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            photo_url: u.photo_url,
            phone: u.phone,
            address: u.address,
            role: u.role,
            created_at: u.created_at,
            last_logged_in: u.last_logged_in,
            updated_at: u.updated_at,
        }
    }
}

/// Role lookup result.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleResponse {
    pub role: Role,
}

/// Self-service profile edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Response after a profile edit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileResponse {
    pub success: bool,
    pub message: String,
    pub result: UpdateOutcome,
}

/// Admin request to change a user's role.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Admin request to add a catalog listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    #[schema(example = "Birthday Balloon Arch")]
    pub service_name: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Price in major currency units
    #[schema(example = 120.0)]
    pub cost: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A catalog listing as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListingResponse {
    pub id: ServiceId,
    pub service_name: String,
    pub category: Option<String>,
    pub cost: f64,
    pub currency: Currency,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ServiceListing> for ServiceListingResponse {
    fn from(s: ServiceListing) -> Self {
        Self {
            id: s.id,
            service_name: s.service_name,
            category: s.category,
            cost: s.cost.to_major(),
            currency: s.cost.currency(),
            unit: s.unit,
            description: s.description,
            image: s.image,
            created_at: s.created_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decorator DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Application to become a decorator.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyDecoratorRequest {
    pub name: String,
    #[schema(example = "decorator@example.com")]
    pub email: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    #[schema(example = 4.5)]
    pub rating: f64,
}

/// Admin review of a decorator application.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateDecoratorStatusRequest {
    pub status: DecoratorStatus,
    /// Applicant account whose role follows the decision
    #[serde(default)]
    pub email: Option<String>,
}

/// A decorator as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecoratorResponse {
    pub id: DecoratorId,
    pub name: String,
    pub email: String,
    pub specialty: Option<String>,
    pub photo_url: Option<String>,
    pub rating: f64,
    pub status: DecoratorStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Decorator> for DecoratorResponse {
    fn from(d: Decorator) -> Self {
        Self {
            id: d.id,
            name: d.name,
            email: d.email,
            specialty: d.specialty,
            photo_url: d.photo_url,
            rating: d.rating,
            status: d.status,
            created_at: d.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_wire_format() {
        let body = serde_json::to_value(PaymentSuccessResponse::from(Reconciliation::Incomplete))
            .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "message": "Payment not completed yet"})
        );
    }

    #[test]
    fn test_already_exists_wire_format() {
        let tracking = TrackingId::from_string("SD-20251218123456-4821".into());
        let body = serde_json::to_value(PaymentSuccessResponse::from(
            Reconciliation::AlreadyReconciled {
                transaction_id: "pi_1".into(),
                tracking_id: tracking,
            },
        ))
        .unwrap();

        assert_eq!(body["message"], "already exists");
        assert_eq!(body["transactionId"], "pi_1");
        assert_eq!(body["trackingId"], "SD-20251218123456-4821");
    }

    #[test]
    fn test_reconciled_wire_format() {
        let body = serde_json::to_value(PaymentSuccessResponse::from(
            Reconciliation::Reconciled {
                booking_update: UpdateOutcome::from_rows(1),
                ledger_insert: InsertOutcome::inserted(Uuid::nil()),
                tracking_id: TrackingId::from_string("SD-20251218123456-4821".into()),
                transaction_id: "pi_1".into(),
            },
        ))
        .unwrap();

        assert_eq!(body["success"], true);
        assert_eq!(body["modifyBooking"]["matchedCount"], 1);
        assert_eq!(body["paymentInfo"]["acknowledged"], true);
        assert_eq!(body["transactionId"], "pi_1");
    }

    #[test]
    fn test_incomplete_parses_back_to_incomplete() {
        let parsed: PaymentSuccessResponse =
            serde_json::from_str(r#"{"success":false,"message":"Payment not completed yet"}"#)
                .unwrap();
        assert!(matches!(
            parsed,
            PaymentSuccessResponse::Incomplete { success: false, .. }
        ));
    }

    #[test]
    fn test_bookings_query_camel_case() {
        let q: BookingsQuery =
            serde_json::from_str(r#"{"deliveryStatus":"pending-pickup"}"#).unwrap();
        assert_eq!(q.delivery_status, Some(DeliveryStatus::PendingPickup));
    }
}
