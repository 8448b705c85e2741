//! Hosted-checkout gateway port.
//!
//! The gateway owns the payment page. We open a session for a booking, the
//! customer pays on the gateway's site, and the session is later read back
//! as the authoritative record of what happened.

use std::collections::HashMap;

use crate::domain::{BookingId, Money};

/// Metadata key carrying the booking id through the gateway session.
pub const METADATA_BOOKING_ID: &str = "bookingId";
/// Metadata key carrying the service name through the gateway session.
pub const METADATA_SERVICE_NAME: &str = "serviceName";

/// Gateway value of `payment_status` for a settled session.
pub const SESSION_PAID: &str = "paid";

/// Error type for gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Gateway rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid checkout session id: {0:?}")]
    InvalidSessionId(String),

    #[error("Gateway unreachable: {0}")]
    Transport(String),

    #[error("Unexpected gateway response: {0}")]
    Decode(String),
}

/// Everything needed to open a single-item hosted checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub booking_id: BookingId,
    pub service_name: String,
    /// Price of the single line item (quantity is always 1)
    pub unit_amount: Money,
    pub customer_email: String,
    /// Must contain the gateway's session id placeholder
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutSessionRequest {
    /// Metadata embedded on the session so reconciliation can recover context.
    pub fn metadata(&self) -> HashMap<String, String> {
        HashMap::from([
            (METADATA_BOOKING_ID.to_string(), self.booking_id.to_string()),
            (
                METADATA_SERVICE_NAME.to_string(),
                self.service_name.clone(),
            ),
        ])
    }
}

/// Gateway-side state of a checkout session.
#[derive(Debug, Clone, Default)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted page URL (present while the session is open)
    pub url: Option<String>,
    pub payment_status: String,
    /// Total charged, in minor units
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_email: Option<String>,
    pub metadata: HashMap<String, String>,
    /// Gateway transaction id; set once a payment has been attempted
    pub payment_intent: Option<String>,
}

impl CheckoutSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status == SESSION_PAID
    }

    pub fn booking_ref(&self) -> Option<&str> {
        self.metadata.get(METADATA_BOOKING_ID).map(String::as_str)
    }

    pub fn service_name(&self) -> Option<&str> {
        self.metadata.get(METADATA_SERVICE_NAME).map(String::as_str)
    }
}

/// Port trait for hosted-checkout gateways.
#[async_trait::async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Opens a hosted payment session and returns it (including its URL).
    async fn create_session(
        &self,
        req: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Reads the current state of a session by id.
    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayError>;
}
