//! Stripe Checkout adapter.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use decor_types::{CheckoutGateway, CheckoutSession, CheckoutSessionRequest, GatewayError};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Hosted checkout over the Stripe REST API.
#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self::with_api_base(secret_key, DEFAULT_API_BASE)
    }

    /// Points the adapter at another API host (e.g. a local Stripe mock).
    pub fn with_api_base(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn sessions_url(&self) -> String {
        format!("{}/v1/checkout/sessions", self.api_base)
    }

    /// URL of one session. Ids are caller-supplied, so anything outside
    /// Stripe's id alphabet is refused before a request is built.
    fn session_url(&self, session_id: &str) -> Result<reqwest::Url, GatewayError> {
        if !is_session_id(session_id) {
            return Err(GatewayError::InvalidSessionId(session_id.to_string()));
        }

        let mut url = reqwest::Url::parse(&self.sessions_url())
            .map_err(|e| GatewayError::Transport(format!("bad API base: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Transport("API base cannot carry a path".into()))?
            .push(session_id);
        Ok(url)
    }

    async fn read_session(response: reqwest::Response) -> Result<CheckoutSession, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or(body);
            warn!(status = status.as_u16(), %message, "Stripe rejected request");
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let session: StripeSession = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        Ok(session.into())
    }
}

fn is_session_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Form fields for a single-item, quantity-1 payment session.
///
/// Stripe expects nested parameters in bracket notation.
pub(crate) fn checkout_form(req: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        (
            "line_items[0][price_data][currency]".to_string(),
            req.unit_amount.currency().code().to_string(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            req.unit_amount.amount().to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            req.service_name.clone(),
        ),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        ("customer_email".to_string(), req.customer_email.clone()),
        ("success_url".to_string(), req.success_url.clone()),
        ("cancel_url".to_string(), req.cancel_url.clone()),
    ];

    let metadata: BTreeMap<_, _> = req.metadata().into_iter().collect();
    for (key, value) in metadata {
        form.push((format!("metadata[{}]", key), value));
    }

    form
}

#[async_trait]
impl CheckoutGateway for StripeGateway {
    #[instrument(skip(self, req), fields(booking_id = %req.booking_id))]
    async fn create_session(
        &self,
        req: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let response = self
            .client
            .post(self.sessions_url())
            .bearer_auth(&self.secret_key)
            .form(&checkout_form(&req))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let session = Self::read_session(response).await?;
        debug!(session_id = %session.id, "Checkout session created");
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayError> {
        let url = self.session_url(session_id)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::read_session(response).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
    payment_status: String,
    amount_total: Option<i64>,
    currency: Option<String>,
    customer_email: Option<String>,
    customer_details: Option<StripeCustomerDetails>,
    #[serde(default)]
    metadata: HashMap<String, String>,
    payment_intent: Option<PaymentIntentRef>,
}

#[derive(Debug, Deserialize)]
struct StripeCustomerDetails {
    email: Option<String>,
}

/// `payment_intent` is an id unless the request expanded it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PaymentIntentRef {
    Id(String),
    Expanded { id: String },
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

impl From<StripeSession> for CheckoutSession {
    fn from(s: StripeSession) -> Self {
        let customer_email = s
            .customer_email
            .or_else(|| s.customer_details.and_then(|d| d.email));

        CheckoutSession {
            id: s.id,
            url: s.url,
            payment_status: s.payment_status,
            amount_total: s.amount_total,
            currency: s.currency,
            customer_email,
            metadata: s.metadata,
            payment_intent: s.payment_intent.map(|p| match p {
                PaymentIntentRef::Id(id) | PaymentIntentRef::Expanded { id } => id,
            }),
        }
    }
}
