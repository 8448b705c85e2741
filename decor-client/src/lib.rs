//! # Decor Client SDK
//!
//! A typed Rust client for the decoration booking API.

use decor_types::{
    ApplyDecoratorRequest, BookingId, BookingResponse, CheckoutResponse, CreateBookingRequest,
    CreateCheckoutRequest, DecoratorId, DecoratorResponse, DecoratorStatus, DeleteResponse,
    DeliveryStatus, PaymentRecordResponse, PaymentSuccessResponse, RegisterUserRequest,
    RegisterUserResponse, Role, RoleResponse, ServiceListingResponse, UpdateDecoratorStatusRequest,
    UpdateOutcome, UpdateRoleRequest, UserId, UserResponse,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Booking API client.
pub struct DecorClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl DecorClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            http: Client::new(),
        }
    }

    /// Sets the identity token sent as `Authorization: Bearer`.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    // Checkout & payments

    /// Opens a hosted checkout session and returns its payment URL.
    pub async fn create_checkout(
        &self,
        req: &CreateCheckoutRequest,
    ) -> Result<CheckoutResponse, ClientError> {
        self.send(self.request(Method::POST, "/create-checkout-session").json(req))
            .await
    }

    /// Reconciles a checkout session after the customer returns.
    pub async fn confirm_payment(
        &self,
        session_id: &str,
    ) -> Result<PaymentSuccessResponse, ClientError> {
        self.send(
            self.request(Method::PATCH, "/payment-success")
                .query(&[("session_id", session_id)]),
        )
        .await
    }

    /// Lists payment history, optionally for one customer email.
    pub async fn payments(
        &self,
        email: Option<&str>,
    ) -> Result<Vec<PaymentRecordResponse>, ClientError> {
        let mut req = self.request(Method::GET, "/payments");
        if let Some(email) = email {
            req = req.query(&[("email", email)]);
        }
        self.send(req).await
    }

    // Bookings

    pub async fn create_booking(
        &self,
        req: &CreateBookingRequest,
    ) -> Result<BookingResponse, ClientError> {
        self.send(self.request(Method::POST, "/bookings").json(req))
            .await
    }

    pub async fn list_bookings(
        &self,
        email: Option<&str>,
        delivery_status: Option<DeliveryStatus>,
    ) -> Result<Vec<BookingResponse>, ClientError> {
        let mut req = self.request(Method::GET, "/bookings");
        if let Some(email) = email {
            req = req.query(&[("email", email)]);
        }
        if let Some(status) = delivery_status {
            req = req.query(&[("deliveryStatus", status.as_str())]);
        }
        self.send(req).await
    }

    pub async fn get_booking(&self, id: BookingId) -> Result<BookingResponse, ClientError> {
        self.send(self.request(Method::GET, &format!("/bookings/{}", id)))
            .await
    }

    pub async fn delete_booking(&self, id: BookingId) -> Result<DeleteResponse, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/bookings/{}", id)))
            .await
    }

    // Users

    pub async fn register_user(
        &self,
        req: &RegisterUserRequest,
    ) -> Result<RegisterUserResponse, ClientError> {
        self.send(self.request(Method::POST, "/users").json(req))
            .await
    }

    pub async fn user_role(&self, email: &str) -> Result<Role, ClientError> {
        let resp: RoleResponse = self
            .send(self.request(Method::GET, &format!("/users/{}/role", email)))
            .await?;
        Ok(resp.role)
    }

    pub async fn set_user_role(&self, id: UserId, role: Role) -> Result<UpdateOutcome, ClientError> {
        self.send(
            self.request(Method::PATCH, &format!("/users/{}/role", id))
                .json(&UpdateRoleRequest { role }),
        )
        .await
    }

    /// Profile of the token's owner.
    pub async fn profile(&self) -> Result<UserResponse, ClientError> {
        self.send(self.request(Method::GET, "/users/profile")).await
    }

    // Catalog & decorators

    pub async fn services(&self) -> Result<Vec<ServiceListingResponse>, ClientError> {
        self.send(self.request(Method::GET, "/services")).await
    }

    /// All decorators, or only the top rated ones.
    pub async fn decorators(&self, top: bool) -> Result<Vec<DecoratorResponse>, ClientError> {
        let path = if top { "/all-decorators" } else { "/decorators" };
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn apply_decorator(
        &self,
        req: &ApplyDecoratorRequest,
    ) -> Result<DecoratorResponse, ClientError> {
        self.send(self.request(Method::POST, "/decorators").json(req))
            .await
    }

    pub async fn review_decorator(
        &self,
        id: DecoratorId,
        status: DecoratorStatus,
        email: Option<String>,
    ) -> Result<UpdateOutcome, ClientError> {
        self.send(
            self.request(Method::PATCH, &format!("/decorators/{}", id))
                .json(&UpdateDecoratorStatusRequest { status, email }),
        )
        .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if status.is_success() {
            Ok(serde_json::from_str(&body)?)
        } else {
            Err(api_error(status.as_u16(), body))
        }
    }
}

/// Builds an API error, preferring the server's `{"error": ...}` message.
fn api_error(status: u16, body: String) -> ClientError {
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or(body);
    ClientError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_trims_base_url() {
        let client = DecorClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_client_with_token() {
        let client = DecorClient::new("http://localhost:3000").with_token("tok");
        assert_eq!(client.token, Some("tok".to_string()));
    }

    #[test]
    fn test_api_error_prefers_error_field() {
        let err = api_error(403, r#"{"error":"forbidden","code":403}"#.to_string());
        assert!(matches!(
            err,
            ClientError::Api { status: 403, ref message } if message == "forbidden"
        ));
    }

    #[test]
    fn test_api_error_falls_back_to_body() {
        let err = api_error(502, "bad gateway".to_string());
        assert!(matches!(
            err,
            ClientError::Api { status: 502, ref message } if message == "bad gateway"
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        let client = DecorClient::new("http://127.0.0.1:9");
        assert!(matches!(client.health().await, Err(ClientError::Http(_))));
    }

    #[test]
    fn test_payment_success_variants_decode() {
        let incomplete: PaymentSuccessResponse =
            serde_json::from_str(r#"{"success":false,"message":"Payment not completed yet"}"#)
                .unwrap();
        assert!(matches!(incomplete, PaymentSuccessResponse::Incomplete { .. }));

        let existing: PaymentSuccessResponse = serde_json::from_str(
            r#"{"message":"already exists","transactionId":"pi_1","trackingId":"SD-20250101120000-1234"}"#,
        )
        .unwrap();
        assert!(matches!(
            existing,
            PaymentSuccessResponse::AlreadyExists { ref transaction_id, .. } if transaction_id == "pi_1"
        ));
    }
}
