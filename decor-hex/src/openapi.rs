//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use decor_types::domain::{
    BookingId, Currency, DecoratorId, DecoratorStatus, DeliveryStatus, InsertOutcome,
    PaymentStatus, Role, ServiceId, TrackingId, UpdateOutcome, UserId,
};
use decor_types::dto::{
    ApplyDecoratorRequest, BookingResponse, BookingsQuery, CheckoutResponse, CreateBookingRequest,
    CreateCheckoutRequest, CreateServiceRequest, DecoratorResponse, DeleteResponse,
    PaymentRecordResponse, PaymentSuccessQuery, PaymentSuccessResponse, PaymentsQuery,
    RegisterUserRequest, RegisterUserResponse, RoleResponse, ServiceListingResponse,
    UpdateDecoratorStatusRequest, UpdateProfileRequest, UpdateProfileResponse, UpdateRoleRequest,
    UserResponse,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Open a hosted checkout session for a booking
#[utoipa::path(
    post,
    path = "/create-checkout-session",
    tag = "payments",
    request_body = CreateCheckoutRequest,
    responses(
        (status = 200, description = "Hosted payment page URL", body = CheckoutResponse),
        (status = 400, description = "Invalid cost or missing fields"),
        (status = 502, description = "Payment gateway failure")
    )
)]
async fn create_checkout_session() {}

/// Reconcile a returning checkout session (idempotent)
#[utoipa::path(
    patch,
    path = "/payment-success",
    tag = "payments",
    params(PaymentSuccessQuery),
    responses(
        (status = 200, description = "Reconciled, already recorded, or not yet paid", body = PaymentSuccessResponse),
        (status = 400, description = "Missing session id"),
        (status = 502, description = "Payment gateway failure or malformed session")
    )
)]
async fn payment_success() {}

/// Payment history, newest first
#[utoipa::path(
    get,
    path = "/payments",
    tag = "payments",
    params(PaymentsQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Ledger entries", body = Vec<PaymentRecordResponse>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Email filter is not the caller's")
    )
)]
async fn list_payments() {}

/// Create a booking
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingResponse),
        (status = 400, description = "Invalid request")
    )
)]
async fn create_booking() {}

/// List bookings
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    params(BookingsQuery),
    responses(
        (status = 200, description = "Bookings, newest first", body = Vec<BookingResponse>)
    )
)]
async fn list_bookings() {}

/// Get a booking by ID
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("id" = String, Path, description = "Booking ID (UUID)")
    ),
    responses(
        (status = 200, description = "Booking found", body = BookingResponse),
        (status = 404, description = "Booking not found")
    )
)]
async fn get_booking() {}

/// Delete a booking
#[utoipa::path(
    delete,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("id" = String, Path, description = "Booking ID (UUID)")
    ),
    responses(
        (status = 200, description = "Deletion result", body = DeleteResponse)
    )
)]
async fn delete_booking() {}

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "All users, newest first", body = Vec<UserResponse>)
    )
)]
async fn list_users() {}

/// Register a user on sign-in
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User created", body = RegisterUserResponse),
        (status = 200, description = "Existing user, last login updated", body = RegisterUserResponse)
    )
)]
async fn register_user() {}

/// Role of a user by email
#[utoipa::path(
    get,
    path = "/users/{user}/role",
    tag = "users",
    params(
        ("user" = String, Path, description = "User email")
    ),
    responses(
        (status = 200, description = "Stored role, `user` if unknown", body = RoleResponse)
    )
)]
async fn get_user_role() {}

/// Change a user's role (admin)
#[utoipa::path(
    patch,
    path = "/users/{user}/role",
    tag = "users",
    request_body = UpdateRoleRequest,
    security(("bearer_auth" = [])),
    params(
        ("user" = String, Path, description = "User ID (UUID)")
    ),
    responses(
        (status = 200, description = "Update result", body = UpdateOutcome),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an admin")
    )
)]
async fn set_user_role() {}

/// Caller's own profile
#[utoipa::path(
    get,
    path = "/users/profile",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    )
)]
async fn get_profile() {}

/// Update the caller's profile
#[utoipa::path(
    patch,
    path = "/users/profile",
    tag = "users",
    request_body = UpdateProfileRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Update result", body = UpdateProfileResponse),
        (status = 401, description = "Unauthorized")
    )
)]
async fn update_profile() {}

/// Service catalog
#[utoipa::path(
    get,
    path = "/services",
    tag = "services",
    responses(
        (status = 200, description = "All listings", body = Vec<ServiceListingResponse>)
    )
)]
async fn list_services() {}

/// Get a service listing
#[utoipa::path(
    get,
    path = "/services/{id}",
    tag = "services",
    params(
        ("id" = String, Path, description = "Service ID (UUID)")
    ),
    responses(
        (status = 200, description = "Listing found", body = ServiceListingResponse),
        (status = 404, description = "Listing not found")
    )
)]
async fn get_service() {}

/// Add a service listing (admin)
#[utoipa::path(
    post,
    path = "/services",
    tag = "services",
    request_body = CreateServiceRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Listing created", body = ServiceListingResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an admin")
    )
)]
async fn create_service() {}

/// Top three decorators by rating
#[utoipa::path(
    get,
    path = "/all-decorators",
    tag = "decorators",
    responses(
        (status = 200, description = "Best rated decorators", body = Vec<DecoratorResponse>)
    )
)]
async fn top_decorators() {}

/// All decorators by rating
#[utoipa::path(
    get,
    path = "/decorators",
    tag = "decorators",
    responses(
        (status = 200, description = "Decorators, best rated first", body = Vec<DecoratorResponse>)
    )
)]
async fn list_decorators() {}

/// Apply as a decorator
#[utoipa::path(
    post,
    path = "/decorators",
    tag = "decorators",
    request_body = ApplyDecoratorRequest,
    responses(
        (status = 201, description = "Application filed", body = DecoratorResponse),
        (status = 400, description = "Invalid request")
    )
)]
async fn apply_decorator() {}

/// Review a decorator application (admin)
#[utoipa::path(
    patch,
    path = "/decorators/{id}",
    tag = "decorators",
    request_body = UpdateDecoratorStatusRequest,
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Decorator ID (UUID)")
    ),
    responses(
        (status = 200, description = "Update result", body = UpdateOutcome),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an admin")
    )
)]
async fn review_decorator() {}

/// OpenAPI documentation for the booking API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Style Decor Booking API",
        version = "1.0.0",
        description = "Booking backend for a home and event decoration marketplace.\n\n## Authentication\n\nPayment history, profile, and admin endpoints require an identity-provider token in the `Authorization` header:\n\n```\nAuthorization: Bearer <id token>\n```",
        license(name = "MIT"),
    ),
    paths(
        health,
        create_checkout_session,
        payment_success,
        list_payments,
        create_booking,
        list_bookings,
        get_booking,
        delete_booking,
        list_users,
        register_user,
        get_user_role,
        set_user_role,
        get_profile,
        update_profile,
        list_services,
        get_service,
        create_service,
        top_decorators,
        list_decorators,
        apply_decorator,
        review_decorator,
    ),
    components(
        schemas(
            CreateCheckoutRequest,
            CheckoutResponse,
            PaymentSuccessResponse,
            PaymentRecordResponse,
            CreateBookingRequest,
            BookingResponse,
            DeleteResponse,
            RegisterUserRequest,
            RegisterUserResponse,
            UserResponse,
            RoleResponse,
            UpdateProfileRequest,
            UpdateProfileResponse,
            UpdateRoleRequest,
            CreateServiceRequest,
            ServiceListingResponse,
            ApplyDecoratorRequest,
            UpdateDecoratorStatusRequest,
            DecoratorResponse,
            UpdateOutcome,
            InsertOutcome,
            Currency,
            PaymentStatus,
            DeliveryStatus,
            DecoratorStatus,
            Role,
            TrackingId,
            BookingId,
            ServiceId,
            UserId,
            DecoratorId,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "payments", description = "Checkout, reconciliation, and payment history"),
        (name = "bookings", description = "Service bookings"),
        (name = "users", description = "Accounts, profiles, and roles"),
        (name = "services", description = "Decoration service catalog"),
        (name = "decorators", description = "Decorator applications and listings"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for Bearer token authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_core_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/create-checkout-session", "/payment-success", "/payments"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_document_declares_bearer_auth() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
