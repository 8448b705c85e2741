//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use decor_types::{
    AppError, ApplyDecoratorRequest, BookingFilter, BookingId, BookingResponse, BookingsQuery,
    CreateBookingRequest, CreateCheckoutRequest, CreateServiceRequest, DecorRepository,
    DecoratorId, DecoratorResponse, DeleteResponse, IdentityVerifier, PaymentRecordResponse,
    PaymentSuccessQuery, PaymentSuccessResponse, PaymentsQuery, RegisterUserRequest,
    RegisterUserResponse, RoleResponse, ServiceId, ServiceListingResponse,
    UpdateDecoratorStatusRequest, UpdateProfileRequest, UpdateProfileResponse, UpdateRoleRequest,
    UserId, UserResponse, VerifiedIdentity,
};

use crate::DecorService;
use crate::service::TOP_DECORATORS;

/// Application state shared across handlers.
pub struct AppState<R: DecorRepository> {
    pub service: DecorService<R>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Upstream(msg) => {
                tracing::error!(error = %msg, "Upstream call failed");
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError(AppError::BadRequest(format!("Invalid {} ID", what))))
}

/// Root banner.
pub async fn root() -> &'static str {
    "style decor is running!"
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Checkout & payments
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, req), fields(booking_id = %req.booking_id))]
pub async fn create_checkout_session<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateCheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let resp = state.service.create_checkout(req).await?;
    Ok(Json(resp))
}

/// Reconciles a returning checkout session. Idempotent.
#[tracing::instrument(skip(state, query), fields(session_id = %query.session_id))]
pub async fn payment_success<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<PaymentSuccessQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.service.reconcile_payment(&query.session_id).await?;
    Ok(Json(PaymentSuccessResponse::from(outcome)))
}

#[tracing::instrument(skip(state, identity, query), fields(caller = %identity.email))]
pub async fn list_payments<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(identity): Extension<VerifiedIdentity>,
    Query(query): Query<PaymentsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = state
        .service
        .list_payments(&identity, query.email.as_deref())
        .await?;
    let resp: Vec<PaymentRecordResponse> = payments.into_iter().map(Into::into).collect();
    Ok(Json(resp))
}

// ─────────────────────────────────────────────────────────────────────────────
// Bookings
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, req), fields(user = %req.user_email))]
pub async fn create_booking<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state.service.create_booking(req).await?;
    Ok((StatusCode::CREATED, Json(BookingResponse::from(booking))))
}

#[tracing::instrument(skip(state))]
pub async fn list_bookings<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<BookingsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = BookingFilter {
        user_email: query.email,
        delivery_status: query.delivery_status,
    };
    let bookings = state.service.list_bookings(filter).await?;
    let resp: Vec<BookingResponse> = bookings.into_iter().map(Into::into).collect();
    Ok(Json(resp))
}

#[tracing::instrument(skip(state), fields(booking_id = %id))]
pub async fn get_booking<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let booking_id: BookingId = parse_id(&id, "booking")?;
    let booking = state.service.get_booking(booking_id).await?;
    Ok(Json(BookingResponse::from(booking)))
}

#[tracing::instrument(skip(state), fields(booking_id = %id))]
pub async fn delete_booking<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let booking_id: BookingId = parse_id(&id, "booking")?;
    let deleted_count = state.service.delete_booking(booking_id).await?;
    Ok(Json(DeleteResponse {
        acknowledged: true,
        deleted_count,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn list_users<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.service.list_users().await?;
    let resp: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    Ok(Json(resp))
}

#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn register_user<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, created) = state.service.register_user(req).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(RegisterUserResponse {
            created,
            user: user.into(),
        }),
    ))
}

/// Role lookup by email. Unknown accounts report the default role.
#[tracing::instrument(skip(state))]
pub async fn get_user_role<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let role = state.service.role_of(&email).await?;
    Ok(Json(RoleResponse { role }))
}

#[tracing::instrument(skip(state, identity), fields(caller = %identity.email))]
pub async fn get_profile<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(identity): Extension<VerifiedIdentity>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.service.profile(&identity).await?;
    Ok(Json(UserResponse::from(user)))
}

#[tracing::instrument(skip(state, identity, req), fields(caller = %identity.email))]
pub async fn update_profile<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(identity): Extension<VerifiedIdentity>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.service.update_profile(&identity, req).await?;
    let message = if result.matched_nothing() {
        "User not found"
    } else {
        "Profile updated"
    };
    Ok(Json(UpdateProfileResponse {
        success: !result.matched_nothing(),
        message: message.to_string(),
        result,
    }))
}

#[tracing::instrument(skip(state, req), fields(user_id = %id, role = %req.role))]
pub async fn set_user_role<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id: UserId = parse_id(&id, "user")?;
    let outcome = state.service.set_role(user_id, req.role).await?;
    Ok(Json(outcome))
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn list_services<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let services = state.service.list_services().await?;
    let resp: Vec<ServiceListingResponse> = services.into_iter().map(Into::into).collect();
    Ok(Json(resp))
}

#[tracing::instrument(skip(state), fields(service_id = %id))]
pub async fn get_service<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let service_id: ServiceId = parse_id(&id, "service")?;
    let listing = state.service.get_service(service_id).await?;
    Ok(Json(ServiceListingResponse::from(listing)))
}

#[tracing::instrument(skip(state, req), fields(name = %req.service_name))]
pub async fn create_service<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateServiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = state.service.create_service(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ServiceListingResponse::from(listing)),
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Decorators
// ─────────────────────────────────────────────────────────────────────────────

/// Top-rated decorators for the landing page.
#[tracing::instrument(skip(state))]
pub async fn top_decorators<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let decorators = state.service.list_decorators(Some(TOP_DECORATORS)).await?;
    let resp: Vec<DecoratorResponse> = decorators.into_iter().map(Into::into).collect();
    Ok(Json(resp))
}

#[tracing::instrument(skip(state))]
pub async fn list_decorators<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let decorators = state.service.list_decorators(None).await?;
    let resp: Vec<DecoratorResponse> = decorators.into_iter().map(Into::into).collect();
    Ok(Json(resp))
}

#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn apply_decorator<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<ApplyDecoratorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let decorator = state.service.apply_decorator(req).await?;
    Ok((StatusCode::CREATED, Json(DecoratorResponse::from(decorator))))
}

#[tracing::instrument(skip(state, req), fields(decorator_id = %id, status = %req.status))]
pub async fn review_decorator<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateDecoratorStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let decorator_id: DecoratorId = parse_id(&id, "decorator")?;
    let outcome = state
        .service
        .review_decorator(decorator_id, req.status, req.email.as_deref())
        .await?;
    Ok(Json(outcome))
}
