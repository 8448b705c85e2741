//! Booking Application Service
//!
//! Orchestrates domain operations through the repository and gateway ports.
//! Contains NO infrastructure logic - pure business orchestration.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use decor_types::{
    AppError, ApplyDecoratorRequest, Booking, BookingFilter, BookingId, BookingPaymentUpdate,
    CheckoutGateway, CheckoutResponse, CheckoutSession, CheckoutSessionRequest,
    CreateBookingRequest, CreateCheckoutRequest, CreateServiceRequest, Currency, Decorator,
    DecoratorId, DecoratorStatus, DecorRepository, LedgerWrite, Money, PaymentRecord,
    ProfileChanges, Reconciliation, RegisterUserRequest, Role, ServiceId, ServiceListing,
    TrackingId, UpdateOutcome, UpdateProfileRequest, User, UserId, VerifiedIdentity,
};

/// Number of decorators shown in the "top decorators" listing.
pub const TOP_DECORATORS: i64 = 3;

/// Application service for the booking marketplace.
///
/// Generic over `R: DecorRepository`; the repository adapter is injected at
/// compile time, the checkout gateway at runtime.
pub struct DecorService<R: DecorRepository> {
    repo: R,
    gateway: Arc<dyn CheckoutGateway>,
    /// Front-end origin the gateway redirects back to
    redirect_base: String,
}

impl<R: DecorRepository> DecorService<R> {
    pub fn new(repo: R, gateway: Arc<dyn CheckoutGateway>, redirect_base: impl Into<String>) -> Self {
        Self {
            repo,
            gateway,
            redirect_base: redirect_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Checkout & Reconciliation
    // ─────────────────────────────────────────────────────────────────────────────

    /// Opens a hosted checkout session for a booking. Nothing is stored locally.
    #[instrument(skip(self, req), fields(booking_id = %req.booking_id))]
    pub async fn create_checkout(
        &self,
        req: CreateCheckoutRequest,
    ) -> Result<CheckoutResponse, AppError> {
        let unit_amount = Money::from_major(req.cost, Currency::USD)?;
        if unit_amount.is_zero() {
            return Err(AppError::BadRequest("Cost must be positive".into()));
        }
        if req.user_email.trim().is_empty() || req.service_name.trim().is_empty() {
            return Err(AppError::BadRequest(
                "userEmail and serviceName are required".into(),
            ));
        }

        let session = self
            .gateway
            .create_session(CheckoutSessionRequest {
                booking_id: req.booking_id,
                service_name: req.service_name,
                unit_amount,
                customer_email: req.user_email,
                success_url: format!(
                    "{}/dashboard/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
                    self.redirect_base
                ),
                cancel_url: format!("{}/dashboard/payment-cancelled", self.redirect_base),
            })
            .await?;

        let url = session
            .url
            .ok_or_else(|| AppError::Upstream("Checkout session has no payment URL".into()))?;

        Ok(CheckoutResponse { url })
    }

    /// Applies the gateway's view of a checkout session to local records.
    ///
    /// Safe to call any number of times for the same session: at most one
    /// ledger entry is ever written per gateway transaction.
    #[instrument(skip(self))]
    pub async fn reconcile_payment(&self, session_id: &str) -> Result<Reconciliation, AppError> {
        if session_id.trim().is_empty() {
            return Err(AppError::BadRequest("session_id is required".into()));
        }

        let session = self.gateway.retrieve_session(session_id).await?;

        if let Some(transaction_id) = session.payment_intent.as_deref() {
            if let Some(existing) = self.repo.find_payment_by_transaction(transaction_id).await? {
                return Ok(Reconciliation::AlreadyReconciled {
                    transaction_id: existing.transaction_id,
                    tracking_id: existing.tracking_id,
                });
            }
        }

        if !session.is_paid() {
            return Ok(Reconciliation::Incomplete);
        }

        let (record, update) = Self::ledger_entry(&session)?;
        let transaction_id = record.transaction_id.clone();
        let tracking_id = record.tracking_id.clone();
        let booking_id = update.booking_id;

        match self.repo.record_payment(record, update).await? {
            LedgerWrite::Duplicate(existing) => {
                info!(%transaction_id, "Payment reconciled concurrently, keeping first entry");
                Ok(Reconciliation::AlreadyReconciled {
                    transaction_id: existing.transaction_id,
                    tracking_id: existing.tracking_id,
                })
            }
            LedgerWrite::Recorded { booking, ledger } => {
                if booking.matched_nothing() {
                    warn!(
                        %booking_id,
                        %transaction_id,
                        "Booking missing or already paid, left unchanged"
                    );
                }
                info!(%booking_id, %transaction_id, %tracking_id, "Payment reconciled");
                Ok(Reconciliation::Reconciled {
                    booking_update: booking,
                    ledger_insert: ledger,
                    tracking_id,
                    transaction_id,
                })
            }
        }
    }

    /// Builds the ledger entry and booking update for a paid session.
    fn ledger_entry(
        session: &CheckoutSession,
    ) -> Result<(PaymentRecord, BookingPaymentUpdate), AppError> {
        let transaction_id = session
            .payment_intent
            .clone()
            .ok_or_else(|| AppError::Upstream("Paid session carries no payment intent".into()))?;

        let booking_id: BookingId = session
            .booking_ref()
            .ok_or_else(|| AppError::Upstream("Session metadata has no booking id".into()))?
            .parse()
            .map_err(|_| AppError::Upstream("Session metadata has a malformed booking id".into()))?;

        let currency: Currency = session
            .currency
            .as_deref()
            .unwrap_or("usd")
            .parse()
            .map_err(|e| AppError::Upstream(format!("Session currency: {}", e)))?;
        let amount_total = session
            .amount_total
            .ok_or_else(|| AppError::Upstream("Paid session has no amount".into()))?;
        let amount = Money::new(amount_total, currency)
            .map_err(|e| AppError::Upstream(format!("Session amount: {}", e)))?;

        let paid_at = Utc::now();
        let tracking_id = TrackingId::generate();

        let record = PaymentRecord::paid(
            amount,
            session.customer_email.clone(),
            booking_id,
            session.service_name().unwrap_or_default().to_string(),
            transaction_id,
            tracking_id.clone(),
            paid_at,
        );
        let update = BookingPaymentUpdate::new(booking_id, paid_at, tracking_id);

        Ok((record, update))
    }

    /// Lists ledger entries, optionally for one customer.
    ///
    /// A customer filter must name the caller's own verified email.
    #[instrument(skip(self, caller), fields(caller = %caller.email))]
    pub async fn list_payments(
        &self,
        caller: &VerifiedIdentity,
        email: Option<&str>,
    ) -> Result<Vec<PaymentRecord>, AppError> {
        if let Some(email) = email {
            if email != caller.email {
                return Err(AppError::Forbidden("forbidden".into()));
            }
        }

        self.repo.list_payments(email).await.map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Bookings
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn create_booking(&self, req: CreateBookingRequest) -> Result<Booking, AppError> {
        let cost = Money::from_major(req.cost, Currency::USD)?;
        let booking = Booking::new(
            req.user_email,
            req.user_name,
            req.service_id,
            req.service_name,
            cost,
            req.event_date,
            req.location,
        )?;

        self.repo.insert_booking(booking).await.map_err(Into::into)
    }

    pub async fn get_booking(&self, id: BookingId) -> Result<Booking, AppError> {
        self.repo
            .get_booking(id)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Booking {}", id))))
    }

    pub async fn list_bookings(&self, filter: BookingFilter) -> Result<Vec<Booking>, AppError> {
        self.repo.list_bookings(filter).await.map_err(Into::into)
    }

    pub async fn delete_booking(&self, id: BookingId) -> Result<u64, AppError> {
        self.repo.delete_booking(id).await.map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────────

    /// Registers a user on first sign-in, or records a fresh login.
    ///
    /// Returns the stored user and whether it was newly created.
    pub async fn register_user(&self, req: RegisterUserRequest) -> Result<(User, bool), AppError> {
        if let Some(mut existing) = self.repo.find_user_by_email(&req.email).await? {
            let now = Utc::now();
            self.repo.touch_last_login(&req.email, now).await?;
            existing.last_logged_in = now;
            return Ok((existing, false));
        }

        let user = User::register(req.email, req.name, req.photo_url)?;
        let user = self.repo.insert_user(user).await?;
        info!(email = %user.email, "User registered");
        Ok((user, true))
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.repo.list_users().await.map_err(Into::into)
    }

    /// Role of the account with this email; unknown accounts are plain users.
    pub async fn role_of(&self, email: &str) -> Result<Role, AppError> {
        Ok(self
            .repo
            .find_user_by_email(email)
            .await?
            .map(|u| u.role)
            .unwrap_or_default())
    }

    pub async fn is_admin(&self, email: &str) -> Result<bool, AppError> {
        Ok(self
            .repo
            .find_user_by_email(email)
            .await?
            .is_some_and(|u| u.is_admin()))
    }

    pub async fn profile(&self, caller: &VerifiedIdentity) -> Result<User, AppError> {
        self.repo
            .find_user_by_email(&caller.email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    pub async fn update_profile(
        &self,
        caller: &VerifiedIdentity,
        req: UpdateProfileRequest,
    ) -> Result<UpdateOutcome, AppError> {
        let changes = ProfileChanges {
            name: req.name,
            phone: req.phone,
            address: req.address,
        };
        self.repo
            .update_profile(&caller.email, changes, Utc::now())
            .await
            .map_err(Into::into)
    }

    pub async fn set_role(&self, id: UserId, role: Role) -> Result<UpdateOutcome, AppError> {
        self.repo.set_role(id, role).await.map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn list_services(&self) -> Result<Vec<ServiceListing>, AppError> {
        self.repo.list_services().await.map_err(Into::into)
    }

    pub async fn get_service(&self, id: ServiceId) -> Result<ServiceListing, AppError> {
        self.repo
            .get_service(id)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Service {}", id))))
    }

    pub async fn create_service(
        &self,
        req: CreateServiceRequest,
    ) -> Result<ServiceListing, AppError> {
        let cost = Money::from_major(req.cost, Currency::USD)?;
        let listing = ServiceListing::new(
            req.service_name,
            req.category,
            cost,
            req.unit,
            req.description,
            req.image,
        )?;
        self.repo.insert_service(listing).await.map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Decorators
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn apply_decorator(&self, req: ApplyDecoratorRequest) -> Result<Decorator, AppError> {
        let decorator =
            Decorator::apply(req.name, req.email, req.specialty, req.photo_url, req.rating)?;
        self.repo
            .insert_decorator(decorator)
            .await
            .map_err(Into::into)
    }

    /// Decorators by rating, best first. `limit` caps the result.
    pub async fn list_decorators(&self, limit: Option<i64>) -> Result<Vec<Decorator>, AppError> {
        self.repo.list_decorators(limit).await.map_err(Into::into)
    }

    /// Records an admin's decision on an application.
    ///
    /// When `applicant_email` is given and the decision grants a role, the
    /// applicant's user account is promoted as well.
    #[instrument(skip(self))]
    pub async fn review_decorator(
        &self,
        id: DecoratorId,
        status: DecoratorStatus,
        applicant_email: Option<&str>,
    ) -> Result<UpdateOutcome, AppError> {
        let outcome = self.repo.set_decorator_status(id, status).await?;

        if let (Some(email), Some(role)) = (applicant_email, status.granted_role()) {
            let promoted = self.repo.set_role_by_email(email, role).await?;
            if promoted.matched_nothing() {
                warn!(%email, "Approved decorator has no user account");
            }
        }

        Ok(outcome)
    }
}
