//! Repository port traits.
//!
//! One trait per collection. Adapters (Postgres, SQLite, in-memory mocks)
//! implement all of them; the application layer asks for `DecorRepository`.

use chrono::{DateTime, Utc};

use crate::domain::{
    Booking, BookingFilter, BookingId, BookingPaymentUpdate, Decorator, DecoratorId,
    DecoratorStatus, LedgerWrite, PaymentRecord, ProfileChanges, Role, ServiceId,
    ServiceListing, UpdateOutcome, User, UserId,
};
use crate::error::RepoError;

/// Bookings collection.
#[async_trait::async_trait]
pub trait BookingRepository: Send + Sync + 'static {
    /// Stores a new booking.
    async fn insert_booking(&self, booking: Booking) -> Result<Booking, RepoError>;

    /// Gets a booking by ID.
    async fn get_booking(&self, id: BookingId) -> Result<Option<Booking>, RepoError>;

    /// Lists bookings matching the filter, newest first.
    async fn list_bookings(&self, filter: BookingFilter) -> Result<Vec<Booking>, RepoError>;

    /// Deletes a booking. Returns the number of removed records.
    async fn delete_booking(&self, id: BookingId) -> Result<u64, RepoError>;
}

/// Append-only payment ledger.
///
/// `record_payment` MUST be atomic: the ledger insert and the booking update
/// commit together or not at all, and at most one entry may exist per
/// transaction id.
#[async_trait::async_trait]
pub trait PaymentLedger: Send + Sync + 'static {
    /// Finds a ledger entry by its gateway transaction id.
    async fn find_payment_by_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentRecord>, RepoError>;

    /// Inserts a ledger entry and applies the booking payment update.
    ///
    /// If an entry for `record.transaction_id` already exists nothing is
    /// written and the existing entry is returned as `LedgerWrite::Duplicate`.
    async fn record_payment(
        &self,
        record: PaymentRecord,
        update: BookingPaymentUpdate,
    ) -> Result<LedgerWrite, RepoError>;

    /// Lists ledger entries, optionally for one customer, newest first.
    async fn list_payments(
        &self,
        customer_email: Option<&str>,
    ) -> Result<Vec<PaymentRecord>, RepoError>;
}

/// Users collection.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync + 'static {
    async fn insert_user(&self, user: User) -> Result<User, RepoError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Lists all users, newest first.
    async fn list_users(&self) -> Result<Vec<User>, RepoError>;

    async fn touch_last_login(
        &self,
        email: &str,
        at: DateTime<Utc>,
    ) -> Result<UpdateOutcome, RepoError>;

    async fn update_profile(
        &self,
        email: &str,
        changes: ProfileChanges,
        at: DateTime<Utc>,
    ) -> Result<UpdateOutcome, RepoError>;

    async fn set_role(&self, id: UserId, role: Role) -> Result<UpdateOutcome, RepoError>;

    async fn set_role_by_email(&self, email: &str, role: Role)
    -> Result<UpdateOutcome, RepoError>;
}

/// Decorators collection.
#[async_trait::async_trait]
pub trait DecoratorRepository: Send + Sync + 'static {
    async fn insert_decorator(&self, decorator: Decorator) -> Result<Decorator, RepoError>;

    /// Lists decorators by rating, best first, optionally capped.
    async fn list_decorators(&self, limit: Option<i64>) -> Result<Vec<Decorator>, RepoError>;

    async fn set_decorator_status(
        &self,
        id: DecoratorId,
        status: DecoratorStatus,
    ) -> Result<UpdateOutcome, RepoError>;
}

/// Decoration service catalog.
#[async_trait::async_trait]
pub trait ServiceCatalog: Send + Sync + 'static {
    async fn insert_service(&self, listing: ServiceListing) -> Result<ServiceListing, RepoError>;

    async fn get_service(&self, id: ServiceId) -> Result<Option<ServiceListing>, RepoError>;

    async fn list_services(&self) -> Result<Vec<ServiceListing>, RepoError>;
}

/// Every collection the booking service touches.
pub trait DecorRepository:
    BookingRepository + PaymentLedger + UserRepository + DecoratorRepository + ServiceCatalog
{
}

impl<T> DecorRepository for T where
    T: BookingRepository + PaymentLedger + UserRepository + DecoratorRepository + ServiceCatalog
{
}
