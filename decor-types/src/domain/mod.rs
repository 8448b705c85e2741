//! Domain models for the booking service.

#[macro_use]
mod id;

pub mod booking;
pub mod decorator;
pub mod listing;
pub mod money;
pub mod outcome;
pub mod payment;
pub mod tracking;
pub mod user;

pub use booking::{Booking, BookingFilter, BookingId, BookingPaymentUpdate, DeliveryStatus};
pub use decorator::{Decorator, DecoratorId, DecoratorStatus};
pub use listing::{ServiceId, ServiceListing};
pub use money::{Currency, Money};
pub use outcome::{InsertOutcome, UpdateOutcome};
pub use payment::{LedgerWrite, PaymentRecord, PaymentRecordId, PaymentStatus, Reconciliation};
pub use tracking::TrackingId;
pub use user::{ProfileChanges, Role, User, UserId};
