//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod gateway;
mod identity;
mod repository;

pub use gateway::{
    CheckoutGateway, CheckoutSession, CheckoutSessionRequest, GatewayError, METADATA_BOOKING_ID,
    METADATA_SERVICE_NAME, SESSION_PAID,
};
pub use identity::{IdentityError, IdentityVerifier, VerifiedIdentity};
pub use repository::{
    BookingRepository, DecorRepository, DecoratorRepository, PaymentLedger, ServiceCatalog,
    UserRepository,
};
