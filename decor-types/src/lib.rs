//! # Decor Types
//!
//! Domain types and port traits for the decoration booking service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Money, Booking, PaymentRecord, User, ...)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Booking, BookingFilter, BookingId, BookingPaymentUpdate, Currency, Decorator, DecoratorId,
    DecoratorStatus, DeliveryStatus, InsertOutcome, LedgerWrite, Money, PaymentRecord,
    PaymentRecordId, PaymentStatus, ProfileChanges, Reconciliation, Role, ServiceId,
    ServiceListing, TrackingId, UpdateOutcome, User, UserId,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::{
    BookingRepository, CheckoutGateway, CheckoutSession, CheckoutSessionRequest,
    DecorRepository, DecoratorRepository, GatewayError, IdentityError, IdentityVerifier,
    PaymentLedger, ServiceCatalog, UserRepository, VerifiedIdentity,
};
