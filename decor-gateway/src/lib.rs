//! # Decor Gateway
//!
//! Outbound adapters for the two external collaborators of the booking
//! service:
//!
//! - [`StripeGateway`] opens and reads hosted checkout sessions over the
//!   Stripe REST API (`CheckoutGateway` port).
//! - [`FirebaseVerifier`] and [`SharedSecretVerifier`] turn bearer tokens into
//!   verified emails (`IdentityVerifier` port).

pub mod identity;
pub mod stripe;

pub use identity::{FirebaseVerifier, SharedSecretVerifier};
pub use stripe::StripeGateway;
