//! # Decor Hex
//!
//! Application service layer and HTTP adapter for the decoration booking
//! service.
//!
//! ## Architecture
//!
//! - `service/` - Application service (checkout, reconciliation, bookings, users)
//! - `inbound/` - HTTP adapter (Axum server, auth, rate limiting)
//! - `openapi/` - OpenAPI document served at `/swagger-ui`
//!
//! The service is generic over `R: DecorRepository`, allowing different
//! repository implementations to be injected. The checkout gateway and the
//! identity verifier are injected as trait objects.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::DecorService;
