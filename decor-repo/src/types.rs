//! Shared database types with feature-gated fields for SQLite and PostgreSQL.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use decor_types::{
    Booking, BookingId, Currency, Decorator, DecoratorId, DecoratorStatus, DeliveryStatus, Money,
    PaymentRecord, PaymentRecordId, PaymentStatus, RepoError, Role, ServiceId, ServiceListing,
    TrackingId, User, UserId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Feature-gated imports
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(not(feature = "sqlite"))]
use uuid::Uuid;

/// Column type used for ids: native UUID on Postgres, TEXT on SQLite.
#[cfg(not(feature = "sqlite"))]
pub type DbId = Uuid;
#[cfg(feature = "sqlite")]
pub type DbId = String;

/// Column type used for timestamps: TIMESTAMPTZ on Postgres, RFC 3339 TEXT on SQLite.
#[cfg(not(feature = "sqlite"))]
pub type DbTime = DateTime<Utc>;
#[cfg(feature = "sqlite")]
pub type DbTime = String;

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// User row from database.
#[derive(FromRow)]
pub struct DbUser {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: String,
    pub created_at: DbTime,
    pub last_logged_in: DbTime,
    pub updated_at: Option<DbTime>,
}

/// Catalog listing row from database.
#[derive(FromRow)]
pub struct DbService {
    pub id: DbId,
    pub service_name: String,
    pub category: Option<String>,
    pub cost: i64,
    pub currency: String,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: DbTime,
}

/// Booking row from database.
#[derive(FromRow)]
pub struct DbBooking {
    pub id: DbId,
    pub user_email: String,
    pub user_name: Option<String>,
    pub service_id: DbId,
    pub service_name: String,
    pub cost: i64,
    pub currency: String,
    pub event_date: Option<String>,
    pub location: Option<String>,
    pub created_at: DbTime,
    pub payment_status: String,
    pub payment_time: Option<DbTime>,
    pub delivery_status: String,
    pub tracking_id: Option<String>,
}

/// Payment ledger row from database.
#[derive(FromRow)]
pub struct DbPayment {
    pub id: DbId,
    pub amount: i64,
    pub currency: String,
    pub customer_email: Option<String>,
    pub booking_id: DbId,
    pub service_name: String,
    pub transaction_id: String,
    pub payment_status: String,
    pub tracking_id: String,
    pub paid_at: DbTime,
}

/// Decorator row from database.
#[derive(FromRow)]
pub struct DbDecorator {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub specialty: Option<String>,
    pub photo_url: Option<String>,
    pub rating: f64,
    pub status: String,
    pub created_at: DbTime,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn parse_currency(s: &str) -> Result<Currency, RepoError> {
    s.parse()
        .map_err(|_| RepoError::Database(format!("Unknown currency: {}", s)))
}

fn parse_column<T: std::str::FromStr>(s: &str, column: &str) -> Result<T, RepoError> {
    s.parse()
        .map_err(|_| RepoError::Database(format!("Unexpected {} value: {}", column, s)))
}

#[cfg(not(feature = "sqlite"))]
fn decode_id(id: DbId) -> Result<Uuid, RepoError> {
    Ok(id)
}

#[cfg(feature = "sqlite")]
fn decode_id(id: DbId) -> Result<uuid::Uuid, RepoError> {
    uuid::Uuid::parse_str(&id).map_err(|e| RepoError::Database(e.to_string()))
}

#[cfg(not(feature = "sqlite"))]
fn decode_time(t: DbTime) -> Result<DateTime<Utc>, RepoError> {
    Ok(t)
}

#[cfg(feature = "sqlite")]
fn decode_time(t: DbTime) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(&t)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::Database(e.to_string()))
}

fn decode_opt_time(t: Option<DbTime>) -> Result<Option<DateTime<Utc>>, RepoError> {
    t.map(decode_time).transpose()
}

/// Encodes a timestamp the way the SQLite schema stores it.
///
/// Fixed microsecond precision keeps lexical order equal to time order.
#[cfg(feature = "sqlite")]
pub fn encode_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion
// ─────────────────────────────────────────────────────────────────────────────

impl DbUser {
    pub fn into_domain(self) -> Result<User, RepoError> {
        Ok(User {
            id: UserId::from_uuid(decode_id(self.id)?),
            email: self.email,
            name: self.name,
            photo_url: self.photo_url,
            phone: self.phone,
            address: self.address,
            role: parse_column::<Role>(&self.role, "role")?,
            created_at: decode_time(self.created_at)?,
            last_logged_in: decode_time(self.last_logged_in)?,
            updated_at: decode_opt_time(self.updated_at)?,
        })
    }
}

impl DbService {
    pub fn into_domain(self) -> Result<ServiceListing, RepoError> {
        let currency = parse_currency(&self.currency)?;
        Ok(ServiceListing {
            id: ServiceId::from_uuid(decode_id(self.id)?),
            service_name: self.service_name,
            category: self.category,
            cost: Money::new(self.cost, currency).map_err(RepoError::Domain)?,
            unit: self.unit,
            description: self.description,
            image: self.image,
            created_at: decode_time(self.created_at)?,
        })
    }
}

impl DbBooking {
    pub fn into_domain(self) -> Result<Booking, RepoError> {
        let currency = parse_currency(&self.currency)?;
        Ok(Booking {
            id: BookingId::from_uuid(decode_id(self.id)?),
            user_email: self.user_email,
            user_name: self.user_name,
            service_id: ServiceId::from_uuid(decode_id(self.service_id)?),
            service_name: self.service_name,
            cost: Money::new(self.cost, currency).map_err(RepoError::Domain)?,
            event_date: self.event_date,
            location: self.location,
            created_at: decode_time(self.created_at)?,
            payment_status: parse_column::<PaymentStatus>(&self.payment_status, "payment_status")?,
            payment_time: decode_opt_time(self.payment_time)?,
            delivery_status: parse_column::<DeliveryStatus>(
                &self.delivery_status,
                "delivery_status",
            )?,
            tracking_id: self.tracking_id.map(TrackingId::from_string),
        })
    }
}

impl DbPayment {
    pub fn into_domain(self) -> Result<PaymentRecord, RepoError> {
        let currency = parse_currency(&self.currency)?;
        Ok(PaymentRecord {
            id: PaymentRecordId::from_uuid(decode_id(self.id)?),
            amount: Money::new(self.amount, currency).map_err(RepoError::Domain)?,
            customer_email: self.customer_email,
            booking_id: BookingId::from_uuid(decode_id(self.booking_id)?),
            service_name: self.service_name,
            transaction_id: self.transaction_id,
            payment_status: parse_column::<PaymentStatus>(&self.payment_status, "payment_status")?,
            tracking_id: TrackingId::from_string(self.tracking_id),
            paid_at: decode_time(self.paid_at)?,
        })
    }
}

impl DbDecorator {
    pub fn into_domain(self) -> Result<Decorator, RepoError> {
        Ok(Decorator {
            id: DecoratorId::from_uuid(decode_id(self.id)?),
            name: self.name,
            email: self.email,
            specialty: self.specialty,
            photo_url: self.photo_url,
            rating: self.rating,
            status: parse_column::<DecoratorStatus>(&self.status, "status")?,
            created_at: decode_time(self.created_at)?,
        })
    }
}
