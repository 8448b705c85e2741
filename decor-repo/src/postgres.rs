//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use decor_types::{
    Booking, BookingFilter, BookingId, BookingPaymentUpdate, BookingRepository, Decorator,
    DecoratorId, DecoratorRepository, DecoratorStatus, InsertOutcome, LedgerWrite, PaymentLedger,
    PaymentRecord, PaymentStatus, ProfileChanges, RepoError, Role, ServiceCatalog, ServiceId,
    ServiceListing, UpdateOutcome, User, UserId, UserRepository,
};

use crate::types::{DbBooking, DbDecorator, DbPayment, DbService, DbUser};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository.
#[derive(Clone)]
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_tables_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Closes the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn db_err(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Bookings
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl BookingRepository for PostgresRepo {
    async fn insert_booking(&self, booking: Booking) -> Result<Booking, RepoError> {
        sqlx::query(
            r#"INSERT INTO bookings (id, user_email, user_name, service_id, service_name, cost, currency,
                                     event_date, location, created_at, payment_status, payment_time,
                                     delivery_status, tracking_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"#,
        )
        .bind(booking.id.into_uuid())
        .bind(&booking.user_email)
        .bind(&booking.user_name)
        .bind(booking.service_id.into_uuid())
        .bind(&booking.service_name)
        .bind(booking.cost.amount())
        .bind(booking.cost.currency().code())
        .bind(&booking.event_date)
        .bind(&booking.location)
        .bind(booking.created_at)
        .bind(booking.payment_status.as_str())
        .bind(booking.payment_time)
        .bind(booking.delivery_status.as_str())
        .bind(booking.tracking_id.as_ref().map(|t| t.as_str().to_string()))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(booking)
    }

    async fn get_booking(&self, id: BookingId) -> Result<Option<Booking>, RepoError> {
        let row: Option<DbBooking> = sqlx::query_as(
            r#"SELECT id, user_email, user_name, service_id, service_name, cost, currency, event_date,
                      location, created_at, payment_status, payment_time, delivery_status, tracking_id
               FROM bookings WHERE id = $1"#,
        )
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(DbBooking::into_domain).transpose()
    }

    async fn list_bookings(&self, filter: BookingFilter) -> Result<Vec<Booking>, RepoError> {
        let delivery = filter.delivery_status.map(|s| s.as_str());

        let rows: Vec<DbBooking> = sqlx::query_as(
            r#"SELECT id, user_email, user_name, service_id, service_name, cost, currency, event_date,
                      location, created_at, payment_status, payment_time, delivery_status, tracking_id
               FROM bookings
               WHERE ($1::TEXT IS NULL OR user_email = $1)
                 AND ($2::TEXT IS NULL OR delivery_status = $2)
               ORDER BY created_at DESC"#,
        )
        .bind(&filter.user_email)
        .bind(delivery)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbBooking::into_domain).collect()
    }

    async fn delete_booking(&self, id: BookingId) -> Result<u64, RepoError> {
        let result = sqlx::query(r#"DELETE FROM bookings WHERE id = $1"#)
            .bind(id.into_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment ledger
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentLedger for PostgresRepo {
    async fn find_payment_by_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentRecord>, RepoError> {
        let row: Option<DbPayment> = sqlx::query_as(
            r#"SELECT id, amount, currency, customer_email, booking_id, service_name, transaction_id,
                      payment_status, tracking_id, paid_at
               FROM payments WHERE transaction_id = $1"#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(DbPayment::into_domain).transpose()
    }

    async fn record_payment(
        &self,
        record: PaymentRecord,
        update: BookingPaymentUpdate,
    ) -> Result<LedgerWrite, RepoError> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        // A concurrent writer holding the same transaction id blocks here
        // until it commits, then the insert becomes a no-op.
        let inserted = sqlx::query(
            r#"INSERT INTO payments (id, amount, currency, customer_email, booking_id, service_name,
                                     transaction_id, payment_status, tracking_id, paid_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               ON CONFLICT (transaction_id) DO NOTHING"#,
        )
        .bind(record.id.into_uuid())
        .bind(record.amount.amount())
        .bind(record.amount.currency().code())
        .bind(&record.customer_email)
        .bind(record.booking_id.into_uuid())
        .bind(&record.service_name)
        .bind(&record.transaction_id)
        .bind(record.payment_status.as_str())
        .bind(record.tracking_id.as_str())
        .bind(record.paid_at)
        .execute(&mut *db_tx)
        .await
        .map_err(db_err)?;

        if inserted.rows_affected() == 0 {
            db_tx
                .rollback()
                .await
                .map_err(|e| RepoError::Transaction(e.to_string()))?;

            let existing = self
                .find_payment_by_transaction(&record.transaction_id)
                .await?
                .ok_or_else(|| RepoError::Conflict(record.transaction_id.clone()))?;
            tracing::debug!(
                transaction_id = %record.transaction_id,
                "Ledger entry already exists, nothing written"
            );
            return Ok(LedgerWrite::Duplicate(existing));
        }

        let updated = sqlx::query(
            r#"UPDATE bookings
               SET payment_status = $1, payment_time = $2, delivery_status = $3, tracking_id = $4
               WHERE id = $5 AND tracking_id IS NULL"#,
        )
        .bind(PaymentStatus::Paid.as_str())
        .bind(update.paid_at)
        .bind(update.delivery_status().as_str())
        .bind(update.tracking_id.as_str())
        .bind(update.booking_id.into_uuid())
        .execute(&mut *db_tx)
        .await
        .map_err(db_err)?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(LedgerWrite::Recorded {
            booking: UpdateOutcome::from_rows(updated.rows_affected()),
            ledger: InsertOutcome::inserted(record.id.into_uuid()),
        })
    }

    async fn list_payments(
        &self,
        customer_email: Option<&str>,
    ) -> Result<Vec<PaymentRecord>, RepoError> {
        let rows: Vec<DbPayment> = sqlx::query_as(
            r#"SELECT id, amount, currency, customer_email, booking_id, service_name, transaction_id,
                      payment_status, tracking_id, paid_at
               FROM payments
               WHERE ($1::TEXT IS NULL OR customer_email = $1)
               ORDER BY paid_at DESC"#,
        )
        .bind(customer_email)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbPayment::into_domain).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl UserRepository for PostgresRepo {
    async fn insert_user(&self, user: User) -> Result<User, RepoError> {
        sqlx::query(
            r#"INSERT INTO users (id, email, name, photo_url, phone, address, role, created_at,
                                  last_logged_in, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
        )
        .bind(user.id.into_uuid())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.photo_url)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.last_logged_in)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepoError::Conflict(format!("User {} already exists", user.email))
            }
            other => db_err(other),
        })?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let row: Option<DbUser> = sqlx::query_as(
            r#"SELECT id, email, name, photo_url, phone, address, role, created_at, last_logged_in,
                      updated_at
               FROM users WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(DbUser::into_domain).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let rows: Vec<DbUser> = sqlx::query_as(
            r#"SELECT id, email, name, photo_url, phone, address, role, created_at, last_logged_in,
                      updated_at
               FROM users ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbUser::into_domain).collect()
    }

    async fn touch_last_login(
        &self,
        email: &str,
        at: DateTime<Utc>,
    ) -> Result<UpdateOutcome, RepoError> {
        let result = sqlx::query(r#"UPDATE users SET last_logged_in = $1 WHERE email = $2"#)
            .bind(at)
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(UpdateOutcome::from_rows(result.rows_affected()))
    }

    async fn update_profile(
        &self,
        email: &str,
        changes: ProfileChanges,
        at: DateTime<Utc>,
    ) -> Result<UpdateOutcome, RepoError> {
        let result = sqlx::query(
            r#"UPDATE users
               SET name = COALESCE($1, name),
                   phone = COALESCE($2, phone),
                   address = COALESCE($3, address),
                   updated_at = $4
               WHERE email = $5"#,
        )
        .bind(&changes.name)
        .bind(&changes.phone)
        .bind(&changes.address)
        .bind(at)
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(UpdateOutcome::from_rows(result.rows_affected()))
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<UpdateOutcome, RepoError> {
        let result = sqlx::query(r#"UPDATE users SET role = $1 WHERE id = $2"#)
            .bind(role.as_str())
            .bind(id.into_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(UpdateOutcome::from_rows(result.rows_affected()))
    }

    async fn set_role_by_email(
        &self,
        email: &str,
        role: Role,
    ) -> Result<UpdateOutcome, RepoError> {
        let result = sqlx::query(r#"UPDATE users SET role = $1 WHERE email = $2"#)
            .bind(role.as_str())
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(UpdateOutcome::from_rows(result.rows_affected()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decorators
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl DecoratorRepository for PostgresRepo {
    async fn insert_decorator(&self, decorator: Decorator) -> Result<Decorator, RepoError> {
        sqlx::query(
            r#"INSERT INTO decorators (id, name, email, specialty, photo_url, rating, status, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(decorator.id.into_uuid())
        .bind(&decorator.name)
        .bind(&decorator.email)
        .bind(&decorator.specialty)
        .bind(&decorator.photo_url)
        .bind(decorator.rating)
        .bind(decorator.status.as_str())
        .bind(decorator.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(decorator)
    }

    async fn list_decorators(&self, limit: Option<i64>) -> Result<Vec<Decorator>, RepoError> {
        // LIMIT NULL means no limit.
        let rows: Vec<DbDecorator> = sqlx::query_as(
            r#"SELECT id, name, email, specialty, photo_url, rating, status, created_at
               FROM decorators ORDER BY rating DESC, created_at ASC LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbDecorator::into_domain).collect()
    }

    async fn set_decorator_status(
        &self,
        id: DecoratorId,
        status: DecoratorStatus,
    ) -> Result<UpdateOutcome, RepoError> {
        let result = sqlx::query(r#"UPDATE decorators SET status = $1 WHERE id = $2"#)
            .bind(status.as_str())
            .bind(id.into_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(UpdateOutcome::from_rows(result.rows_affected()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ServiceCatalog for PostgresRepo {
    async fn insert_service(&self, listing: ServiceListing) -> Result<ServiceListing, RepoError> {
        sqlx::query(
            r#"INSERT INTO services (id, service_name, category, cost, currency, unit, description,
                                     image, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(listing.id.into_uuid())
        .bind(&listing.service_name)
        .bind(&listing.category)
        .bind(listing.cost.amount())
        .bind(listing.cost.currency().code())
        .bind(&listing.unit)
        .bind(&listing.description)
        .bind(&listing.image)
        .bind(listing.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(listing)
    }

    async fn get_service(&self, id: ServiceId) -> Result<Option<ServiceListing>, RepoError> {
        let row: Option<DbService> = sqlx::query_as(
            r#"SELECT id, service_name, category, cost, currency, unit, description, image, created_at
               FROM services WHERE id = $1"#,
        )
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(DbService::into_domain).transpose()
    }

    async fn list_services(&self) -> Result<Vec<ServiceListing>, RepoError> {
        let rows: Vec<DbService> = sqlx::query_as(
            r#"SELECT id, service_name, category, cost, currency, unit, description, image, created_at
               FROM services ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbService::into_domain).collect()
    }
}
