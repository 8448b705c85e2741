//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use decor_types::{
        Booking, BookingFilter, BookingPaymentUpdate, BookingRepository, Currency, Decorator,
        DecoratorId, DecoratorRepository, DecoratorStatus, DeliveryStatus, LedgerWrite, Money,
        PaymentLedger, PaymentRecord, PaymentStatus, ProfileChanges, RepoError, Role,
        ServiceCatalog, ServiceId, ServiceListing, TrackingId, User, UserId, UserRepository,
    };

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD).unwrap()
    }

    fn booking_for(email: &str) -> Booking {
        Booking::new(
            email.to_string(),
            Some("Ann".to_string()),
            ServiceId::new(),
            "Wedding Stage".to_string(),
            usd(5000),
            Some("2025-12-24".to_string()),
            Some("Dhaka".to_string()),
        )
        .unwrap()
    }

    fn payment_for(booking: &Booking, transaction_id: &str) -> (PaymentRecord, BookingPaymentUpdate) {
        let paid_at = Utc::now();
        let tracking = TrackingId::generate();
        let record = PaymentRecord::paid(
            booking.cost,
            Some(booking.user_email.clone()),
            booking.id,
            booking.service_name.clone(),
            transaction_id.to_string(),
            tracking.clone(),
            paid_at,
        );
        let update = BookingPaymentUpdate::new(booking.id, paid_at, tracking);
        (record, update)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Bookings
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_insert_and_get_booking() {
        let repo = setup_repo().await;
        let booking = repo.insert_booking(booking_for("a@x.com")).await.unwrap();

        let fetched = repo.get_booking(booking.id).await.unwrap().unwrap();

        assert_eq!(fetched.id, booking.id);
        assert_eq!(fetched.cost, usd(5000));
        assert_eq!(fetched.payment_status, PaymentStatus::Unpaid);
        assert_eq!(fetched.delivery_status, DeliveryStatus::None);
        assert_eq!(fetched.event_date.as_deref(), Some("2025-12-24"));
        assert!(fetched.tracking_id.is_none());
    }

    #[tokio::test]
    async fn test_list_bookings_filters_and_orders() {
        let repo = setup_repo().await;

        let mut older = booking_for("a@x.com");
        older.created_at = Utc::now() - Duration::hours(2);
        let older = repo.insert_booking(older).await.unwrap();
        let newer = repo.insert_booking(booking_for("a@x.com")).await.unwrap();
        repo.insert_booking(booking_for("b@x.com")).await.unwrap();

        let mine = repo
            .list_bookings(BookingFilter {
                user_email: Some("a@x.com".into()),
                delivery_status: None,
            })
            .await
            .unwrap();

        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, newer.id);
        assert_eq!(mine[1].id, older.id);

        let all = repo.list_bookings(BookingFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let pending = repo
            .list_bookings(BookingFilter {
                user_email: None,
                delivery_status: Some(DeliveryStatus::PendingPickup),
            })
            .await
            .unwrap();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_delete_booking() {
        let repo = setup_repo().await;
        let booking = repo.insert_booking(booking_for("a@x.com")).await.unwrap();

        assert_eq!(repo.delete_booking(booking.id).await.unwrap(), 1);
        assert_eq!(repo.delete_booking(booking.id).await.unwrap(), 0);
        assert!(repo.get_booking(booking.id).await.unwrap().is_none());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Payment ledger
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_record_payment_marks_booking_paid() {
        let repo = setup_repo().await;
        let booking = repo.insert_booking(booking_for("a@x.com")).await.unwrap();
        let (record, update) = payment_for(&booking, "pi_1");
        let tracking = record.tracking_id.clone();

        let write = repo.record_payment(record, update).await.unwrap();

        match write {
            LedgerWrite::Recorded { booking, ledger } => {
                assert_eq!(booking.matched_count, 1);
                assert!(ledger.acknowledged);
            }
            LedgerWrite::Duplicate(_) => panic!("first write must be recorded"),
        }

        let stored = repo.get_booking(booking.id).await.unwrap().unwrap();
        assert!(stored.is_paid());
        assert_eq!(stored.delivery_status, DeliveryStatus::PendingPickup);
        assert_eq!(stored.tracking_id, Some(tracking.clone()));
        assert!(stored.payment_time.is_some());

        let entry = repo.find_payment_by_transaction("pi_1").await.unwrap().unwrap();
        assert_eq!(entry.tracking_id, tracking);
        assert_eq!(entry.amount, usd(5000));
        assert_eq!(entry.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_record_payment_duplicate_keeps_first_entry() {
        let repo = setup_repo().await;
        let booking = repo.insert_booking(booking_for("a@x.com")).await.unwrap();

        let (first, first_update) = payment_for(&booking, "pi_dup");
        let first_tracking = first.tracking_id.clone();
        repo.record_payment(first, first_update).await.unwrap();

        let (second, second_update) = payment_for(&booking, "pi_dup");
        let write = repo.record_payment(second, second_update).await.unwrap();

        match write {
            LedgerWrite::Duplicate(existing) => {
                assert_eq!(existing.tracking_id, first_tracking);
            }
            LedgerWrite::Recorded { .. } => panic!("second write must not be recorded"),
        }

        // The booking keeps the tracking id of the first write.
        let stored = repo.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.tracking_id, Some(first_tracking));
        assert_eq!(repo.list_payments(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_second_transaction_keeps_booking_tracking_id() {
        let repo = setup_repo().await;
        let booking = repo.insert_booking(booking_for("a@x.com")).await.unwrap();

        let (first, first_update) = payment_for(&booking, "pi_1");
        let first_tracking = first.tracking_id.clone();
        repo.record_payment(first, first_update).await.unwrap();
        let paid_at = repo
            .get_booking(booking.id)
            .await
            .unwrap()
            .unwrap()
            .payment_time;

        let (second, second_update) = payment_for(&booking, "pi_2");
        let write = repo.record_payment(second, second_update).await.unwrap();

        match write {
            LedgerWrite::Recorded { booking, ledger } => {
                assert!(booking.matched_nothing());
                assert!(ledger.acknowledged);
            }
            LedgerWrite::Duplicate(_) => panic!("distinct transaction must be recorded"),
        }

        let stored = repo.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.tracking_id, Some(first_tracking));
        assert_eq!(stored.payment_time, paid_at);
        assert_eq!(repo.list_payments(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_record_payment_for_missing_booking_still_writes_ledger() {
        let repo = setup_repo().await;
        let orphan = booking_for("a@x.com");
        let (record, update) = payment_for(&orphan, "pi_orphan");

        let write = repo.record_payment(record, update).await.unwrap();

        match write {
            LedgerWrite::Recorded { booking, .. } => assert!(booking.matched_nothing()),
            LedgerWrite::Duplicate(_) => panic!("unexpected duplicate"),
        }
        assert!(
            repo.find_payment_by_transaction("pi_orphan")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_list_payments_by_customer_newest_first() {
        let repo = setup_repo().await;
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();

        for (i, (email, tx)) in [("a@x.com", "pi_a1"), ("b@x.com", "pi_b1"), ("a@x.com", "pi_a2")]
            .into_iter()
            .enumerate()
        {
            let booking = repo.insert_booking(booking_for(email)).await.unwrap();
            let (mut record, update) = payment_for(&booking, tx);
            record.paid_at = base + Duration::minutes(i as i64);
            repo.record_payment(record, update).await.unwrap();
        }

        let mine = repo.list_payments(Some("a@x.com")).await.unwrap();
        let ids: Vec<_> = mine.iter().map(|p| p.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["pi_a2", "pi_a1"]);

        assert_eq!(repo.list_payments(None).await.unwrap().len(), 3);
        assert!(repo.list_payments(Some("c@x.com")).await.unwrap().is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_insert_user_twice_conflicts() {
        let repo = setup_repo().await;
        let user = User::register("a@x.com".into(), None, None).unwrap();
        repo.insert_user(user).await.unwrap();

        let again = User::register("a@x.com".into(), None, None).unwrap();
        let result = repo.insert_user(again).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_profile_update_and_login_touch() {
        let repo = setup_repo().await;
        repo.insert_user(User::register("a@x.com".into(), Some("Ann".into()), None).unwrap())
            .await
            .unwrap();

        let later = Utc::now() + Duration::minutes(5);
        let touched = repo.touch_last_login("a@x.com", later).await.unwrap();
        assert_eq!(touched.matched_count, 1);

        let changes = ProfileChanges {
            phone: Some("555-0101".into()),
            ..Default::default()
        };
        repo.update_profile("a@x.com", changes, later).await.unwrap();

        let user = repo.find_user_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(user.name.as_deref(), Some("Ann"));
        assert_eq!(user.phone.as_deref(), Some("555-0101"));
        assert!(user.updated_at.is_some());
        assert!(user.last_logged_in > user.created_at);

        let missing = repo.touch_last_login("nobody@x.com", later).await.unwrap();
        assert!(missing.matched_nothing());
    }

    #[tokio::test]
    async fn test_set_role_by_id_and_email() {
        let repo = setup_repo().await;
        let user = repo
            .insert_user(User::register("a@x.com".into(), None, None).unwrap())
            .await
            .unwrap();

        repo.set_role(user.id, Role::Admin).await.unwrap();
        let fetched = repo.find_user_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(fetched.role, Role::Admin);

        repo.set_role_by_email("a@x.com", Role::Decorator).await.unwrap();
        let fetched = repo.find_user_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(fetched.role, Role::Decorator);

        let none = repo.set_role(UserId::new(), Role::Admin).await.unwrap();
        assert!(none.matched_nothing());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Decorators and catalog
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_list_decorators_by_rating_with_limit() {
        let repo = setup_repo().await;
        for (name, rating) in [("A", 3.0), ("B", 4.9), ("C", 4.1), ("D", 2.0)] {
            let d = Decorator::apply(
                name.into(),
                format!("{}@x.com", name.to_lowercase()),
                None,
                None,
                rating,
            )
            .unwrap();
            repo.insert_decorator(d).await.unwrap();
        }

        let top = repo.list_decorators(Some(3)).await.unwrap();
        let names: Vec<_> = top.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);

        assert_eq!(repo.list_decorators(None).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_set_decorator_status() {
        let repo = setup_repo().await;
        let d = repo
            .insert_decorator(
                Decorator::apply("Dee".into(), "d@x.com".into(), None, None, 4.0).unwrap(),
            )
            .await
            .unwrap();

        let outcome = repo
            .set_decorator_status(d.id, DecoratorStatus::Approved)
            .await
            .unwrap();
        assert_eq!(outcome.modified_count, 1);

        let listed = repo.list_decorators(None).await.unwrap();
        assert_eq!(listed[0].status, DecoratorStatus::Approved);

        let missing = repo
            .set_decorator_status(DecoratorId::new(), DecoratorStatus::Rejected)
            .await
            .unwrap();
        assert!(missing.matched_nothing());
    }

    #[tokio::test]
    async fn test_service_catalog() {
        let repo = setup_repo().await;
        let listing = ServiceListing::new(
            "Balloon Arch".into(),
            Some("birthday".into()),
            usd(12000),
            Some("per event".into()),
            None,
            None,
        )
        .unwrap();
        let listing = repo.insert_service(listing).await.unwrap();

        let fetched = repo.get_service(listing.id).await.unwrap().unwrap();
        assert_eq!(fetched.service_name, "Balloon Arch");
        assert_eq!(fetched.cost, usd(12000));

        assert!(repo.get_service(ServiceId::new()).await.unwrap().is_none());
        assert_eq!(repo.list_services().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("decor.db");
        let url = format!("sqlite://{}", path.display());

        let booking = booking_for("a@x.com");
        let (record, update) = payment_for(&booking, "pi_persist");
        {
            let repo = SqliteRepo::new(&url).await.unwrap();
            repo.insert_booking(booking.clone()).await.unwrap();
            repo.record_payment(record, update).await.unwrap();
            repo.close().await;
        }

        let repo = SqliteRepo::new(&url).await.unwrap();
        let stored = repo.get_booking(booking.id).await.unwrap().unwrap();
        assert!(stored.is_paid());
        assert!(
            repo.find_payment_by_transaction("pi_persist")
                .await
                .unwrap()
                .is_some()
        );
    }
}
