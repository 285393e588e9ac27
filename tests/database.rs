//! Service tests against a real PostgreSQL database
//!
//! Each test gets a fresh database with the migrations applied.
//! Needs DATABASE_URL pointing at a server where databases can be created.
//! Run with: cargo test --test database -- --ignored

use chrono::{Duration, NaiveTime, Utc};
use sqlx::PgPool;

use labslot_server::{
    config::AppConfig,
    error::AppError,
    models::{
        admin::CreateAdmin,
        booking::CreateBooking,
        enums::{BookingStatus, UserRole},
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
        user::{User, UserClaims},
    },
    repository::{bookings::NewBooking, users::NewUser, Repository},
    services::{bookings::local_now, Services},
};

fn services_with(pool: PgPool, config: AppConfig) -> Services {
    Services::new(Repository::new(pool), &config)
}

fn services(pool: PgPool) -> Services {
    services_with(pool, AppConfig::default())
}

async fn user(services: &Services, email: &str, role: UserRole) -> User {
    services
        .repository
        .users_create(&NewUser {
            name: "Grace Hopper".to_string(),
            email: email.to_string(),
            department: "Chemistry".to_string(),
            role,
            password: "not-a-real-hash".to_string(),
            supervisor: None,
        })
        .await
        .unwrap()
}

fn claims(user: &User) -> UserClaims {
    let now = Utc::now().timestamp();
    UserClaims {
        sub: user.email.clone(),
        user_id: user.id,
        role: user.role,
        exp: now + 3600,
        iat: now,
    }
}

async fn equipment(services: &Services, maintenance_hours: f64) -> Equipment {
    services
        .repository
        .equipment_create(&CreateEquipment {
            name: "Bruker NMR 400".to_string(),
            department: "Chemistry".to_string(),
            category: "Spectroscopy".to_string(),
            location: "C-201".to_string(),
            contact: None,
            status: None,
            image_url: None,
            maintenance_hours: Some(maintenance_hours),
        })
        .await
        .unwrap()
}

async fn pending_booking(
    services: &Services,
    email: &str,
    equipment_id: i32,
    days_from_today: i64,
    start_hour: u32,
    duration: f64,
) -> i32 {
    services
        .repository
        .bookings_create(&NewBooking {
            user_email: email.to_string(),
            equipment_id,
            date: local_now().date() + Duration::days(days_from_today),
            start_time: NaiveTime::from_hms_opt(start_hour, 0, 0).unwrap(),
            duration,
            supervisor: None,
            department: None,
            purpose: Some("Sample run".to_string()),
        })
        .await
        .unwrap()
        .id
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn sweep_completes_elapsed_bookings_once(pool: PgPool) {
    let services = services(pool);
    let student = user(&services, "grace@university.edu", UserRole::Student).await;
    let nmr = equipment(&services, 2.0).await;

    let id = pending_booking(&services, &student.email, nmr.id, -1, 10, 2.0).await;
    services
        .repository
        .bookings_transition(id, BookingStatus::Pending, BookingStatus::Approved)
        .await
        .unwrap()
        .unwrap();
    // Still pending, must be left alone
    let other = pending_booking(&services, &student.email, nmr.id, -1, 14, 1.0).await;

    let completed = services.bookings.complete_elapsed(local_now()).await.unwrap();
    assert_eq!(completed, 1);

    let booking = services.repository.bookings_get_by_id(id).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Completed);
    let untouched = services.repository.bookings_get_by_id(other).await.unwrap();
    assert_eq!(untouched.status, BookingStatus::Pending);

    let nmr = services.repository.equipment_get_by_id(nmr.id).await.unwrap();
    assert_eq!(nmr.total_hours, 2.0);
    assert_eq!(nmr.uptime, "50.0%");

    assert_eq!(services.bookings.complete_elapsed(local_now()).await.unwrap(), 0);
    assert!(services.repository.bookings_complete(id).await.unwrap().is_none());
    let nmr = services.repository.equipment_get_by_id(nmr.id).await.unwrap();
    assert_eq!(nmr.total_hours, 2.0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn future_approved_booking_is_not_completed(pool: PgPool) {
    let services = services(pool);
    let student = user(&services, "grace@university.edu", UserRole::Student).await;
    let nmr = equipment(&services, 0.0).await;

    let id = pending_booking(&services, &student.email, nmr.id, 1, 10, 1.0).await;
    services
        .repository
        .bookings_transition(id, BookingStatus::Pending, BookingStatus::Approved)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(services.bookings.complete_elapsed(local_now()).await.unwrap(), 0);
    let booking = services.repository.bookings_get_by_id(id).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Approved);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn stale_transition_is_refused(pool: PgPool) {
    let services = services(pool);
    let student = user(&services, "grace@university.edu", UserRole::Student).await;
    let nmr = equipment(&services, 0.0).await;
    let id = pending_booking(&services, &student.email, nmr.id, 1, 10, 1.0).await;

    let approved = services
        .repository
        .bookings_transition(id, BookingStatus::Pending, BookingStatus::Approved)
        .await
        .unwrap();
    assert!(approved.is_some());

    let stale = services
        .repository
        .bookings_transition(id, BookingStatus::Pending, BookingStatus::Rejected)
        .await
        .unwrap();
    assert!(stale.is_none());

    let booking = services.repository.bookings_get_by_id(id).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Approved);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn concurrent_decisions_apply_exactly_once(pool: PgPool) {
    let services = services(pool);
    let root = user(&services, "root@university.edu", UserRole::SuperAdmin).await;
    let student = user(&services, "grace@university.edu", UserRole::Student).await;
    let nmr = equipment(&services, 0.0).await;
    let id = pending_booking(&services, &student.email, nmr.id, 1, 10, 1.0).await;

    let root = claims(&root);
    let (approve, reject) = tokio::join!(
        services.bookings.update_status(&root, id, BookingStatus::Approved),
        services.bookings.update_status(&root, id, BookingStatus::Rejected),
    );

    let (winner, loser) = match (approve, reject) {
        (Ok(winner), Err(loser)) | (Err(loser), Ok(winner)) => (winner, loser),
        (a, b) => panic!("expected exactly one decision to apply, got {:?} and {:?}", a, b),
    };
    assert!(
        matches!(loser, AppError::Conflict(_) | AppError::BusinessRule(_)),
        "unexpected error: {:?}",
        loser
    );

    let booking = services.repository.bookings_get_by_id(id).await.unwrap();
    assert_eq!(booking.status, winner.status);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn overlapping_request_is_refused_when_configured(pool: PgPool) {
    let mut config = AppConfig::default();
    config.bookings.reject_conflicts = true;
    let services = services_with(pool, config);

    let student = user(&services, "grace@university.edu", UserRole::Student).await;
    let nmr = equipment(&services, 0.0).await;
    let existing = pending_booking(&services, &student.email, nmr.id, 1, 10, 2.0).await;
    let tomorrow = (local_now().date() + Duration::days(1)).format("%Y-%m-%d").to_string();

    let request = |start_time: &str| CreateBooking {
        equipment_id: nmr.id,
        date: tomorrow.clone(),
        start_time: start_time.to_string(),
        duration: 1.0,
        supervisor: None,
        department: None,
        purpose: None,
    };

    let overlapping = services.bookings.create(&claims(&student), request("11:00")).await;
    match overlapping {
        Err(AppError::SlotConflict(message)) => assert!(message.contains(&existing.to_string())),
        other => panic!("expected a slot conflict, got {:?}", other),
    }

    let free = services
        .bookings
        .create(&claims(&student), request("13:00"))
        .await
        .unwrap();
    assert!(free.conflicts.is_empty());
    assert_eq!(free.booking.status, BookingStatus::Pending);

    let day = services
        .repository
        .bookings_for_equipment_on(nmr.id, local_now().date() + Duration::days(1))
        .await
        .unwrap();
    assert_eq!(day.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn maintenance_update_uses_booked_hours(pool: PgPool) {
    let services = services(pool);
    let student = user(&services, "grace@university.edu", UserRole::Student).await;
    let nmr = equipment(&services, 0.0).await;

    let id = pending_booking(&services, &student.email, nmr.id, -1, 10, 2.0).await;
    services
        .repository
        .bookings_transition(id, BookingStatus::Pending, BookingStatus::Approved)
        .await
        .unwrap()
        .unwrap();
    services.repository.bookings_complete(id).await.unwrap().unwrap();

    let updated = services
        .repository
        .equipment_update(
            nmr.id,
            &UpdateEquipment {
                name: None,
                department: None,
                category: None,
                location: None,
                contact: None,
                status: None,
                image_url: None,
                maintenance_hours: Some(6.0),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.total_hours, 2.0);
    assert_eq!(updated.maintenance_hours, 6.0);
    assert_eq!(updated.uptime, "25.0%");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn demoted_admin_frees_instrument_slot(pool: PgPool) {
    let services = services(pool);
    let root = claims(&user(&services, "root@university.edu", UserRole::SuperAdmin).await);
    let nmr = equipment(&services, 0.0).await;

    let mut admins = Vec::new();
    for email in ["ada@university.edu", "alan@university.edu", "edsger@university.edu"] {
        admins.push(user(&services, email, UserRole::Staff).await);
    }

    for admin in &admins[..2] {
        services
            .admins
            .create(CreateAdmin {
                email: admin.email.clone(),
                assigned_instruments: vec![nmr.id],
            })
            .await
            .unwrap();
    }
    let promoted = services.repository.users_get_by_id(admins[0].id).await.unwrap();
    assert_eq!(promoted.role, UserRole::Admin);

    let third = CreateAdmin {
        email: admins[2].email.clone(),
        assigned_instruments: vec![nmr.id],
    };
    assert!(matches!(
        services.admins.create(third).await,
        Err(AppError::AdminLimit(_))
    ));

    services
        .users
        .update_role(&root, admins[0].id, UserRole::Staff)
        .await
        .unwrap();
    assert!(services
        .admins
        .get_by_email(&admins[0].email)
        .await
        .unwrap()
        .is_none());

    let third = CreateAdmin {
        email: admins[2].email.clone(),
        assigned_instruments: vec![nmr.id],
    };
    let admin = services.admins.create(third).await.unwrap();
    assert_eq!(admin.assigned_instruments, vec![nmr.id]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn concurrent_assignments_respect_admin_cap(pool: PgPool) {
    let services = services(pool);
    let nmr = equipment(&services, 0.0).await;
    let first = user(&services, "ada@university.edu", UserRole::Staff).await;
    let second = user(&services, "alan@university.edu", UserRole::Staff).await;
    let third = user(&services, "edsger@university.edu", UserRole::Staff).await;

    services
        .admins
        .create(CreateAdmin {
            email: first.email.clone(),
            assigned_instruments: vec![nmr.id],
        })
        .await
        .unwrap();

    let assign = |email: &str| CreateAdmin {
        email: email.to_string(),
        assigned_instruments: vec![nmr.id],
    };
    let (a, b) = tokio::join!(
        services.admins.create(assign(&second.email)),
        services.admins.create(assign(&third.email)),
    );
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    for result in [a, b] {
        if let Err(e) = result {
            assert!(matches!(e, AppError::AdminLimit(_)), "unexpected error: {:?}", e);
        }
    }

    let managing = services
        .admins
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|admin| admin.manages(nmr.id))
        .count();
    assert_eq!(managing, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn configured_super_admin_is_created_then_kept(pool: PgPool) {
    let mut config = AppConfig::default();
    config.auth.super_admin_email = Some("Root@University.edu".to_string());
    config.auth.super_admin_password = Some("labslot-root".to_string());
    let services = services_with(pool, config);

    let created = services.auth.bootstrap_super_admin().await.unwrap().unwrap();
    assert_eq!(created.email, "root@university.edu");
    assert_eq!(created.role, UserRole::SuperAdmin);

    let (token, user) = services
        .auth
        .login("root@university.edu", "labslot-root")
        .await
        .unwrap();
    assert!(!token.is_empty());
    assert_eq!(user.id, created.id);

    let again = services.auth.bootstrap_super_admin().await.unwrap().unwrap();
    assert_eq!(again.id, created.id);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn configured_email_of_existing_user_is_promoted(pool: PgPool) {
    let mut config = AppConfig::default();
    config.auth.super_admin_email = Some("grace@university.edu".to_string());
    let services = services_with(pool.clone(), config);
    let grace = user(&services, "grace@university.edu", UserRole::Faculty).await;

    let promoted = services.auth.bootstrap_super_admin().await.unwrap().unwrap();
    assert_eq!(promoted.id, grace.id);
    assert_eq!(promoted.role, UserRole::SuperAdmin);

    let mut config = AppConfig::default();
    config.auth.super_admin_email = Some("nobody@university.edu".to_string());
    let services = services_with(pool, config);
    assert!(services.auth.bootstrap_super_admin().await.unwrap().is_none());
}
