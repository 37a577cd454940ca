//! Integration tests for the repository layer.
//!
//! Each test runs against a fresh database with all migrations applied.

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use orta_db::models::analytics::{CreateAnalyticsEvent, CreateConversion, EndSession, StartSession};
use orta_db::models::appointment::{AppointmentFilter, CreateAppointment, UpdateAppointment};
use orta_db::models::dress::CreateDress;
use orta_db::models::email_template::{CreateEmailTemplate, UpdateEmailTemplate};
use orta_db::models::notification::{CreateNotification, NotificationFilter};
use orta_db::models::reminder::{CreateReminder, ReminderFilter};
use orta_db::models::user::CreateUser;
use orta_db::repositories::{
    AnalyticsRepo, AppointmentRepo, DressRepo, EmailTemplateRepo, NotificationRepo, ReminderRepo,
    UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(username: &str, email: &str) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        first_name: "Ana".to_string(),
        last_name: "García".to_string(),
        phone: None,
        role: "client".to_string(),
    }
}

fn new_appointment(date: NaiveDate, hour: u32, minute: u32) -> CreateAppointment {
    CreateAppointment {
        name: "Lucía Pérez".to_string(),
        phone: Some("+34612345678".to_string()),
        email: Some("lucia@example.com".to_string()),
        confirmation_method: "whatsapp".to_string(),
        date,
        time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
        comment: None,
    }
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 6, 3).unwrap()
}

fn page_view(session_id: &str, url: &str) -> CreateAnalyticsEvent {
    CreateAnalyticsEvent {
        event_name: "page_view".to_string(),
        event_category: "page_view".to_string(),
        event_label: None,
        event_value: None,
        user_id: None,
        session_id: session_id.to_string(),
        user_agent: "test-agent".to_string(),
        ip_address: Some("10.0.0.1".to_string()),
        page_url: url.to_string(),
        page_title: None,
        referrer: None,
        custom_parameters: None,
        occurred_at: None,
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_login_lookup(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("ana", "ana@example.com"))
        .await
        .unwrap();
    assert_eq!(user.role, "client");
    assert!(!user.is_staff());

    let by_email = UserRepo::find_by_login(&pool, "ANA@example.com").await.unwrap();
    assert_eq!(by_email.map(|u| u.id), Some(user.id));

    let by_name = UserRepo::find_by_login(&pool, "ana").await.unwrap();
    assert_eq!(by_name.map(|u| u.id), Some(user.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_email_violates_named_constraint(pool: PgPool) {
    UserRepo::create(&pool, &new_user("ana", "ana@example.com"))
        .await
        .unwrap();
    let err = UserRepo::create(&pool, &new_user("ana2", "ana@example.com"))
        .await
        .unwrap_err();
    assert_matches!(err, sqlx::Error::Database(ref db) if db.constraint() == Some("uq_users_email"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_login_counter(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("ana", "ana@example.com"))
        .await
        .unwrap();
    assert_eq!(UserRepo::record_failed_login(&pool, user.id).await.unwrap(), 1);
    assert_eq!(UserRepo::record_failed_login(&pool, user.id).await.unwrap(), 2);

    UserRepo::record_successful_login(&pool, user.id).await.unwrap();
    let user = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(user.failed_login_count, 0);
    assert!(user.last_login_at.is_some());
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_booked_times_ignore_cancelled(pool: PgPool) {
    let a = AppointmentRepo::create(&pool, &new_appointment(monday(), 10, 0))
        .await
        .unwrap();
    AppointmentRepo::create(&pool, &new_appointment(monday(), 11, 30))
        .await
        .unwrap();
    AppointmentRepo::set_status(&pool, a.id, "cancelled")
        .await
        .unwrap();

    let taken = AppointmentRepo::booked_times(&pool, monday()).await.unwrap();
    assert_eq!(taken, vec![NaiveTime::from_hms_opt(11, 30, 0).unwrap()]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_appointment_list_filters_and_update(pool: PgPool) {
    let a = AppointmentRepo::create(&pool, &new_appointment(monday(), 10, 0))
        .await
        .unwrap();
    assert_eq!(a.status, "pending");
    AppointmentRepo::create(&pool, &new_appointment(monday() + Duration::days(1), 10, 0))
        .await
        .unwrap();

    let filter = AppointmentFilter {
        status: None,
        date: Some(monday()),
    };
    let listed = AppointmentRepo::list(&pool, &filter, 50, 0).await.unwrap();
    assert_eq!(listed.len(), 1);

    let updated = AppointmentRepo::update(
        &pool,
        a.id,
        &UpdateAppointment {
            comment: Some("Traeré a mi madre".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.comment.as_deref(), Some("Traeré a mi madre"));
    assert_eq!(updated.name, a.name);
    assert_eq!(updated.phone, a.phone);
    assert_eq!(updated.email, a.email);

    let cleared = AppointmentRepo::update(
        &pool,
        a.id,
        &UpdateAppointment {
            phone: Some(String::new()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(cleared.phone, None);
    assert_eq!(cleared.email, a.email);

    let counts = AppointmentRepo::count_by_status(&pool).await.unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].count, 2);
}

// ---------------------------------------------------------------------------
// Email templates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_email_template_active_lookup(pool: PgPool) {
    let template = EmailTemplateRepo::create(
        &pool,
        &CreateEmailTemplate {
            name: "appointment_confirmation".to_string(),
            subject: "Confirmación".to_string(),
            html_content: "<p>Hola {{ name }}</p>".to_string(),
            text_content: None,
            is_active: None,
        },
    )
    .await
    .unwrap();
    assert!(template.is_active);
    assert_eq!(template.text_content, "");

    let found = EmailTemplateRepo::find_active_by_name(&pool, "appointment_confirmation")
        .await
        .unwrap();
    assert_eq!(found.map(|t| t.id), Some(template.id));

    EmailTemplateRepo::update(
        &pool,
        template.id,
        &UpdateEmailTemplate {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let found = EmailTemplateRepo::find_active_by_name(&pool, "appointment_confirmation")
        .await
        .unwrap();
    assert!(found.is_none());
}

// ---------------------------------------------------------------------------
// Dresses
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dress_list_available_only(pool: PgPool) {
    for (name, available) in [("Aurora", true), ("Brisa", false)] {
        DressRepo::create(
            &pool,
            &CreateDress {
                name: name.to_string(),
                description: None,
                image_url: None,
                style: Some("Sirena".to_string()),
                available: Some(available),
            },
        )
        .await
        .unwrap();
    }

    let all = DressRepo::list(&pool, false, None, 50, 0).await.unwrap();
    assert_eq!(all.len(), 2);
    let available = DressRepo::list(&pool, true, Some("sirena"), 50, 0).await.unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].name, "Aurora");
    assert_eq!(DressRepo::count_available(&pool).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Reminders
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reminder_deduplication(pool: PgPool) {
    let appt = AppointmentRepo::create(&pool, &new_appointment(monday(), 10, 0))
        .await
        .unwrap();
    let input = CreateReminder {
        appointment_id: appt.id,
        reminder_type: "email".to_string(),
        hours_before: 24,
        scheduled_time: Utc::now() + Duration::hours(3),
    };
    assert!(ReminderRepo::create_if_absent(&pool, &input).await.unwrap().is_some());
    assert!(ReminderRepo::create_if_absent(&pool, &input).await.unwrap().is_none());

    let listed = ReminderRepo::list(&pool, &ReminderFilter::default(), 50, 0)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_due_reminders_skip_cancelled_and_sent(pool: PgPool) {
    let now = Utc::now();
    let live = AppointmentRepo::create(&pool, &new_appointment(monday(), 10, 0))
        .await
        .unwrap();
    let cancelled = AppointmentRepo::create(&pool, &new_appointment(monday(), 11, 0))
        .await
        .unwrap();
    AppointmentRepo::set_status(&pool, cancelled.id, "cancelled")
        .await
        .unwrap();

    for appointment_id in [live.id, cancelled.id] {
        ReminderRepo::create_if_absent(
            &pool,
            &CreateReminder {
                appointment_id,
                reminder_type: "whatsapp".to_string(),
                hours_before: 24,
                scheduled_time: now + Duration::minutes(10),
            },
        )
        .await
        .unwrap();
    }

    let due = ReminderRepo::list_due(&pool, now - Duration::minutes(30), now + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].appointment_id, live.id);
    assert_eq!(due[0].name, "Lucía Pérez");

    ReminderRepo::mark_sent(&pool, due[0].id).await.unwrap();
    let due = ReminderRepo::list_due(&pool, now - Duration::minutes(30), now + Duration::hours(1))
        .await
        .unwrap();
    assert!(due.is_empty());

    let removed = ReminderRepo::delete_sent_before(&pool, Utc::now() + Duration::minutes(1))
        .await
        .unwrap();
    assert_eq!(removed, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_unsent_for_appointment(pool: PgPool) {
    let appt = AppointmentRepo::create(&pool, &new_appointment(monday(), 10, 0))
        .await
        .unwrap();
    for (kind, hours) in [("email", 24), ("email", 2)] {
        ReminderRepo::create_if_absent(
            &pool,
            &CreateReminder {
                appointment_id: appt.id,
                reminder_type: kind.to_string(),
                hours_before: hours,
                scheduled_time: Utc::now() + Duration::hours(5),
            },
        )
        .await
        .unwrap();
    }
    let removed = ReminderRepo::delete_unsent_for_appointment(&pool, appt.id)
        .await
        .unwrap();
    assert_eq!(removed, 2);
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_notification_delivery_lifecycle(pool: PgPool) {
    let n = NotificationRepo::create(
        &pool,
        &CreateNotification {
            recipient: "+34612345678".to_string(),
            title: "Confirmación de cita".to_string(),
            message: "Hola".to_string(),
            notification_type: "whatsapp".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(n.status, "pending");
    assert_eq!(n.max_retries, 3);

    NotificationRepo::mark_failed(&pool, n.id, "timeout").await.unwrap();
    let retryable = NotificationRepo::list_retryable(&pool, 100).await.unwrap();
    assert_eq!(retryable.len(), 1);
    assert_eq!(retryable[0].retry_count, 1);
    assert_eq!(retryable[0].error_message.as_deref(), Some("timeout"));

    NotificationRepo::mark_sent(&pool, n.id, Some(&serde_json::json!({"message_id": "SM1"})))
        .await
        .unwrap();
    let n = NotificationRepo::find_by_id(&pool, n.id).await.unwrap().unwrap();
    assert_eq!(n.status, "sent");
    assert!(n.sent_at.is_some());
    assert_eq!(n.whatsapp_data["message_id"], "SM1");

    let stats = NotificationRepo::stats(&pool).await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.sent, 1);
    assert_eq!(stats.whatsapp, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_notification_read_is_owner_scoped(pool: PgPool) {
    let owner = UserRepo::create(&pool, &new_user("ana", "ana@example.com"))
        .await
        .unwrap();
    let other = UserRepo::create(&pool, &new_user("eva", "eva@example.com"))
        .await
        .unwrap();
    let n = NotificationRepo::create(
        &pool,
        &CreateNotification {
            user_id: Some(owner.id),
            recipient: owner.email.clone(),
            title: "Aviso".to_string(),
            message: "Hola".to_string(),
            notification_type: "internal".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(!NotificationRepo::mark_read(&pool, n.id, Some(other.id)).await.unwrap());
    assert_eq!(NotificationRepo::unread_count(&pool, owner.id).await.unwrap(), 1);
    assert!(NotificationRepo::mark_read(&pool, n.id, Some(owner.id)).await.unwrap());
    assert_eq!(NotificationRepo::unread_count(&pool, owner.id).await.unwrap(), 0);

    let filter = NotificationFilter {
        user_id: Some(owner.id),
        unread_only: true,
        ..Default::default()
    };
    assert!(NotificationRepo::list(&pool, &filter, 50, 0).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_session_conversion_and_dashboard(pool: PgPool) {
    AnalyticsRepo::start_session(
        &pool,
        &StartSession {
            session_id: "s-1".to_string(),
            user_id: None,
            user_agent: "test-agent".to_string(),
            ip_address: None,
            referrer: None,
        },
    )
    .await
    .unwrap();

    AnalyticsRepo::create_event(&pool, &page_view("s-1", "/")).await.unwrap();
    let event = AnalyticsRepo::create_event(&pool, &page_view("s-1", "/cita/"))
        .await
        .unwrap();
    AnalyticsRepo::create_conversion(
        &pool,
        &CreateConversion {
            conversion_type: "appointment_scheduled".to_string(),
            conversion_value: Some(50.0),
            currency: None,
            user_id: None,
            analytics_event_id: event.id,
            source: None,
            medium: None,
            campaign: None,
            conversion_data: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(AnalyticsRepo::count_page_views_for_session(&pool, "s-1").await.unwrap(), 2);
    assert_eq!(
        AnalyticsRepo::first_conversion_for_session(&pool, "s-1")
            .await
            .unwrap()
            .as_deref(),
        Some("appointment_scheduled")
    );

    let ended = AnalyticsRepo::end_session(
        &pool,
        "s-1",
        &EndSession {
            end_time: Utc::now(),
            duration_secs: 120,
            page_views: 2,
            bounce_rate: 0.0,
            is_converted: true,
            conversion_type: Some("appointment_scheduled".to_string()),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(ended.is_converted);

    let today = Utc::now().date_naive();
    let totals = AnalyticsRepo::dashboard_totals(&pool, today - Duration::days(1), today + Duration::days(1))
        .await
        .unwrap();
    assert_eq!(totals.total_visitors, 1);
    assert_eq!(totals.total_page_views, 2);
    assert_eq!(totals.total_conversions, 1);
    assert_eq!(totals.total_revenue, 50.0);
    assert_eq!(totals.avg_session_duration_secs, Some(120.0));

    let trends = AnalyticsRepo::daily_trends(&pool, today - Duration::days(1), today + Duration::days(1))
        .await
        .unwrap();
    assert_eq!(trends.len(), 3);
    assert_eq!(trends.iter().map(|t| t.conversions).sum::<i64>(), 1);

    let counters =
        AnalyticsRepo::business_counters(&pool, today - Duration::days(1), today + Duration::days(1))
            .await
            .unwrap();
    assert_eq!(counters.appointment_conversions, 1);
}

// ---------------------------------------------------------------------------
// Monitoring
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_database_stats_report_connections_and_size(pool: PgPool) {
    orta_db::health_check(&pool).await.unwrap();
    let stats = orta_db::database_stats(&pool).await.unwrap();
    assert!(stats.active_connections >= 1);
    assert!(stats.size_bytes > 0);
}
