//! Handlers for the `/appointments` resource.
//!
//! Booking and the opening-hours lookups are public; everything else
//! needs a signed-in user, and removal or status changes need an admin.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use orta_core::appointment::{is_valid_status, STATUS_CANCELLED, STATUS_CONFIRMED};
use orta_core::business_hours::{
    business_hours_info, is_working_day, working_time_slots, BusinessHoursInfo, MSG_PAST_DATE,
    MSG_WEEKEND,
};
use orta_core::error::CoreError;
use orta_core::types::{Date, DbId};
use orta_core::validation::{
    check_date, check_time, contact_errors, validate_appointment, validate_comment,
    validate_email, validate_name, validate_phone, AppointmentInput,
};
use orta_db::models::appointment::{
    Appointment, AppointmentFilter, CreateAppointment, UpdateAppointment,
};
use orta_db::repositories::AppointmentRepo;
use orta_events::bus::{
    EVENT_APPOINTMENT_CANCELLED, EVENT_APPOINTMENT_CREATED, EVENT_APPOINTMENT_UPDATED,
};
use orta_events::ShopEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client_ip::ClientIp;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Filters for `GET /appointments`.
#[derive(Debug, Default, Deserialize)]
pub struct AppointmentQuery {
    pub status: Option<String>,
    pub date: Option<Date>,
}

/// Query for `GET /appointments/available-slots`.
#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: Date,
}

/// A freshly booked appointment and whether its confirmation went out.
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub notification_sent: bool,
}

#[derive(Debug, Serialize)]
pub struct AvailableSlots {
    pub date: Date,
    pub available_slots: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

fn appointment_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Appointment",
        id,
    })
}

/// The contact value an update leaves on the record: absent keeps the
/// stored value, blank clears it, anything else must validate.
fn merged_contact(
    submitted: Option<&str>,
    stored: Option<&str>,
    validate: fn(&str) -> Result<String, CoreError>,
) -> Result<Option<String>, CoreError> {
    match submitted.map(str::trim) {
        None => Ok(stored.map(str::to_string)),
        Some("") => Ok(None),
        Some(raw) => validate(raw).map(Some),
    }
}

fn publish(state: &AppState, event_type: &str, appointment: &Appointment) {
    state.event_bus.publish(
        ShopEvent::new(event_type)
            .with_appointment(appointment.id)
            .with_payload(json!({
                "date": appointment.date,
                "time": appointment.time,
                "status": appointment.status,
            })),
    );
}

// ---------------------------------------------------------------------------
// Public booking
// ---------------------------------------------------------------------------

/// POST /api/v1/appointments
///
/// Validates the whole form, stores the booking, then attempts the
/// confirmation and schedules reminders. Delivery problems never fail the
/// booking; they show up as `notification_sent: false`.
pub async fn create_appointment(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(input): Json<AppointmentInput>,
) -> AppResult<impl IntoResponse> {
    let today = Utc::now().date_naive();
    let booking = validate_appointment(&input, today).map_err(|errors| {
        tracing::info!(ip = %ip, fields = ?errors.keys().collect::<Vec<_>>(), "Booking rejected");
        AppError::FieldErrors(errors)
    })?;

    let appointment = AppointmentRepo::create(
        &state.pool,
        &CreateAppointment {
            name: booking.name,
            phone: booking.phone,
            email: booking.email,
            confirmation_method: booking.confirmation_method,
            date: booking.date,
            time: booking.time,
            comment: booking.comment,
        },
    )
    .await?;

    tracing::info!(
        appointment_id = appointment.id,
        date = %appointment.date,
        time = %appointment.time,
        ip = %ip,
        "Appointment booked"
    );
    publish(&state, EVENT_APPOINTMENT_CREATED, &appointment);

    let notification_sent = match state
        .dispatcher
        .send_appointment_confirmation(&appointment)
        .await
    {
        Ok(sent) => sent,
        Err(e) => {
            tracing::error!(appointment_id = appointment.id, error = %e, "Confirmation failed");
            false
        }
    };

    if let Err(e) = state
        .dispatcher
        .schedule_reminders(&appointment, Utc::now())
        .await
    {
        tracing::error!(appointment_id = appointment.id, error = %e, "Reminder scheduling failed");
    }

    // Re-read so `auto_confirmed` reflects the confirmation outcome.
    let appointment = AppointmentRepo::find_by_id(&state.pool, appointment.id)
        .await?
        .unwrap_or(appointment);

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: BookingResponse {
                appointment,
                notification_sent,
            },
        }),
    ))
}

/// GET /api/v1/appointments/business-hours
pub async fn business_hours() -> Json<DataResponse<BusinessHoursInfo>> {
    Json(DataResponse {
        data: business_hours_info(),
    })
}

/// GET /api/v1/appointments/available-slots?date=YYYY-MM-DD
///
/// Past and non-working dates get an empty list with a reason.
pub async fn available_slots(
    State(state): State<AppState>,
    Query(query): Query<SlotsQuery>,
) -> AppResult<Json<DataResponse<AvailableSlots>>> {
    let date = query.date;
    let today = Utc::now().date_naive();

    let reason = if date < today {
        Some(MSG_PAST_DATE)
    } else if !is_working_day(date) {
        Some(MSG_WEEKEND)
    } else {
        None
    };
    if reason.is_some() {
        return Ok(Json(DataResponse {
            data: AvailableSlots {
                date,
                available_slots: Vec::new(),
                reason,
            },
        }));
    }

    let booked: Vec<String> = AppointmentRepo::booked_times(&state.pool, date)
        .await?
        .iter()
        .map(|t| t.format("%H:%M").to_string())
        .collect();
    let available_slots = working_time_slots()
        .into_iter()
        .filter(|slot| !booked.contains(slot))
        .collect();

    Ok(Json(DataResponse {
        data: AvailableSlots {
            date,
            available_slots,
            reason: None,
        },
    }))
}

// ---------------------------------------------------------------------------
// Back office
// ---------------------------------------------------------------------------

/// GET /api/v1/appointments
pub async fn list_appointments(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<AppointmentQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<ListResponse<Appointment>>> {
    if let Some(status) = filter.status.as_deref() {
        if !is_valid_status(status) {
            return Err(AppError::BadRequest(format!("Estado no válido: '{status}'")));
        }
    }
    let appointments = AppointmentRepo::list(
        &state.pool,
        &AppointmentFilter {
            status: filter.status,
            date: filter.date,
        },
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(ListResponse::new(appointments)))
}

/// GET /api/v1/appointments/{id}
pub async fn get_appointment(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Appointment>>> {
    let appointment = AppointmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| appointment_not_found(id))?;
    Ok(Json(DataResponse { data: appointment }))
}

/// PUT /api/v1/appointments/{id}
///
/// Changed dates and times are held to the booking rules, and the merged
/// record must still satisfy the contact rules. Only admins may change the
/// status. Moving an appointment replaces its unsent reminders.
pub async fn update_appointment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateAppointment>,
) -> AppResult<Json<DataResponse<Appointment>>> {
    if let Some(status) = input.status.as_deref() {
        if !auth.is_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Solo el personal puede cambiar el estado de una cita".into(),
            )));
        }
        if !is_valid_status(status) {
            return Err(AppError::BadRequest(format!("Estado no válido: '{status}'")));
        }
    }

    let existing = AppointmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| appointment_not_found(id))?;

    let date_changed = input.date.is_some_and(|d| d != existing.date);
    let time_changed = input.time.is_some_and(|t| t != existing.time);
    if let Some(date) = input.date.filter(|_| date_changed) {
        check_date(date, Utc::now().date_naive())?;
    }
    if let Some(time) = input.time.filter(|_| time_changed) {
        check_time(time)?;
    }

    if let Some(name) = input.name.as_deref() {
        input.name = Some(validate_name(name)?);
    }
    if input.comment.is_some() {
        input.comment = validate_comment(input.comment.as_deref())?;
    }

    let email = merged_contact(
        input.email.as_deref(),
        existing.email.as_deref(),
        validate_email,
    )?;
    let phone = merged_contact(
        input.phone.as_deref(),
        existing.phone.as_deref(),
        validate_phone,
    )?;
    let method = input
        .confirmation_method
        .as_deref()
        .map(|m| m.trim().to_lowercase())
        .unwrap_or_else(|| existing.confirmation_method.clone());
    let contact = contact_errors(email.as_deref(), phone.as_deref(), &method);
    if !contact.is_empty() {
        return Err(AppError::FieldErrors(contact));
    }
    // Submitted-but-blank contacts travel as "" so the update clears them.
    input.email = input.email.map(|_| email.unwrap_or_default());
    input.phone = input.phone.map(|_| phone.unwrap_or_default());
    input.confirmation_method = input.confirmation_method.map(|_| method);

    let updated = AppointmentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| appointment_not_found(id))?;

    if date_changed || time_changed {
        if let Err(e) = state
            .dispatcher
            .reschedule_reminders(&updated, Utc::now())
            .await
        {
            tracing::error!(appointment_id = id, error = %e, "Reminder rescheduling failed");
        }
    }

    tracing::info!(appointment_id = id, user_id = auth.user_id, "Appointment updated");
    let cancelled = updated.status == STATUS_CANCELLED && existing.status != STATUS_CANCELLED;
    let event = if cancelled {
        EVENT_APPOINTMENT_CANCELLED
    } else {
        EVENT_APPOINTMENT_UPDATED
    };
    publish(&state, event, &updated);
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/appointments/{id}
pub async fn delete_appointment(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !AppointmentRepo::delete(&state.pool, id).await? {
        return Err(appointment_not_found(id));
    }
    tracing::info!(appointment_id = id, admin_id = admin.user_id, "Appointment deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/appointments/{id}/confirm
pub async fn confirm_appointment(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Appointment>>> {
    let appointment = AppointmentRepo::set_status(&state.pool, id, STATUS_CONFIRMED)
        .await?
        .ok_or_else(|| appointment_not_found(id))?;
    tracing::info!(appointment_id = id, admin_id = admin.user_id, "Appointment confirmed");
    publish(&state, EVENT_APPOINTMENT_UPDATED, &appointment);
    Ok(Json(DataResponse { data: appointment }))
}

/// POST /api/v1/appointments/{id}/cancel
pub async fn cancel_appointment(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Appointment>>> {
    let appointment = AppointmentRepo::set_status(&state.pool, id, STATUS_CANCELLED)
        .await?
        .ok_or_else(|| appointment_not_found(id))?;
    tracing::info!(appointment_id = id, admin_id = admin.user_id, "Appointment cancelled");
    publish(&state, EVENT_APPOINTMENT_CANCELLED, &appointment);
    Ok(Json(DataResponse { data: appointment }))
}
