//! Customer-facing message templates (Spanish).
//!
//! Every outbound email and WhatsApp text the shop sends is rendered here
//! so that the dispatcher, the reminder sweep and the API all word things
//! the same way.

use chrono::Datelike;

use crate::types::{Date, Time};

/// Subject line of the booking confirmation email.
pub const CONFIRMATION_SUBJECT: &str = "Confirmación de cita - Orta Novias";

/// Name of the stored email template that overrides the built-in
/// confirmation email when active.
pub const TEMPLATE_APPOINTMENT_CONFIRMATION: &str = "appointment_confirmation";

/// Prefix added to the title of test notifications sent from the back-office.
pub const TEST_TITLE_PREFIX: &str = "[PRUEBA] ";

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Appointment details needed to render a message.
#[derive(Debug, Clone, Copy)]
pub struct AppointmentSummary<'a> {
    pub name: &'a str,
    pub date: Date,
    pub time: Time,
    pub phone: Option<&'a str>,
    pub comment: Option<&'a str>,
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub title: String,
    pub body: String,
}

/// Format a date as `05 de junio de 2030`.
pub fn format_date_es(date: Date) -> String {
    let month = MONTHS_ES[date.month0() as usize];
    format!("{:02} de {month} de {}", date.day(), date.year())
}

/// Format a time as `HH:MM`.
pub fn format_time(time: Time) -> String {
    time.format("%H:%M").to_string()
}

/// Email sent right after a booking is registered.
pub fn confirmation_email(appt: &AppointmentSummary<'_>) -> RenderedMessage {
    let body = format!(
        "¡Hola {name}!\n\n\
         Tu cita ha sido registrada exitosamente:\n\n\
         📅 Fecha: {date}\n\
         ⏰ Hora: {time}\n\
         📱 Teléfono: {phone}\n\
         📝 Comentarios: {comment}\n\n\
         Te contactaremos pronto para confirmar tu cita.\n\n\
         ¡Esperamos verte pronto!\n\n\
         Atentamente,\n\
         El equipo de Orta Novias",
        name = appt.name,
        date = format_date_es(appt.date),
        time = format_time(appt.time),
        phone = appt.phone.unwrap_or("-"),
        comment = appt.comment.unwrap_or("Ninguno"),
    );
    RenderedMessage {
        title: CONFIRMATION_SUBJECT.to_string(),
        body,
    }
}

/// WhatsApp text sent right after a booking is registered.
pub fn confirmation_whatsapp(appt: &AppointmentSummary<'_>) -> RenderedMessage {
    let body = format!(
        "¡Hola {name}! 👋\n\n\
         Tu cita en *Orta Novias* ha sido registrada:\n\n\
         📅 *Fecha:* {date}\n\
         ⏰ *Hora:* {time}\n\
         📝 *Comentarios:* {comment}\n\n\
         Te contactaremos pronto para confirmar tu cita.\n\n\
         ¡Esperamos verte pronto! 💍✨",
        name = appt.name,
        date = format_date_es(appt.date),
        time = format_time(appt.time),
        comment = appt.comment.unwrap_or("Ninguno"),
    );
    RenderedMessage {
        title: "Confirmación de cita".to_string(),
        body,
    }
}

/// Reminder email sent `hours_before` hours ahead of the appointment.
pub fn reminder_email(appt: &AppointmentSummary<'_>, hours_before: i32) -> RenderedMessage {
    let when = if hours_before >= 24 { "mañana" } else { "hoy" };
    RenderedMessage {
        title: format!("Recordatorio: Cita {when} - {}", appt.date.format("%d/%m/%Y")),
        body: format!(
            "¡Hola {name}!\n\n\
             Te recordamos que tienes una cita {when} en Orta Novias:\n\n\
             📅 Fecha: {date}\n\
             ⏰ Hora: {time}\n\n\
             Si necesitas cambiarla, responde a este mensaje.\n\n\
             El equipo de Orta Novias",
            name = appt.name,
            date = format_date_es(appt.date),
            time = format_time(appt.time),
        ),
    }
}

/// Reminder WhatsApp text.
pub fn reminder_whatsapp(appt: &AppointmentSummary<'_>) -> RenderedMessage {
    RenderedMessage {
        title: "Recordatorio de cita".to_string(),
        body: format!(
            "¡Hola {name}! 💍\n\n\
             Te recordamos tu cita:\n\
             🕐 {date} a las {time} en Orta Novias\n\n\
             📋 Si tienes tus medidas, tráelas.\n\n\
             ¡Estamos emocionadas de verte!\n\n\
             ✨ Orta Novias",
            name = appt.name,
            date = format_date_es(appt.date),
            time = format_time(appt.time),
        ),
    }
}

/// Thank-you text sent after the visit.
pub fn follow_up_whatsapp(name: &str) -> RenderedMessage {
    RenderedMessage {
        title: "Gracias por tu visita".to_string(),
        body: format!(
            "¡Hola {name}! ✨\n\n\
             ¡Gracias por visitarnos hoy en Orta Novias!\n\n\
             💭 ¿Qué te pareció tu experiencia?\n\
             📸 Si tienes fotos del vestido, ¡envíanoslas!\n\n\
             🗓️ Próxima cita sugerida: 2-3 semanas\n\n\
             💕 Equipo Orta Novias"
        ),
    }
}

/// Prefix a back-office test notification title.
pub fn test_title(title: &str) -> String {
    format!("{TEST_TITLE_PREFIX}{title}")
}

/// Fill the `{{ name }}`, `{{ formatted_date }}` and `{{ formatted_time }}`
/// placeholders of a stored template.
pub fn render_template(template: &str, appt: &AppointmentSummary<'_>) -> String {
    let date = format_date_es(appt.date);
    let time = format_time(appt.time);
    [
        ("name", appt.name),
        ("formatted_date", date.as_str()),
        ("formatted_time", time.as_str()),
    ]
    .iter()
    .fold(template.to_string(), |out, (key, value)| {
        out.replace(&format!("{{{{ {key} }}}}"), value)
            .replace(&format!("{{{{{key}}}}}"), value)
    })
}
