//! Input validation and sanitization for public booking data.
//!
//! The booking form is public, so every free-text field is sanitized
//! (control characters and script fragments stripped, HTML escaped) and
//! screened for spam before it reaches the database.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{Datelike, Duration, Timelike, Weekday};
use regex::Regex;
use serde::Deserialize;
use validator::ValidateEmail;

use crate::appointment::{is_valid_method, METHOD_EMAIL, METHOD_WHATSAPP};
use crate::business_hours::is_working_time;
use crate::error::CoreError;
use crate::types::{Date, Time};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default maximum length of a sanitized free-text field.
pub const MAX_TEXT_LENGTH: usize = 500;

/// Maximum length of a booking comment.
pub const MAX_COMMENT_LENGTH: usize = 500;

/// How far ahead an appointment may be booked.
pub const MAX_DAYS_AHEAD: i64 = 180;

/// A single character repeated this many times in a row is treated as spam.
const MAX_REPEATED_CHARS: usize = 11;

/// More URLs than this in one text is treated as spam.
const MAX_URLS: usize = 2;

/// Keywords that mark a text as spam (matched case-insensitively).
const SPAM_KEYWORDS: &[&str] = &[
    "viagra",
    "casino",
    "lottery",
    "winner",
    "congratulations",
    "click here",
    "free money",
    "make money",
    "investment",
    "crypto",
    "bitcoin",
    "trading",
    "forex",
];

/// Throwaway mailbox providers that are not accepted for bookings.
const DISPOSABLE_EMAIL_DOMAINS: &[&str] = &[
    "tempmail.org",
    "10minutemail.com",
    "guerrillamail.com",
    "mailinator.com",
    "throwaway.email",
];

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑüÜ\s]{2,100}$").expect("valid regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s\-()]{9,20}$").expect("valid regex"));

static PHONE_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\d+\s\-()]").expect("valid regex"));

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://").expect("valid regex"));

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+$").expect("valid regex"));

/// Fragments removed from free text before escaping.
static DANGEROUS_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)<script.*?</script>",
        r"(?is)<iframe.*?</iframe>",
        r"(?i)javascript:",
        r"(?i)vbscript:",
        r"(?i)on\w+\s*=",
        r"(?i)data:",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

// ---------------------------------------------------------------------------
// Sanitization and spam
// ---------------------------------------------------------------------------

/// Clean a free-text value for storage and display.
///
/// Trims, drops control characters (keeping newlines and tabs), removes
/// script-like fragments, HTML-escapes and truncates to `max_len` chars.
pub fn sanitize_text(input: &str, max_len: usize) -> String {
    let mut text: String = input
        .trim()
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    for re in DANGEROUS_RES.iter() {
        text = re.replace_all(&text, "").into_owned();
    }

    let escaped = html_escape(text.trim());
    escaped.chars().take(max_len).collect()
}

fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Heuristic spam check used on names and comments.
pub fn contains_spam(text: &str) -> bool {
    let lower = text.to_lowercase();
    if SPAM_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return true;
    }
    if longest_run(&lower) >= MAX_REPEATED_CHARS {
        return true;
    }
    URL_RE.find_iter(&lower).count() > MAX_URLS
}

/// Length of the longest run of one repeated character.
fn longest_run(text: &str) -> usize {
    let mut best = 0;
    let mut run = 0;
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if Some(c) == prev {
            run += 1;
        } else {
            run = 1;
            prev = Some(c);
        }
        best = best.max(run);
    }
    best
}

// ---------------------------------------------------------------------------
// Field validators
// ---------------------------------------------------------------------------

fn invalid(msg: &str) -> CoreError {
    CoreError::Validation(msg.to_string())
}

/// Validate and clean a customer name.
pub fn validate_name(raw: &str) -> Result<String, CoreError> {
    if raw.trim().is_empty() {
        return Err(invalid("El nombre es requerido"));
    }
    let name = sanitize_text(raw, 100);
    if !NAME_RE.is_match(&name) {
        return Err(invalid(
            "El nombre debe tener entre 2 y 100 caracteres y solo contener letras",
        ));
    }
    if contains_spam(&name) {
        return Err(invalid("Nombre no válido"));
    }
    Ok(name)
}

/// Validate an email address, returning it trimmed and lowercased.
pub fn validate_email(raw: &str) -> Result<String, CoreError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(invalid("Email requerido"));
    }
    if !email.validate_email() {
        return Err(invalid("Formato de email no válido"));
    }
    let domain = email.rsplit('@').next().unwrap_or_default();
    if DISPOSABLE_EMAIL_DOMAINS.contains(&domain) {
        return Err(invalid("No se permiten emails temporales"));
    }
    Ok(email)
}

/// Validate a phone number, returning it without whitespace.
pub fn validate_phone(raw: &str) -> Result<String, CoreError> {
    let kept = PHONE_STRIP_RE.replace_all(raw.trim(), "");
    if kept.trim().is_empty() {
        return Err(invalid("Teléfono requerido"));
    }
    if !PHONE_RE.is_match(kept.trim()) {
        return Err(invalid("Formato de teléfono no válido"));
    }
    Ok(kept.chars().filter(|c| !c.is_whitespace()).collect())
}

/// Parse and validate a `YYYY-MM-DD` appointment date.
pub fn validate_date(raw: &str, today: Date) -> Result<Date, CoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(invalid("Fecha requerida"));
    }
    let date =
        Date::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid("Formato de fecha no válido"))?;
    check_date(date, today)?;
    Ok(date)
}

/// Date rules shared by create and update: not past, within 180 days, weekday.
pub fn check_date(date: Date, today: Date) -> Result<(), CoreError> {
    if date < today {
        return Err(invalid("No se pueden agendar citas en fechas pasadas"));
    }
    if date > today + Duration::days(MAX_DAYS_AHEAD) {
        return Err(invalid(
            "No se pueden agendar citas con más de 6 meses de anticipación",
        ));
    }
    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        return Err(invalid("Solo se permiten citas de lunes a viernes"));
    }
    Ok(())
}

/// Parse and validate an `HH:MM` appointment time.
///
/// `HH:MM:SS` is also accepted so values echoed back by the API round-trip.
pub fn validate_time(raw: &str) -> Result<Time, CoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(invalid("Hora requerida"));
    }
    let time = Time::parse_from_str(raw, "%H:%M")
        .or_else(|_| Time::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| invalid("Formato de hora no válido"))?;
    check_time(time)?;
    Ok(time)
}

/// Time rules shared by create and update: opening hours, 30-minute grid.
pub fn check_time(time: Time) -> Result<(), CoreError> {
    if !is_working_time(time) {
        return Err(invalid("Hora fuera del horario de atención"));
    }
    if !(time.minute() == 0 || time.minute() == 30) || time.second() != 0 {
        return Err(invalid("Solo se permiten citas cada 30 minutos"));
    }
    Ok(())
}

/// Validate an optional comment. Blank comments become `None`.
pub fn validate_comment(raw: Option<&str>) -> Result<Option<String>, CoreError> {
    let Some(raw) = raw.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    if raw.chars().count() > MAX_COMMENT_LENGTH {
        return Err(invalid("El comentario no puede exceder 500 caracteres"));
    }
    if contains_spam(raw) {
        return Err(invalid("Comentario no válido"));
    }
    Ok(Some(sanitize_text(raw, MAX_COMMENT_LENGTH)))
}

/// Validate the `login` field of a login request (username or email).
pub fn validate_login_identifier(raw: &str) -> Result<(), CoreError> {
    let login = raw.trim();
    if login.chars().count() < 3 {
        return Err(CoreError::Validation(
            "Login must be at least 3 characters".to_string(),
        ));
    }
    if let Some((_, domain)) = login.split_once('@') {
        if !domain.contains('.') {
            return Err(CoreError::Validation("Invalid email format".to_string()));
        }
        return Ok(());
    }
    if !USERNAME_RE.is_match(login) {
        return Err(CoreError::Validation(
            "Username may only contain letters, digits, '.', '_' and '-'".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Whole appointment
// ---------------------------------------------------------------------------

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<String, String>;

/// Raw booking form as submitted by the public site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentInput {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub confirmation_method: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    pub comment: Option<String>,
}

/// Booking data after validation, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedAppointment {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub confirmation_method: String,
    pub date: Date,
    pub time: Time,
    pub comment: Option<String>,
}

/// Contact rules for an appointment record: an email or a phone must be
/// present, and the chosen confirmation method needs its own channel.
///
/// `email` and `phone` are the non-blank values; `method` is lowercase.
pub fn contact_errors(email: Option<&str>, phone: Option<&str>, method: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if email.is_none() && phone.is_none() {
        errors.insert(
            "contact".to_string(),
            "Debe proporcionar al menos un email o teléfono".to_string(),
        );
    }

    if !is_valid_method(method) {
        errors.insert(
            "confirmation_method".to_string(),
            "Método de confirmación no válido".to_string(),
        );
    } else if method == METHOD_EMAIL && email.is_none() {
        errors.insert(
            "email".to_string(),
            "Email requerido para confirmación por email".to_string(),
        );
    } else if method == METHOD_WHATSAPP && phone.is_none() {
        errors.insert(
            "phone".to_string(),
            "Teléfono requerido para confirmación por WhatsApp".to_string(),
        );
    }
    errors
}

/// Validate a complete booking form, collecting every field error.
pub fn validate_appointment(
    input: &AppointmentInput,
    today: Date,
) -> Result<SanitizedAppointment, FieldErrors> {
    let mut errors = FieldErrors::new();
    let mut record = |field: &str, err: CoreError| {
        let msg = match err {
            CoreError::Validation(msg) => msg,
            other => other.to_string(),
        };
        errors.insert(field.to_string(), msg);
    };

    let name = validate_name(&input.name).map_err(|e| record("name", e)).ok();

    let email_raw = non_blank(input.email.as_deref());
    let phone_raw = non_blank(input.phone.as_deref());

    let email = email_raw.and_then(|e| validate_email(e).map_err(|e| record("email", e)).ok());
    let phone = phone_raw.and_then(|p| validate_phone(p).map_err(|e| record("phone", e)).ok());

    let method = input.confirmation_method.trim().to_lowercase();
    let contact = contact_errors(email_raw, phone_raw, &method);

    let date = validate_date(&input.date, today)
        .map_err(|e| record("date", e))
        .ok();
    let time = validate_time(&input.time).map_err(|e| record("time", e)).ok();
    let comment = validate_comment(input.comment.as_deref())
        .map_err(|e| record("comment", e))
        .ok()
        .flatten();

    errors.extend(contact);

    match (name, date, time) {
        (Some(name), Some(date), Some(time)) if errors.is_empty() => Ok(SanitizedAppointment {
            name,
            email,
            phone,
            confirmation_method: method,
            date,
            time,
            comment,
        }),
        _ => Err(errors),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn monday() -> Date {
        // 2030-06-03 is a Monday.
        Date::from_ymd_opt(2030, 6, 3).unwrap()
    }

    fn valid_input() -> AppointmentInput {
        AppointmentInput {
            name: "María López".to_string(),
            email: Some("Maria@Example.com".to_string()),
            phone: Some("612 345 678".to_string()),
            confirmation_method: "email".to_string(),
            date: "2030-06-05".to_string(),
            time: "10:30".to_string(),
            comment: Some("Busco un vestido sirena".to_string()),
        }
    }

    // -----------------------------------------------------------------------
    // Sanitization
    // -----------------------------------------------------------------------

    #[test]
    fn sanitize_strips_script_blocks() {
        let out = sanitize_text("hola <script>alert(1)</script>mundo", 500);
        assert_eq!(out, "hola mundo");
    }

    #[test]
    fn sanitize_escapes_html() {
        let out = sanitize_text("<b>hi</b> & 'bye'", 500);
        assert_eq!(out, "&lt;b&gt;hi&lt;/b&gt; &amp; &#x27;bye&#x27;");
    }

    #[test]
    fn sanitize_removes_event_handlers_and_schemes() {
        let out = sanitize_text("x onclick=go() javascript:run", 500);
        assert!(!out.contains("onclick="));
        assert!(!out.to_lowercase().contains("javascript:"));
    }

    #[test]
    fn sanitize_drops_control_chars_and_truncates() {
        let out = sanitize_text("ab\u{0007}cdef", 4);
        assert_eq!(out, "abcd");
    }

    #[test]
    fn sanitize_keeps_newlines() {
        assert_eq!(sanitize_text("line1\nline2", 500), "line1\nline2");
    }

    // -----------------------------------------------------------------------
    // Spam
    // -----------------------------------------------------------------------

    #[test]
    fn spam_keyword_detected() {
        assert!(contains_spam("Great BITCOIN opportunity"));
        assert!(contains_spam("please click here"));
    }

    #[test]
    fn spam_repeated_chars_detected() {
        assert!(contains_spam("aaaaaaaaaaa"));
        assert!(!contains_spam("aaaaaaaaaa"));
    }

    #[test]
    fn spam_many_urls_detected() {
        assert!(contains_spam("http://a.com https://b.com http://c.com"));
        assert!(!contains_spam("http://a.com https://b.com"));
    }

    #[test]
    fn ordinary_comment_is_not_spam() {
        assert!(!contains_spam("Me caso en septiembre, busco algo sencillo"));
    }

    // -----------------------------------------------------------------------
    // Fields
    // -----------------------------------------------------------------------

    #[test]
    fn name_with_accents_is_valid() {
        assert_eq!(validate_name("  José Ñúñez ").unwrap(), "José Ñúñez");
    }

    #[test]
    fn name_with_digits_is_rejected() {
        assert!(validate_name("R2D2").is_err());
    }

    #[test]
    fn single_letter_name_is_rejected() {
        assert!(validate_name("A").is_err());
    }

    #[test]
    fn email_is_lowercased() {
        assert_eq!(validate_email(" Ana@Mail.COM ").unwrap(), "ana@mail.com");
    }

    #[test]
    fn disposable_email_is_rejected() {
        let err = validate_email("bride@mailinator.com");
        assert_matches!(err, Err(CoreError::Validation(msg)) if msg.contains("temporales"));
    }

    #[test]
    fn malformed_email_is_rejected() {
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn phone_whitespace_is_removed() {
        assert_eq!(validate_phone("+34 612 345 678").unwrap(), "+34612345678");
    }

    #[test]
    fn phone_letters_are_stripped_before_matching() {
        assert_eq!(validate_phone("tel 612-345-678").unwrap(), "612-345-678");
    }

    #[test]
    fn short_phone_is_rejected() {
        assert!(validate_phone("12345").is_err());
    }

    #[test]
    fn date_in_past_is_rejected() {
        assert!(validate_date("2030-06-01", monday()).is_err());
    }

    #[test]
    fn date_too_far_ahead_is_rejected() {
        assert!(validate_date("2031-06-03", monday()).is_err());
    }

    #[test]
    fn saturday_date_is_rejected() {
        let err = validate_date("2030-06-08", monday());
        assert_matches!(err, Err(CoreError::Validation(msg)) if msg.contains("lunes a viernes"));
    }

    #[test]
    fn bad_date_format_is_rejected() {
        assert!(validate_date("05/06/2030", monday()).is_err());
    }

    #[test]
    fn time_on_half_hour_is_valid() {
        assert!(validate_time("17:30").is_ok());
        assert!(validate_time("17:30:00").is_ok());
    }

    #[test]
    fn time_off_grid_is_rejected() {
        let err = validate_time("10:15");
        assert_matches!(err, Err(CoreError::Validation(msg)) if msg.contains("30 minutos"));
    }

    #[test]
    fn two_pm_time_is_rejected() {
        assert!(validate_time("14:00").is_err());
    }

    #[test]
    fn blank_comment_is_none() {
        assert_eq!(validate_comment(Some("   ")).unwrap(), None);
        assert_eq!(validate_comment(None).unwrap(), None);
    }

    #[test]
    fn long_comment_is_rejected() {
        let long = "a ".repeat(260);
        assert!(validate_comment(Some(&long)).is_err());
    }

    #[test]
    fn login_identifier_rules() {
        assert!(validate_login_identifier("ana").is_ok());
        assert!(validate_login_identifier("ana@mail.com").is_ok());
        assert!(validate_login_identifier("ab").is_err());
        assert!(validate_login_identifier("ana@mail").is_err());
        assert!(validate_login_identifier("ana maría").is_err());
    }

    // -----------------------------------------------------------------------
    // Whole appointment
    // -----------------------------------------------------------------------

    #[test]
    fn valid_appointment_is_sanitized() {
        let out = validate_appointment(&valid_input(), monday()).unwrap();
        assert_eq!(out.email.as_deref(), Some("maria@example.com"));
        assert_eq!(out.phone.as_deref(), Some("612345678"));
        assert_eq!(out.time, Time::from_hms_opt(10, 30, 0).unwrap());
        assert_eq!(out.confirmation_method, "email");
    }

    #[test]
    fn missing_email_and_phone_fails_on_contact() {
        let input = AppointmentInput {
            email: None,
            phone: Some("  ".to_string()),
            ..valid_input()
        };
        let errors = validate_appointment(&input, monday()).unwrap_err();
        assert!(errors.contains_key("contact"));
    }

    #[test]
    fn whatsapp_method_requires_phone() {
        let input = AppointmentInput {
            phone: None,
            confirmation_method: "whatsapp".to_string(),
            ..valid_input()
        };
        let errors = validate_appointment(&input, monday()).unwrap_err();
        assert!(errors["phone"].contains("WhatsApp"));
    }

    #[test]
    fn email_method_requires_email() {
        let input = AppointmentInput {
            email: None,
            ..valid_input()
        };
        let errors = validate_appointment(&input, monday()).unwrap_err();
        assert!(errors["email"].contains("confirmación por email"));
    }

    #[test]
    fn unknown_method_is_rejected() {
        let input = AppointmentInput {
            confirmation_method: "pigeon".to_string(),
            ..valid_input()
        };
        let errors = validate_appointment(&input, monday()).unwrap_err();
        assert!(errors.contains_key("confirmation_method"));
    }

    #[test]
    fn contact_rules_apply_to_a_stored_record() {
        assert!(contact_errors(Some("ana@example.com"), None, "email").is_empty());
        assert!(contact_errors(None, None, "email").contains_key("contact"));
        assert!(contact_errors(Some("ana@example.com"), None, "whatsapp").contains_key("phone"));
        assert!(contact_errors(None, Some("+34612345678"), "email").contains_key("email"));
    }

    #[test]
    fn all_field_errors_are_collected() {
        let input = AppointmentInput {
            name: "1".to_string(),
            date: "2030-06-08".to_string(),
            time: "14:00".to_string(),
            ..valid_input()
        };
        let errors = validate_appointment(&input, monday()).unwrap_err();
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("date"));
        assert!(errors.contains_key("time"));
    }
}
