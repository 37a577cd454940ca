//! Phone number normalization for WhatsApp delivery.
//!
//! Brides usually type Spanish mobile numbers without a country code, so
//! bare nine-digit numbers starting with 6, 7, 8 or 9 are assumed to be
//! Spanish (`+34`).

/// Default country calling code for numbers typed without one.
pub const DEFAULT_COUNTRY_CODE: &str = "34";

/// Normalize a phone number to E.164-like `+<digits>` form.
///
/// Returns `None` when the input contains no digits at all.
pub fn normalize_for_whatsapp(phone: &str) -> Option<String> {
    let trimmed = phone.trim();
    let has_plus = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    if digits.is_empty() {
        return None;
    }
    if has_plus {
        return Some(format!("+{digits}"));
    }
    if digits.len() == 9 && digits.starts_with(['6', '7', '8', '9']) {
        return Some(format!("+{DEFAULT_COUNTRY_CODE}{digits}"));
    }
    Some(format!("+{digits}"))
}

/// Digits only, without the leading `+` (the Meta Cloud API format).
pub fn digits_only(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanish_mobile_gets_country_code() {
        assert_eq!(normalize_for_whatsapp("612345678").as_deref(), Some("+34612345678"));
        assert_eq!(normalize_for_whatsapp("712 345 678").as_deref(), Some("+34712345678"));
    }

    #[test]
    fn existing_country_code_is_kept() {
        assert_eq!(normalize_for_whatsapp("+44 7700 900123").as_deref(), Some("+447700900123"));
    }

    #[test]
    fn number_with_code_but_no_plus_gets_plus() {
        assert_eq!(normalize_for_whatsapp("34612345678").as_deref(), Some("+34612345678"));
    }

    #[test]
    fn punctuation_is_removed() {
        assert_eq!(normalize_for_whatsapp("(612)-345-678").as_deref(), Some("+34612345678"));
    }

    #[test]
    fn empty_number_is_none() {
        assert_eq!(normalize_for_whatsapp(" - "), None);
    }

    #[test]
    fn digits_only_strips_plus() {
        assert_eq!(digits_only("+34612345678"), "34612345678");
    }
}
