//! Field-level validators and input sanitizers shared by the tenant and
//! contract forms. All functions are pure; sanitizers are idempotent.

const DNI_LEN: usize = 8;
const PHONE_LEN: usize = 9;

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic()
        || matches!(
            c,
            'á' | 'é' | 'í' | 'ó' | 'ú' | 'ü' | 'ñ' | 'Á' | 'É' | 'Í' | 'Ó' | 'Ú' | 'Ü' | 'Ñ'
        )
        || matches!(c, ' ' | '\'' | '-')
}

/// A full name is valid when, trimmed, it has at least two characters and
/// contains only letters (including the Spanish accented set), spaces,
/// apostrophes, and hyphens.
pub fn is_valid_full_name(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.chars().count() >= 2 && trimmed.chars().all(is_name_char)
}

/// Strips characters outside the name character class as the user types.
pub fn sanitize_name_input(raw: &str) -> String {
    raw.chars().filter(|c| is_name_char(*c)).collect()
}

/// National ID: exactly 8 ASCII digits.
pub fn is_valid_dni(raw: &str) -> bool {
    raw.len() == DNI_LEN && raw.bytes().all(|b| b.is_ascii_digit())
}

fn keep_digits(raw: &str, max_len: usize) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(max_len)
        .collect()
}

/// Progressive input mask for the DNI field: digits only, capped at 8.
pub fn sanitize_dni_input(raw: &str) -> String {
    keep_digits(raw, DNI_LEN)
}

/// WhatsApp phone: empty (the field is optional) or exactly 9 ASCII digits.
pub fn is_valid_phone(raw: &str) -> bool {
    raw.is_empty() || (raw.len() == PHONE_LEN && raw.bytes().all(|b| b.is_ascii_digit()))
}

/// Progressive input mask for the phone field: digits only, capped at 9.
pub fn sanitize_phone_input(raw: &str) -> String {
    keep_digits(raw, PHONE_LEN)
}

/// Shape check only: exactly one `@`, a non-empty local part, and a dot
/// inside the domain. Deliberately not RFC validation.
pub fn is_valid_email(raw: &str) -> bool {
    let trimmed = raw.trim();
    let Some((local, domain)) = trimmed.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Drops whitespace from an email field while the user types.
pub fn sanitize_email_input(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}
