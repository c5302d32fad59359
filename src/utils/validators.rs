//! Format validation and code generation helpers.

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^VIP-[A-Z0-9]{8}$").expect("valid registration code regex"));

static PHONE_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{10,15}$").expect("valid phone regex"));

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Phone numbers are optional and loosely formatted; after stripping
/// separators they must be 10-15 digits.
pub fn is_valid_phone(phone: &str) -> bool {
    let cleaned: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '+'))
        .collect();
    PHONE_DIGITS_RE.is_match(&cleaned)
}

/// Registration codes are `VIP-` followed by 8 uppercase alphanumerics.
pub fn is_valid_registration_code(code: &str) -> bool {
    CODE_RE.is_match(code)
}

/// Generate a fresh registration code. Uniqueness is the caller's job
/// (checked against the store, regenerating on collision).
pub fn generate_registration_code() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..8)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("VIP-{suffix}")
}

/// Generate an opaque ticket id: `TKT-{timestamp}-{random}`.
pub fn generate_ticket_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..8)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("TKT-{}-{}", Utc::now().format("%Y%m%d%H%M%S"), suffix)
}

/// Whole years elapsed since `date_of_birth` as of today.
pub fn age_in_years(date_of_birth: NaiveDate) -> i32 {
    let today = Utc::now().date_naive();
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}
