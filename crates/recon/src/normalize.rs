//! Identifier normalization shared by every ingestion path.
//!
//! All functions here are pure and total: malformed input degrades to an
//! empty or zero value instead of failing. The canonicalizer, the extras
//! lookup, the legacy loader and the sync builder all route through these,
//! so equivalent inputs produce byte-identical IDs regardless of source.

/// Legacy promotional prefix found in upstream set codes.
pub const PROMO_PREFIX: &str = "PROMO-";
/// Canonical promotional prefix.
pub const PROMO_CANONICAL: &str = "P-";

const MIN_NUMBER_WIDTH: usize = 3;

/// Normalize a raw card number into `(zero_padded, value)`.
///
/// All-digit input is padded to three places (wider input keeps its width).
/// Anything else keeps only its digit characters, in order. No digits at all
/// yields `("000", 0)`.
pub fn normalize_number(raw: &str) -> (String, u32) {
    let trimmed = raw.trim();
    let digits: String = if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        trimmed.to_string()
    } else {
        trimmed.chars().filter(|c| c.is_ascii_digit()).collect()
    };

    if digits.is_empty() {
        return ("0".repeat(MIN_NUMBER_WIDTH), 0);
    }

    // Overflowing values keep their text; the integer form is best-effort.
    let value = digits.parse::<u32>().unwrap_or(0);
    (pad_number_str(&digits), value)
}

/// Zero-pad a digit string to the canonical minimum width.
pub fn pad_number_str(digits: &str) -> String {
    format!("{digits:0>MIN_NUMBER_WIDTH$}")
}

/// Zero-pad an integer card number.
pub fn pad_number(number: u32) -> String {
    format!("{number:03}")
}

/// Normalize a set code: trim, uppercase, `PROMO-x` → `P-X`.
pub fn normalize_set(raw: &str) -> String {
    strip_promo(raw.trim().to_uppercase())
}

/// Normalize an already-assembled ID (or any string starting with a set
/// code). Same rule as [`normalize_set`]; the number suffix is untouched.
pub fn normalize_id(raw: &str) -> String {
    normalize_set(raw)
}

fn strip_promo(upper: String) -> String {
    match upper.strip_prefix(PROMO_PREFIX) {
        Some(rest) => format!("{PROMO_CANONICAL}{rest}"),
        None => upper,
    }
}

pub fn build_id(set: &str, padded_number: &str) -> String {
    format!("{set}-{padded_number}")
}

/// Series letter for a set code.
///
/// `P-A` → `A` (first char after the last `-`), `A1` → `A`, `""` → `""`.
pub fn derive_series(set: &str) -> String {
    let segment = match set.rsplit_once('-') {
        Some((_, tail)) => tail,
        None => set,
    };
    segment.chars().next().map(String::from).unwrap_or_default()
}

/// Set-code prefix of a canonical ID (everything before the first `-`).
pub fn expansion_of(id: &str) -> &str {
    id.split_once('-').map(|(head, _)| head).unwrap_or(id)
}
