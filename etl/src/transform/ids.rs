//! Identifier normalization and number formatting for DDF output.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default number of significant figures for datapoint values.
pub const DEFAULT_SIGFIG: usize = 5;

/// Most significant figures an `f64` can carry.
pub const MAX_SIGFIG: usize = 17;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\W_]+").expect("Invalid identifier regex"));

/// Convert a name or code into a DDF identifier.
///
/// Every run of non-word characters (or underscores) becomes one `_`,
/// then the result is lowercased. Applying it twice changes nothing.
///
/// ```
/// use igme_ddf::to_concept_id;
///
/// assert_eq!(to_concept_id("U5MR.Lower"), "u5mr_lower");
/// assert_eq!(to_concept_id("ISO Code"), "iso_code");
/// ```
pub fn to_concept_id(s: &str) -> String {
    NON_WORD.replace_all(s, "_").to_lowercase()
}

/// Render `value` rounded to `sigfig` significant figures.
///
/// Plain decimal notation, trailing zeros and a dangling `.` removed.
/// `sigfig` is clamped to `1..=MAX_SIGFIG`.
///
/// ```
/// use igme_ddf::format_float_sigfig;
///
/// assert_eq!(format_float_sigfig(5.0, 5), "5");
/// assert_eq!(format_float_sigfig(123.456789, 5), "123.46");
/// ```
pub fn format_float_sigfig(value: f64, sigfig: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let sigfig = sigfig.clamp(1, MAX_SIGFIG) as i32;
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = sigfig - 1 - magnitude;

    let text = if decimals > 0 {
        format!("{:.*}", decimals as usize, value)
    } else {
        // digits left of the rounding position, then zeros for the rest
        let mantissa = (value / 10f64.powi(-decimals)).round();
        format!("{:.0}{}", mantissa, "0".repeat(-decimals as usize))
    };

    trim_trailing_zeros(text)
}

fn trim_trailing_zeros(text: String) -> String {
    if !text.contains('.') {
        return text;
    }
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
