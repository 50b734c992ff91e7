//! # Scan Text Normalization
//!
//! Turns raw scanner output into a canonical lookup candidate.
//!
//! ## What Scanners Actually Emit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Input source              Raw text                                     │
//! │  ────────────────────────  ───────────────────────────────────────────  │
//! │  FoodPass badge            FP-12345678-9                                │
//! │  Cédula QR (new format)    https://portal.sidiv.registrocivil.cl/      │
//! │                              docstatus?RUN=12.345.678-9&type=CEDULA...  │
//! │  Manual RUT entry          12.345.678-9  /  12345678-9                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Normalization only trims, unwraps the civil-registry URL and uppercases.
//! Punctuation-insensitive matching is the resolver's job - stripping dots
//! here would break exact scan-code lookups.

/// Markers identifying a civil-registry document-validity URL.
const CIVIL_REGISTRY_MARKERS: [&str; 2] = ["registrocivil.cl", "document-validity"];

/// Query parameter carrying the RUN (RUT) in civil-registry URLs.
const RUN_PARAM: &str = "RUN=";

/// Normalizes raw scanner text into a lookup candidate.
///
/// - Trims whitespace.
/// - If the text is a civil-registry validity URL, extracts the `RUN` query
///   parameter; if extraction fails the trimmed text is used as-is.
/// - Uppercases the result.
///
/// Never fails and is idempotent: `normalize_scan(normalize_scan(x))`
/// equals `normalize_scan(x)` for any input.
pub fn normalize_scan(raw: &str) -> String {
    let trimmed = raw.trim();

    let candidate = if CIVIL_REGISTRY_MARKERS.iter().any(|m| trimmed.contains(m)) {
        extract_run_param(trimmed).unwrap_or(trimmed)
    } else {
        trimmed
    };

    candidate.to_uppercase()
}

/// Pulls the value of the `RUN` query parameter out of a URL, stopping at
/// the next `&` or `#`.
fn extract_run_param(url: &str) -> Option<&str> {
    let start = url
        .find(&format!("?{RUN_PARAM}"))
        .or_else(|| url.find(&format!("&{RUN_PARAM}")))?
        + 1
        + RUN_PARAM.len();

    let rest = &url[start..];
    let end = rest.find(['&', '#']).unwrap_or(rest.len());
    let value = &rest[..end];

    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Strips dots and hyphens and uppercases: the punctuation-insensitive form
/// used for fuzzy matching. `12.345.678-9` → `123456789`.
pub fn strip_code(code: &str) -> String {
    code.chars()
        .filter(|c| *c != '.' && *c != '-')
        .collect::<String>()
        .to_uppercase()
}

/// Strips a badge scan code down to its punctuation-insensitive identity:
/// removes the `FP-` prefix, then dots and hyphens. `FP-12345678-9` → `123456789`.
pub fn strip_scan_code(code: &str) -> String {
    let without_prefix = code
        .strip_prefix(crate::SCAN_CODE_PREFIX)
        .unwrap_or(code);
    strip_code(without_prefix)
}

// =============================================================================
// Unit Tests
// =============================================================================
