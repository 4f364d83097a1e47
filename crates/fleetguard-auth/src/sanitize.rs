//! Normalization of client-supplied identifiers before they reach logs
//! or stores.

use tracing::info;

/// Substituted for identifiers that are absent or empty.
pub const UNKNOWN: &str = "unknown";

/// Replace every CR and LF with `_` so a username or header value cannot
/// forge log lines. Absent or empty input yields [`UNKNOWN`].
///
/// Idempotent: the output never contains CR or LF.
pub fn sanitize_identifier(raw: Option<&str>, context: &str) -> String {
    let cleaned = clean(raw);
    info!(context, identifier = %cleaned, "Login identifier received");
    cleaned
}

/// Same as [`sanitize_identifier`] without the log event.
pub fn clean(raw: Option<&str>) -> String {
    match raw {
        None | Some("") => UNKNOWN.to_string(),
        Some(value) => value.replace(['\r', '\n'], "_"),
    }
}

/// Resolve the client address from proxy headers, falling back to the
/// peer address.
///
/// Takes the first entry of `X-Forwarded-For`, then `X-Real-IP`. Header
/// values that are blank or literally `unknown` are skipped.
pub fn client_ip(
    forwarded_for: Option<&str>,
    real_ip: Option<&str>,
    remote_addr: Option<&str>,
) -> String {
    let usable = |value: &str| !value.is_empty() && !value.eq_ignore_ascii_case(UNKNOWN);

    let from_forwarded = forwarded_for
        .and_then(|header| header.split(',').next())
        .map(str::trim)
        .filter(|v| usable(v));
    let from_real_ip = real_ip.map(str::trim).filter(|v| usable(v));
    let from_peer = remote_addr.map(str::trim).filter(|v| !v.is_empty());

    clean(from_forwarded.or(from_real_ip).or(from_peer))
}
