//! URL repair — the one function applied to catalog URLs, retrieval candidates, and
//! reranker output alike. Idempotent: `repair_url(repair_url(x)) == repair_url(x)`.

/// Path appended to the base URL when a record has no URL at all.
pub const MISSING_URL_PATH: &str = "missing-url";

/// The sentinel URL substituted for absent or blank URLs.
pub fn missing_url(base: &str) -> String {
    join_base(base, MISSING_URL_PATH)
}

/// Repairs a possibly-absent URL into an absolute one.
///
/// Rules, in order:
/// 1. absent or blank → `{base}/missing-url`
/// 2. all digits → `{base}/{digits}` (catalog identifier)
/// 3. `http://` / `https://` → unchanged
/// 4. `www.` host without protocol → `https://` prefixed
/// 5. anything else is a path → `{base}/{path}` with a single `/`
pub fn repair_url(raw: Option<&str>, base: &str) -> String {
    let url = match raw.map(str::trim) {
        Some(u) if !u.is_empty() => u,
        _ => return missing_url(base),
    };

    if url.chars().all(|c| c.is_ascii_digit()) {
        return join_base(base, url);
    }
    if has_protocol(url) {
        return url.to_string();
    }
    if url.starts_with("www.") {
        return format!("https://{url}");
    }
    join_base(base, url)
}

/// Joins a path suffix to the base URL with exactly one `/` between them.
pub fn join_base(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim().trim_start_matches('/')
    )
}

/// Whether a raw catalog value already looks like a URL rather than a path suffix.
pub fn looks_like_url(value: &str) -> bool {
    value.contains("http") || value.contains("www")
}

fn has_protocol(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
