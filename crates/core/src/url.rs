//! URL normalisation helpers.
//!
//! Canonical page URLs always start and end with `/` and never contain empty
//! segments: the root is `/`, a child with slug `about` is `/about/`.

/// Collapse a raw path into canonical form without validating it.
///
/// Surrounding whitespace is trimmed, a leading and trailing `/` are added,
/// and runs of `/` are collapsed.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('/');
    for segment in raw.trim().split('/').filter(|s| !s.is_empty()) {
        out.push_str(segment);
        out.push('/');
    }
    out
}

/// Normalise an incoming request path.
///
/// Anything after a `?` or `#` is dropped. Returns `None` when the path cannot
/// name a page: it contains control characters or a `.`/`..` segment.
pub fn clean_url(raw: &str) -> Option<String> {
    let path = raw.split(['?', '#']).next().unwrap_or_default();
    if path.chars().any(char::is_control) {
        return None;
    }
    if path.split('/').any(|s| s == "." || s == "..") {
        return None;
    }
    Some(normalize(path))
}

/// URL of a child with `slug` under a parent whose URL is `parent_url`.
pub fn child_url(parent_url: &str, slug: &str) -> String {
    normalize(&format!("{parent_url}/{slug}"))
}

/// URL of a root page with `slug` (usually `""` or `"/"`).
pub fn root_url(slug: &str) -> String {
    normalize(slug)
}

/// If `url` lies under `prefix`, return the path segment right after it.
///
/// `prefix` is a canonical URL (ends with `/`). The returned segment is empty
/// when `url == prefix`.
pub fn next_segment<'a>(url: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = url.strip_prefix(prefix)?;
    Some(rest.split('/').next().unwrap_or_default())
}
