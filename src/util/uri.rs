use url::Url;

/// Resolves `href` against an optional base URI.
///
/// Absolute references ignore the base. Without a base, `href` must itself
/// be absolute.
pub fn resolve_uri(base: Option<&str>, href: &str) -> Result<Url, url::ParseError> {
    match base {
        Some(base) => Url::parse(base)?.join(href),
        None => Url::parse(href),
    }
}
