//! Absolute URL validation

use url::Url;

/// Returns `true` when `value` parses as an absolute URL.
///
/// # Examples
///
/// ```
/// use archmodel_core::url::is_url;
///
/// assert!(is_url("https://example.com/docs"));
/// assert!(!is_url("www.example.com"));
/// ```
pub fn is_url(value: &str) -> bool {
    Url::parse(value.trim()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_urls_are_accepted() {
        assert!(is_url("http://www.somedomain.com"));
        assert!(is_url("https://structurizr.com/help/themes/default.json"));
    }

    #[test]
    fn test_relative_and_blank_values_are_rejected() {
        assert!(!is_url("www.somedomain.com"));
        assert!(!is_url("/relative/path"));
        assert!(!is_url(""));
    }
}
