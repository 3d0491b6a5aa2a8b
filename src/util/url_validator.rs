use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors that can occur during URL validation.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
    /// Plain HTTP to a non-loopback host.
    #[error("Insecure base URL: HTTPS required (except localhost)")]
    InsecureBaseUrl,
}

/// Validates the backend API base URL.
///
/// HTTPS is required so the bearer token never travels in clear text. Plain
/// HTTP is accepted only for loopback hosts (`localhost`, `127.0.0.1`, `::1`),
/// which covers local development servers and test doubles.
///
/// # Examples
///
/// ```
/// use topic_desk::util::validate_base_url;
///
/// assert!(validate_base_url("https://admin.example.com/api").is_ok());
/// assert!(validate_base_url("http://localhost:3000/api").is_ok());
/// assert!(validate_base_url("http://admin.example.com/api").is_err());
/// ```
pub fn validate_base_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = parse_http_url(url_str)?;

    if url.scheme() == "http" && !is_loopback_host(&url) {
        return Err(UrlValidationError::InsecureBaseUrl);
    }

    Ok(url)
}

/// Validates a topic's website link.
///
/// Any http(s) URL with a host is accepted; the link is only stored and shown,
/// never fetched.
pub fn validate_web_link(url_str: &str) -> Result<Url, UrlValidationError> {
    parse_http_url(url_str)
}

fn parse_http_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}

fn is_loopback_host(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }

    // Strip brackets from IPv6 addresses for parsing
    let host_for_parse = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    host_for_parse
        .parse::<IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}
