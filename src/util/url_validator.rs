use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors from validating the configured server URL.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// Plain http to anything but this machine would send the session
    /// cookie in cleartext.
    #[error("Plain http is only allowed for localhost, got host {0}")]
    InsecureRemote(String),
    #[error("URL has no host")]
    MissingHost,
}

/// Validate the list server's base URL.
///
/// Accepts `https://` anywhere and `http://` only for loopback hosts
/// (`localhost`, `127.0.0.0/8`, `::1`), which is how the server runs in
/// development.
///
/// # Examples
///
/// ```
/// use shoplist::util::validate_server_url;
///
/// assert!(validate_server_url("https://lists.example.com").is_ok());
/// assert!(validate_server_url("http://localhost:5000").is_ok());
/// assert!(validate_server_url("http://lists.example.com").is_err());
/// assert!(validate_server_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_server_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    let host = url.host_str().ok_or(UrlValidationError::MissingHost)?;
    match url.scheme() {
        "https" => {}
        "http" if is_loopback_host(host) => {}
        "http" => return Err(UrlValidationError::InsecureRemote(host.to_owned())),
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    Ok(url)
}

fn is_loopback_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    // Strip brackets from IPv6 addresses for parsing
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}
