//! Domain extraction — the network-location (host[:port]) portion of a page
//! URL.
//!
//! A URL that fails to parse, or parses without a host (relative paths,
//! `mailto:` and friends), is rejected outright. The collection pipeline
//! treats an un-derivable domain as bad input, not as an empty string.

use url::Url;

use crate::{Error, Result, detection::MAX_DOMAIN_LEN};

/// Extract `host` (or `host:port` for a non-default port) from `url`.
pub fn extract_domain(url: &str) -> Result<String> {
  let parsed =
    Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url:?}: {e}")))?;

  let host = parsed
    .host_str()
    .ok_or_else(|| Error::InvalidUrl(format!("{url:?} has no host")))?;

  let domain = match parsed.port() {
    Some(port) => format!("{host}:{port}"),
    None => host.to_owned(),
  };

  if domain.chars().count() > MAX_DOMAIN_LEN {
    return Err(Error::FieldTooLong {
      field: "domain",
      max:   MAX_DOMAIN_LEN,
    });
  }

  Ok(domain)
}
