use std::{convert::TryFrom, fmt::Display, net::IpAddr};

use serde::Serialize;
use url::Url;

use crate::ErrorKind;

/// A validated fetch target.
///
/// Wraps a [`Url`] which is guaranteed to be an absolute `http` or `https`
/// URL with a host (domain or IP literal). Optional port, path and query
/// are allowed. Anything else is rejected at construction, before any
/// rate-limit budget is consumed.
#[derive(Clone, Debug, PartialOrd, Ord, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Target {
    url: Url,
}

impl Target {
    /// Returns the string representation of the target URL.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    #[inline]
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.url.domain()
    }

    #[must_use]
    pub fn host_ip(&self) -> Option<IpAddr> {
        match self.url.host()? {
            url::Host::Domain(_) => None,
            url::Host::Ipv4(v4_addr) => Some(v4_addr.into()),
            url::Host::Ipv6(v6_addr) => Some(v6_addr.into()),
        }
    }
}

impl AsRef<str> for Target {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for Target {
    type Error = ErrorKind;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let url = Url::parse(s).map_err(|e| ErrorKind::InvalidTarget(s.to_owned(), e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ErrorKind::UnsupportedScheme(
                s.to_owned(),
                url.scheme().to_owned(),
            ));
        }
        if url.host_str().is_none() {
            return Err(ErrorKind::MissingHost(s.to_owned()));
        }
        Ok(Target { url })
    }
}

impl TryFrom<String> for Target {
    type Error = ErrorKind;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_from(s.as_str())
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
