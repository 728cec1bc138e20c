//! Caller credential forwarded to the upstream API.

use std::fmt;

/// An `Authorization` header value split into scheme and token.
///
/// The credential is never validated locally; it is forwarded verbatim to the
/// upstream API, which decides whether it is accepted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    scheme: String,
    token: String,
}

impl Credential {
    /// Parses `<scheme> <token>`, splitting on the first space.
    ///
    /// Returns `None` when either part is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use country_clicks::domain::entities::Credential;
    ///
    /// let credential = Credential::parse("Bearer abc123").unwrap();
    /// assert_eq!(credential.scheme(), "Bearer");
    /// assert_eq!(credential.token(), "abc123");
    ///
    /// assert!(Credential::parse("Bearer").is_none());
    /// ```
    pub fn parse(header: &str) -> Option<Self> {
        let (scheme, token) = header.split_once(' ')?;
        if scheme.is_empty() || token.is_empty() {
            return None;
        }

        Some(Self {
            scheme: scheme.to_string(),
            token: token.to_string(),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Rebuilds the header value for upstream requests.
    pub fn header_value(&self) -> String {
        format!("{} {}", self.scheme, self.token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("scheme", &self.scheme)
            .field("token", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer() {
        let credential = Credential::parse("Bearer secret").unwrap();
        assert_eq!(credential.scheme(), "Bearer");
        assert_eq!(credential.token(), "secret");
        assert_eq!(credential.header_value(), "Bearer secret");
    }

    #[test]
    fn test_parse_accepts_any_scheme() {
        let credential = Credential::parse("Token abc").unwrap();
        assert_eq!(credential.scheme(), "Token");
    }

    #[test]
    fn test_parse_splits_on_first_space() {
        let credential = Credential::parse("Bearer a b").unwrap();
        assert_eq!(credential.token(), "a b");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Credential::parse("").is_none());
        assert!(Credential::parse("Bearer").is_none());
        assert!(Credential::parse("Bearer ").is_none());
        assert!(Credential::parse(" token").is_none());
    }

    #[test]
    fn test_debug_masks_token() {
        let credential = Credential::parse("Bearer secret").unwrap();
        let debug = format!("{:?}", credential);
        assert!(debug.contains("Bearer"));
        assert!(!debug.contains("secret"));
    }
}
