use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::HeaderValue;

use super::token::{StaticToken, TokenSource};
use crate::error::AuthError;

/// A resolved `(scheme, value)` pair, e.g. `("Bearer", "abc")`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeader {
    scheme: String,
    value: String,
}

impl AuthHeader {
    /// Creates a header from its two parts.
    pub fn new(scheme: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            value: value.into(),
        }
    }

    /// The authentication scheme.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The credentials part.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Encodes `"<scheme> <value>"` as a sensitive header value.
    ///
    /// ## Errors
    ///
    /// Returns [`AuthError::InvalidHeaderValue`] if the credentials contain
    /// bytes that are not allowed in a header.
    pub fn to_header_value(&self) -> Result<HeaderValue, AuthError> {
        let mut value = HeaderValue::try_from(format!("{} {}", self.scheme, self.value))
            .map_err(|_| AuthError::InvalidHeaderValue)?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHeader")
            .field("scheme", &self.scheme)
            .field("value", &"***")
            .finish()
    }
}

/// How the authorization header is produced.
///
/// The header is resolved again for every request; nothing is remembered
/// between requests.
#[derive(Clone, Default)]
pub enum AuthStrategy {
    /// No authorization header.
    #[default]
    None,
    /// HTTP Basic with a fixed username and password.
    Basic {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
    /// Bearer token fetched from the source on every request.
    Bearer(Arc<dyn TokenSource>),
}

impl AuthStrategy {
    /// Basic credentials.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Bearer tokens from `source`.
    pub fn bearer(source: impl TokenSource + 'static) -> Self {
        Self::Bearer(Arc::new(source))
    }

    /// A fixed Bearer token.
    pub fn bearer_token(token: impl Into<String>) -> Self {
        Self::bearer(StaticToken::new(token))
    }

    /// The scheme this strategy produces, if any.
    pub fn scheme(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Basic { .. } => Some("Basic"),
            Self::Bearer(_) => Some("Bearer"),
        }
    }

    /// Produces the header for the current request.
    ///
    /// Basic credentials are encoded as UTF-8 before base64.
    ///
    /// ## Errors
    ///
    /// Returns [`AuthError::CredentialUnavailable`] if the token source fails
    /// or hands out an empty token.
    pub async fn resolve_header(&self) -> Result<Option<AuthHeader>, AuthError> {
        match self {
            Self::None => Ok(None),
            Self::Basic { username, password } => {
                let encoded = STANDARD.encode(format!("{username}:{password}"));
                Ok(Some(AuthHeader::new("Basic", encoded)))
            }
            Self::Bearer(source) => {
                let token = source.token().await?;
                if token.is_empty() {
                    return Err(AuthError::unavailable("token source returned an empty token"));
                }
                Ok(Some(AuthHeader::new("Bearer", token)))
            }
        }
    }
}

impl fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::Bearer(_) => f.write_str("Bearer(..)"),
        }
    }
}
