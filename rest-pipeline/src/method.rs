//! HTTP verbs understood by [`RestClient`](crate::RestClient).

use strum::{Display, EnumIter, EnumString};

/// The verbs the client exposes as first-class entry points.
///
/// Every verb is turned into a plain [`reqwest::Method`] before it enters the
/// handler chain, so PATCH (or anything built with
/// [`RestClient::request`](crate::RestClient::request)) travels the exact same
/// path as GET.
///
/// ## Examples
///
/// ```rust
/// use rest_pipeline::RestMethod;
///
/// let verb: RestMethod = "PATCH".parse().unwrap();
/// assert_eq!(verb, RestMethod::Patch);
/// assert_eq!(reqwest::Method::from(verb).as_str(), "PATCH");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RestMethod {
    /// Read a resource.
    Get,
    /// Create a resource or trigger an action.
    Post,
    /// Replace a resource.
    Put,
    /// Partially update a resource.
    Patch,
    /// Remove a resource.
    Delete,
    /// Read headers only.
    Head,
    /// Query supported methods.
    Options,
}

impl RestMethod {
    /// Converts to the method record sent through the pipeline.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
            Self::Head => reqwest::Method::HEAD,
            Self::Options => reqwest::Method::OPTIONS,
        }
    }
}

impl From<RestMethod> for reqwest::Method {
    fn from(method: RestMethod) -> Self {
        method.to_reqwest()
    }
}
