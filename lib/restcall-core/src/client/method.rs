use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::config::ConfigError;

/// HTTP methods a REST call can be issued with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    #[display("GET")]
    Get,
    /// `POST`
    #[display("POST")]
    Post,
    /// `PUT`
    #[display("PUT")]
    Put,
    /// `PATCH`
    #[display("PATCH")]
    Patch,
    /// `DELETE`
    #[display("DELETE")]
    Delete,
    /// `HEAD`
    #[display("HEAD")]
    Head,
    /// `OPTIONS`
    #[display("OPTIONS")]
    Options,
    /// `TRACE`
    #[display("TRACE")]
    Trace,
}

impl HttpMethod {
    /// All supported methods, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Head,
        Self::Options,
        Self::Trace,
    ];
}

/// Case-insensitive parsing, as used by the `http.method` configuration key.
impl FromStr for HttpMethod {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let method = match value.trim().to_ascii_lowercase().as_str() {
            "get" => Self::Get,
            "post" => Self::Post,
            "put" => Self::Put,
            "patch" => Self::Patch,
            "delete" => Self::Delete,
            "head" => Self::Head,
            "options" => Self::Options,
            "trace" => Self::Trace,
            _ => {
                return Err(ConfigError::UnknownHttpMethod {
                    value: value.to_string(),
                });
            }
        };
        Ok(method)
    }
}

impl From<HttpMethod> for http::Method {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Head => Self::HEAD,
            HttpMethod::Options => Self::OPTIONS,
            HttpMethod::Trace => Self::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>().ok(), Some(HttpMethod::Get));
        assert_eq!("Post".parse::<HttpMethod>().ok(), Some(HttpMethod::Post));
        assert_eq!(" PATCH ".parse::<HttpMethod>().ok(), Some(HttpMethod::Patch));
    }

    #[test]
    fn test_parse_unknown_method() {
        let result = "fetch".parse::<HttpMethod>();
        assert!(matches!(
            result,
            Err(ConfigError::UnknownHttpMethod { value }) if value == "fetch"
        ));
    }

    #[test]
    fn test_display_matches_http_method() {
        for method in HttpMethod::ALL {
            let http_method = http::Method::from(method);
            assert_eq!(method.to_string(), http_method.as_str());
        }
    }
}
