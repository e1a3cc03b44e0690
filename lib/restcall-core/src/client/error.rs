use super::HttpMethod;
use super::auth::CredentialsError;
use super::config::ConfigError;
use super::executor::TransportError;
use super::validation::ValidationError;

/// Errors that can occur when configuring, executing or inspecting a REST call.
///
/// Every error surfaces synchronously at the method that caused it. Nothing is logged
/// and swallowed inside the crate.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum RestCallError {
    /// A response accessor was used before the call was executed.
    ///
    /// The `accessor` names the offending method, e.g. `RestCall::response_status_code`.
    #[display("REST call not yet performed, cannot use '{accessor}'")]
    #[from(skip)]
    NotYetExecuted {
        /// Name of the accessor that was called too early.
        accessor: &'static str,
    },

    /// The call cannot be composed into a URL because no host is configured.
    #[display("Cannot compose the URL of the REST call: no host configured")]
    #[from(skip)]
    MissingHost,

    /// The call was executed without an HTTP method.
    #[display("Cannot execute the REST call: no HTTP method configured")]
    #[from(skip)]
    MethodNotSet,

    /// The client was built without HTTP executor.
    #[display("Cannot build the REST client: no HTTP executor configured")]
    #[from(skip)]
    MissingExecutor,

    /// The HTTP executor does not implement this method.
    ///
    /// Raised before any network attempt.
    #[display("HTTP method '{method}' is not yet supported")]
    #[from(skip)]
    UnsupportedMethod {
        /// The rejected method.
        method: HttpMethod,
    },

    /// The HTTP executor failed to perform the request.
    Transport(TransportError),

    /// A registered validator rejected the response.
    #[display("Validation '{validator}' failed: {error}")]
    #[from(skip)]
    Validation {
        /// Identity of the descriptor that contributed the validator.
        validator: String,
        /// The validator failure.
        error: ValidationError,
    },

    /// Invalid global configuration.
    Config(ConfigError),

    /// Invalid credentials.
    Credentials(CredentialsError),

    /// The response body is not valid JSON.
    JsonError(serde_json::Error),

    /// A structured document query used an invalid path.
    #[display("Invalid document path '{path}': {message}")]
    #[from(skip)]
    InvalidDocumentPath {
        /// The rejected path.
        path: String,
        /// Why the path was rejected.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_call_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<RestCallError>();
        assert_sync::<RestCallError>();
    }

    #[test]
    fn test_not_yet_executed_names_accessor() {
        let error = RestCallError::NotYetExecuted {
            accessor: "RestCall::response_status_code",
        };

        insta::assert_snapshot!(
            error,
            @"REST call not yet performed, cannot use 'RestCall::response_status_code'"
        );
    }

    #[test]
    fn test_unsupported_method_message() {
        let error = RestCallError::UnsupportedMethod {
            method: HttpMethod::Patch,
        };

        assert_eq!(
            error.to_string(),
            "HTTP method 'PATCH' is not yet supported"
        );
    }
}
