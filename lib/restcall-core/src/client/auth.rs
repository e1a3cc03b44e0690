use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Characters kept as-is in the user info part of a URL (RFC 3986 unreserved).
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Errors raised when building [`Credentials`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum CredentialsError {
    /// Credentials always require a username.
    #[display("Credentials require a non empty username")]
    MissingUsername,
}

/// Password kept out of logs and wiped from memory on drop.
///
/// Neither `Debug` nor `Display` ever print the value. The only way to read it back is
/// [`SecureString::as_str`].
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Wraps a secret.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The secret in clear.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if no secret was given.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_empty() { "SecureString(<empty>)" } else { "SecureString(***)" })
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_empty() {
            f.write_str("***")?;
        }
        Ok(())
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Username and password carried into the URL of a REST call.
///
/// The username is mandatory and checked when the credentials are created, not when
/// the URL is composed.
///
/// ```rust
/// use restcall_core::{Credentials, CredentialsError};
///
/// let credentials = Credentials::new("john", "secret")?;
/// assert_eq!(credentials.username(), "john");
///
/// assert_eq!(Credentials::new("", "secret"), Err(CredentialsError::MissingUsername));
/// # Ok::<(), CredentialsError>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: SecureString,
}

impl Credentials {
    /// Creates new credentials.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError::MissingUsername`] if the username is empty.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<SecureString>,
    ) -> Result<Self, CredentialsError> {
        let username = username.into();
        if username.is_empty() {
            return Err(CredentialsError::MissingUsername);
        }
        Ok(Self {
            username,
            password: password.into(),
        })
    }

    /// The username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The password, possibly empty.
    pub fn password(&self) -> &SecureString {
        &self.password
    }

    /// Percent-encoded `user[:password]` form used as URL user info.
    pub(in crate::client) fn to_userinfo(&self) -> String {
        let username = utf8_percent_encode(&self.username, USERINFO);
        if self.password.is_empty() {
            return username.to_string();
        }
        let password = utf8_percent_encode(self.password.as_str(), USERINFO);
        format!("{username}:{password}")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password)
            .finish()
    }
}

/// Displays the user info as it would appear in a URL, with the password hidden.
impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)?;
        if !self.password.is_empty() {
            write!(f, ":{}", self.password)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_username_is_rejected_eagerly() {
        let result = Credentials::new("", "password");

        assert_eq!(result, Err(CredentialsError::MissingUsername));
    }

    #[test]
    fn test_empty_password_is_allowed() {
        let credentials = Credentials::new("user", "").expect("valid credentials");

        assert!(credentials.password().is_empty());
        assert_eq!(credentials.to_userinfo(), "user");
    }

    #[test]
    fn test_userinfo_is_percent_encoded() {
        let credentials = Credentials::new("user@corp", "p:ss w/rd").expect("valid credentials");

        assert_eq!(credentials.to_userinfo(), "user%40corp:p%3Ass%20w%2Frd");
    }

    #[test]
    fn test_debug_hides_password() {
        let credentials = Credentials::new("user", "secret-password").expect("valid credentials");

        insta::assert_snapshot!(
            format!("{credentials:?}"),
            @r#"Credentials { username: "user", password: SecureString(***) }"#
        );
    }

    #[test]
    fn test_display_hides_password() {
        let with_password = Credentials::new("user", "hunter2").expect("valid credentials");
        let without_password = Credentials::new("user", "").expect("valid credentials");

        assert_eq!(with_password.to_string(), "user:***");
        assert_eq!(without_password.to_string(), "user");
    }

    #[test]
    fn test_secure_string_keeps_value() {
        let secret = SecureString::new("s3cr3t");

        assert_eq!(secret.as_str(), "s3cr3t");
        assert_eq!(format!("{secret:?}"), "SecureString(***)");
        assert_eq!(format!("{:?}", SecureString::default()), "SecureString(<empty>)");
    }
}
