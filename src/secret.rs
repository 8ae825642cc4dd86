use std::fmt;

/// A credential that must not show up in logs or rendered configuration.
///
/// `Debug` and `Display` always print `[REDACTED]`; the value is reachable
/// only through [`expose_secret`](Self::expose_secret). Deployment server
/// passwords are held this way so that printing a configuration record is
/// always safe.
///
/// # Examples
///
/// ```
/// use webscript_container::Secret;
///
/// let password = Secret::new("deploy-pass".to_string());
/// assert_eq!(format!("{:?}", password), "[REDACTED]");
/// assert_eq!(password.expose_secret(), "deploy-pass");
/// ```
// Do not derive Clone or Debug: copies and derived output would bypass redaction.
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a credential.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Returns the wrapped credential.
    ///
    /// Callers must not log or display the result.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }

    /// Consumes the wrapper and returns the credential.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> From<T> for Secret<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting_never_reveals_the_credential() {
        let password = Secret::new("fsr-pa55".to_string());
        assert_eq!(format!("{:?}", password), "[REDACTED]");
        assert_eq!(format!("{}", password), "[REDACTED]");
        assert_eq!(format!("{:?}", Some(&password)), "Some([REDACTED])");
    }

    #[test]
    fn credential_is_reachable_explicitly() {
        let password = Secret::from(String::from("s3cret"));
        assert_eq!(password.expose_secret(), "s3cret");
        assert_eq!(password.into_inner(), "s3cret");
    }
}
