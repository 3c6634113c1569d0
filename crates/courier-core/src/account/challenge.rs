//! Challenge handler port: where sign-in answers come from.
//!
//! The registry never prompts on its own. It asks a `ChallengeHandler` for
//! each piece of input the transport requests; returning `None` aborts the
//! sign-in.

use std::future::Future;

/// Supplies verification answers during account sign-in.
pub trait ChallengeHandler: Send + Sync {
    /// The one-time code the network sent to `phone`.
    fn request_code(&self, phone: &str) -> impl Future<Output = Option<String>> + Send;

    /// The account's two-factor password.
    fn request_password(
        &self,
        phone: &str,
        hint: Option<&str>,
    ) -> impl Future<Output = Option<String>> + Send;

    /// A profile name for a phone that has never signed up.
    ///
    /// The answer is split on the first whitespace into first and last name.
    fn request_profile_name(&self, phone: &str) -> impl Future<Output = Option<String>> + Send;
}

/// Challenge handler with answers supplied up front.
///
/// Used by the REST surface, where the caller sends every answer in one
/// request, and by tests.
#[derive(Debug, Clone, Default)]
pub struct PresetChallenge {
    pub code: Option<String>,
    pub password: Option<String>,
    pub profile_name: Option<String>,
}

impl PresetChallenge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_profile_name(mut self, name: impl Into<String>) -> Self {
        self.profile_name = Some(name.into());
        self
    }
}

impl ChallengeHandler for PresetChallenge {
    async fn request_code(&self, _phone: &str) -> Option<String> {
        self.code.clone()
    }

    async fn request_password(&self, _phone: &str, _hint: Option<&str>) -> Option<String> {
        self.password.clone()
    }

    async fn request_profile_name(&self, _phone: &str) -> Option<String> {
        self.profile_name.clone()
    }
}

/// Split a profile name into first and last name.
///
/// ```
/// use courier_core::account::challenge::split_profile_name;
///
/// assert_eq!(split_profile_name("Ann Lee Smith"), ("Ann".to_string(), "Lee Smith".to_string()));
/// assert_eq!(split_profile_name("  Ann "), ("Ann".to_string(), String::new()));
/// ```
pub fn split_profile_name(full: &str) -> (String, String) {
    let trimmed = full.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, last)) => (first.to_string(), last.trim().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}
