//! Staff account bootstrap from environment variables.
//!
//! Reads `ADMIN_USERNAME` and `ADMIN_PASSWORD` from the environment (usually
//! via `.env`). Both must be set for an account to be bootstrapped.

/// Credentials for the staff account created on start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    /// Login name
    pub username: String,
    /// Plain-text password, hashed before it is stored
    pub password: String,
}

/// Gets the configured staff credentials, if any.
///
/// # Returns
///
/// `Some` only when both variables are present and non-empty.
#[must_use]
pub fn get_admin_credentials() -> Option<AdminCredentials> {
    from_values(
        std::env::var("ADMIN_USERNAME").ok(),
        std::env::var("ADMIN_PASSWORD").ok(),
    )
}

fn from_values(username: Option<String>, password: Option<String>) -> Option<AdminCredentials> {
    match (username, password) {
        (Some(username), Some(password))
            if !username.trim().is_empty() && !password.is_empty() =>
        {
            Some(AdminCredentials {
                username: username.trim().to_string(),
                password,
            })
        }
        _ => None,
    }
}
