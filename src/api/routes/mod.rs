//! Endpoint handlers grouped by resource.

/// `/api/users/` and `/api/token/`
pub mod accounts;
/// `/api/achievements/`
pub mod achievements;
/// `/api/cats/`
pub mod cats;
