//! Core business logic - framework-agnostic cat, achievement and account operations.
//!
//! Nothing in here knows about HTTP. Functions take a database connection (or
//! transaction) and validated input, and return models or crate errors.

/// Accounts, password hashing and API tokens
pub mod account;
/// Achievement catalog and the name resolver used by cat writes
pub mod achievement;
/// Age derived from birth year
pub mod age;
/// Cat CRUD with nested achievement writes
pub mod cat;
/// Color name <-> hex palette
pub mod color;
/// Image upload decoding and storage
pub mod image;
/// Client-facing shapes of stored records
pub mod representation;
/// Payload validation
pub mod validation;
