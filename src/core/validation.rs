//! Field validation for inbound payloads.
//!
//! Payloads arrive as loosely typed JSON objects. Every field is checked and all
//! problems are collected into one [`FieldErrors`] map, so a client sees every
//! missing or malformed field in a single response. Nothing here touches the
//! database.

use crate::core::{color, image};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Message for a required key that is absent.
pub const REQUIRED: &str = "This field is required.";
/// Message for an explicit JSON `null` on a non-nullable field.
pub const NOT_NULL: &str = "This field may not be null.";
/// Message for an empty or whitespace-only string.
pub const BLANK: &str = "This field may not be blank.";
/// Message for a value that is not a string.
pub const NOT_A_STRING: &str = "Not a valid string.";
/// Message for a `birth_year` that is present but not an integer.
pub const INVALID_INTEGER: &str = "A valid integer is required.";
/// Message for a color name outside the palette.
pub const UNKNOWN_COLOR: &str = "No color with this name.";

/// Longest accepted cat name, in characters.
pub const CAT_NAME_MAX_LEN: usize = 16;
/// Longest accepted achievement name, in characters.
pub const ACHIEVEMENT_NAME_MAX_LEN: usize = 64;
/// Longest accepted username, in characters.
pub const USERNAME_MAX_LEN: usize = 150;
/// Shortest accepted password, in characters.
pub const PASSWORD_MIN_LEN: usize = 8;

/// External key carrying an achievement's name.
pub const ACHIEVEMENT_NAME_KEY: &str = "achievement_name";

/// Validation failures keyed by field name, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Creates an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map holding a single error.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records an error against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Whether any error was recorded for `field`.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Whether no error was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(value)` when empty, otherwise the collected errors.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// How strictly a write payload is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// New record: required fields must be present.
    Create,
    /// Full update (PUT): required fields must be present.
    Replace,
    /// Partial update (PATCH): every field is optional.
    Partial,
}

impl WriteMode {
    const fn requires_all(self) -> bool {
        matches!(self, Self::Create | Self::Replace)
    }
}

/// The image part of a cat payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageField {
    /// Explicit `null`: drop the current image.
    Clear,
    /// A decoded upload to store.
    Upload(image::ImageUpload),
}

/// A validated cat payload, already mapped to stored representations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatInput {
    /// Trimmed cat name
    pub name: Option<String>,
    /// Canonical `#rrggbb` hex code resolved from the color name
    pub color: Option<String>,
    /// Year of birth
    pub birth_year: Option<i32>,
    /// Achievement names in first-seen order, without duplicates
    pub achievements: Option<Vec<String>>,
    /// Image change, if any
    pub image: Option<ImageField>,
}

/// Validates a cat payload in the external representation.
///
/// Read-only keys (`id`, `age`, `owner`, `image_url`) and unknown keys are ignored.
pub fn validate_cat(payload: &Map<String, Value>, mode: WriteMode) -> Result<CatInput, FieldErrors> {
    let mut errors = FieldErrors::new();
    let required = mode.requires_all();

    let name = string_field(payload, "name", required, CAT_NAME_MAX_LEN, &mut errors);

    let color = match payload.get("color") {
        None => None,
        Some(Value::Null) => {
            errors.add("color", NOT_NULL);
            None
        }
        Some(Value::String(raw)) => match color::name_to_hex(raw) {
            Some(hex) => Some(hex.to_string()),
            None => {
                errors.add("color", UNKNOWN_COLOR);
                None
            }
        },
        Some(_) => {
            errors.add("color", NOT_A_STRING);
            None
        }
    };

    let birth_year = match payload.get("birth_year") {
        None => {
            if required {
                errors.add("birth_year", REQUIRED);
            }
            None
        }
        Some(Value::Null) => {
            errors.add("birth_year", NOT_NULL);
            None
        }
        Some(value) => match parse_integer(value) {
            Some(year) => Some(year),
            None => {
                errors.add("birth_year", INVALID_INTEGER);
                None
            }
        },
    };

    let achievements = match payload.get("achievements") {
        None => None,
        Some(Value::Null) => {
            errors.add("achievements", NOT_NULL);
            None
        }
        Some(Value::Array(items)) => validate_achievement_refs(items, &mut errors),
        Some(other) => {
            errors.add(
                "achievements",
                format!(
                    "Expected a list of items but got type \"{}\".",
                    json_type(other)
                ),
            );
            None
        }
    };

    let image = match payload.get("image") {
        None => None,
        Some(Value::Null) => Some(ImageField::Clear),
        Some(Value::String(data)) => match image::decode_data_uri(data) {
            Ok(upload) => Some(ImageField::Upload(upload)),
            Err(message) => {
                errors.add("image", message);
                None
            }
        },
        Some(_) => {
            errors.add("image", NOT_A_STRING);
            None
        }
    };

    errors.into_result(CatInput {
        name,
        color,
        birth_year,
        achievements,
        image,
    })
}

/// Validates the nested `achievements` list: `[{"achievement_name": "..."}, ...]`.
fn validate_achievement_refs(items: &[Value], errors: &mut FieldErrors) -> Option<Vec<String>> {
    let mut names: Vec<String> = Vec::with_capacity(items.len());
    let mut valid = true;

    for (index, item) in items.iter().enumerate() {
        let Value::Object(fields) = item else {
            errors.add(
                "achievements",
                format!(
                    "Item {index}: Invalid data. Expected a dictionary, but got {}.",
                    json_type(item)
                ),
            );
            valid = false;
            continue;
        };

        let mut item_errors = FieldErrors::new();
        let name = string_field(
            fields,
            ACHIEVEMENT_NAME_KEY,
            true,
            ACHIEVEMENT_NAME_MAX_LEN,
            &mut item_errors,
        );
        if !item_errors.is_empty() {
            errors.add("achievements", format!("Item {index}: {item_errors}"));
            valid = false;
            continue;
        }
        if let Some(name) = name {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    valid.then_some(names)
}

/// Validates an achievement payload `{"achievement_name": "..."}`.
///
/// Returns `None` only for a partial update that leaves the name untouched.
pub fn validate_achievement(
    payload: &Map<String, Value>,
    mode: WriteMode,
) -> Result<Option<String>, FieldErrors> {
    let mut errors = FieldErrors::new();
    let name = string_field(
        payload,
        ACHIEVEMENT_NAME_KEY,
        mode.requires_all(),
        ACHIEVEMENT_NAME_MAX_LEN,
        &mut errors,
    );
    errors.into_result(name)
}

/// Username and password pair as submitted for registration or login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Trimmed login name
    pub username: String,
    /// Password exactly as submitted
    pub password: String,
}

/// Validates a registration payload. Passwords shorter than
/// [`PASSWORD_MIN_LEN`] are refused.
pub fn validate_registration(payload: &Map<String, Value>) -> Result<Credentials, FieldErrors> {
    let mut errors = FieldErrors::new();
    let username = string_field(payload, "username", true, USERNAME_MAX_LEN, &mut errors);
    let password = password_field(payload, &mut errors);

    if let Some(password) = &password {
        if password.chars().count() < PASSWORD_MIN_LEN {
            errors.add(
                "password",
                format!("This password is too short. It must contain at least {PASSWORD_MIN_LEN} characters."),
            );
        }
    }

    match (username, password) {
        (Some(username), Some(password)) => errors.into_result(Credentials { username, password }),
        _ => Err(errors),
    }
}

/// Validates a login payload. Only presence is checked.
pub fn validate_login(payload: &Map<String, Value>) -> Result<Credentials, FieldErrors> {
    let mut errors = FieldErrors::new();
    let username = string_field(payload, "username", true, USERNAME_MAX_LEN, &mut errors);
    let password = password_field(payload, &mut errors);
    match (username, password) {
        (Some(username), Some(password)) => errors.into_result(Credentials { username, password }),
        _ => Err(errors),
    }
}

/// Password strings are not trimmed.
fn password_field(payload: &Map<String, Value>, errors: &mut FieldErrors) -> Option<String> {
    match payload.get("password") {
        None => {
            errors.add("password", REQUIRED);
            None
        }
        Some(Value::Null) => {
            errors.add("password", NOT_NULL);
            None
        }
        Some(Value::String(password)) if password.is_empty() => {
            errors.add("password", BLANK);
            None
        }
        Some(Value::String(password)) => Some(password.clone()),
        Some(_) => {
            errors.add("password", NOT_A_STRING);
            None
        }
    }
}

/// Reads a trimmed, non-blank string with a length limit.
fn string_field(
    payload: &Map<String, Value>,
    key: &str,
    required: bool,
    max_len: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    match payload.get(key) {
        None => {
            if required {
                errors.add(key, REQUIRED);
            }
            None
        }
        Some(Value::Null) => {
            errors.add(key, NOT_NULL);
            None
        }
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                errors.add(key, BLANK);
                None
            } else if trimmed.chars().count() > max_len {
                errors.add(
                    key,
                    format!("Ensure this field has no more than {max_len} characters."),
                );
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(_) => {
            errors.add(key, NOT_A_STRING);
            None
        }
    }
}

/// Accepts JSON integers, integral floats and numeric strings that fit in `i32`.
fn parse_integer(value: &Value) -> Option<i32> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return i32::try_from(int).ok();
            }
            let float = number.as_f64()?;
            let integral = float.fract() == 0.0
                && float >= f64::from(i32::MIN)
                && float <= f64::from(i32::MAX);
            #[allow(clippy::cast_possible_truncation)] // integral and in range
            let year = integral.then(|| float as i32);
            year
        }
        Value::String(text) => text.trim().parse::<i32>().ok(),
        _ => None,
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Borrows the payload as a JSON object or reports the
/// `non_field_errors` failure.
pub fn expect_object(payload: &Value) -> Result<&Map<String, Value>, FieldErrors> {
    payload.as_object().ok_or_else(|| {
        FieldErrors::single(
            "non_field_errors",
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type(payload)
            ),
        )
    })
}
