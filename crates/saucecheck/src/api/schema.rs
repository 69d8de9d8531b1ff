//! Response contracts.
//!
//! Each contract is a serde type. Top-level objects reject unknown fields;
//! nested objects only require their listed fields. Integer fields take any
//! JSON number with no fractional part (`2`, `-1`, `2.0`) and reject strings
//! and fractions; string fields reject everything but strings.

use crate::result::{SauceError, SauceResult};
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A response body contract
pub trait Schema: DeserializeOwned {
    /// Contract name used in mismatch messages
    const NAME: &'static str;

    /// Check `body` against the contract
    ///
    /// # Errors
    ///
    /// Returns [`SauceError::SchemaMismatch`] naming the contract and the
    /// first violation
    fn validate(body: &Value) -> SauceResult<Self> {
        Self::deserialize(body).map_err(|err| SauceError::SchemaMismatch {
            message: format!("{}: {err}", Self::NAME),
        })
    }
}

/// A JSON number with no fractional part, as an `i64`
fn json_integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    struct Integer;

    impl Visitor<'_> for Integer {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::float_cmp)]
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            // 2^63 as f64; anything at or above it does not fit
            let in_range = v >= i64::MIN as f64 && v < i64::MAX as f64;
            if v.fract() == 0.0 && in_range {
                Ok(v as i64)
            } else {
                Err(E::invalid_value(de::Unexpected::Float(v), &self))
            }
        }
    }

    deserializer.deserialize_any(Integer)
}

/// `support` block shared by the GET responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Support {
    /// Sponsor link
    pub url: String,
    /// Sponsor blurb
    pub text: String,
}

/// `data` of `GET /api/users/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    /// User id
    #[serde(deserialize_with = "json_integer")]
    pub id: i64,
    /// Contact address
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Avatar image URL
    pub avatar: String,
}

/// `GET /api/users/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SingleUser {
    /// The user
    pub data: UserData,
    /// Sponsor block
    pub support: Support,
}

impl Schema for SingleUser {
    const NAME: &'static str = "single user";
}

/// `data` of `GET /api/unknown/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceData {
    /// Resource id
    #[serde(deserialize_with = "json_integer")]
    pub id: i64,
    /// Color name
    pub name: String,
    /// Year the color was introduced
    #[serde(deserialize_with = "json_integer")]
    pub year: i64,
    /// Hex code, e.g. `#C74375`
    pub color: String,
    /// Pantone reference
    pub pantone_value: String,
}

/// `GET /api/unknown/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SingleResource {
    /// The resource
    pub data: ResourceData,
    /// Sponsor block
    pub support: Support,
}

impl Schema for SingleResource {
    const NAME: &'static str = "single resource";
}

/// `POST /api/users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreatedUser {
    /// Assigned id, as a string
    pub id: String,
    /// Echoed name
    pub name: String,
    /// Echoed job
    pub job: String,
    /// Creation timestamp
    pub created_at: String,
}

impl Schema for CreatedUser {
    const NAME: &'static str = "create user";
}

/// `PUT /api/users/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdatedUser {
    /// Echoed name
    pub name: String,
    /// Echoed job
    pub job: String,
    /// Update timestamp
    pub updated_at: String,
}

impl Schema for UpdatedUser {
    const NAME: &'static str = "put user";
}

/// `PATCH /api/users/{id}`; only the timestamp is required
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PatchedUser {
    /// Echoed id, if any
    #[serde(default)]
    pub id: Option<String>,
    /// Echoed name, if any
    #[serde(default)]
    pub name: Option<String>,
    /// Echoed job, if any
    #[serde(default)]
    pub job: Option<String>,
    /// Update timestamp
    pub updated_at: String,
}

impl Schema for PatchedUser {
    const NAME: &'static str = "patch user";
}

/// Request body for create and update calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    /// User name
    pub name: String,
    /// Job title
    pub job: String,
}

impl UserPayload {
    /// Build a payload
    #[must_use]
    pub fn new(name: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            job: job.into(),
        }
    }
}

/// "Object containing": every key of `expected` is present in `actual`
/// with an equal value. Non-objects compare by equality.
#[must_use]
pub fn json_contains(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(actual), Value::Object(expected)) => expected
            .iter()
            .all(|(key, value)| actual.get(key) == Some(value)),
        _ => actual == expected,
    }
}
