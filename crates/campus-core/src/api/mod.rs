//! Typed wrappers over the backend endpoints used by the backoffice screens.
//!
//! Every call goes through the [`Gateway`](crate::gateway::Gateway); none of
//! these functions look at authorization failures themselves.

pub mod auth;
pub mod courses;
pub mod statistics;
pub mod users;

use serde::{Deserialize, Deserializer, Serialize};

/// Body shared by the user administration endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest<'a> {
    pub email: &'a str,
}

/// Deserializes `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Rounded share of `value` in `total`, 0 when there is no total.
pub fn percentage(value: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    ((value as f64 / total as f64) * 100.0).round() as u64
}
