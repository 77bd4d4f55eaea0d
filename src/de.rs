//! Serde helpers shared by the wire types.
//!
//! Chart payloads come from a dynamically typed front-end, so `null` shows up
//! wherever a list or string is merely "unset".

use serde::{Deserialize, Deserializer};

/// Deserialize `null` as `T::default()`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}
