//! Request and response bodies exchanged over HTTP.
//!
//! Field names follow the JSON the mobile clients already speak. Status-like
//! fields on responses are plain strings because they echo stored text; request
//! bodies use the typed vocabularies from `sns-types` so bad values are rejected
//! at deserialisation.

use serde::Deserialize;

mod account;
mod bookings;
mod chat;
mod common;
mod marketplace;

pub use account::*;
pub use bookings::*;
pub use chat::*;
pub use common::*;
pub use marketplace::*;

/// Reads a PATCH field that may be absent (`None`), explicitly `null` (`Some(None)`) or set.
///
/// Use with `#[serde(default, deserialize_with = "...")]` so a missing key stays `None`.
pub fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
