//! The portal timestamp format.
//!
//! Dates come as `2023-11-02T07:27:22.586+0300`: RFC 3339-like, but
//! with mandatory milliseconds and a colon-less UTC offset, so the
//! stock serde support in `time` cannot parse them.

use serde::{Deserialize, Deserializer, Serializer};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const LAYOUT: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3][offset_hour sign:mandatory][offset_minute]"
);

/// Parse a portal timestamp.
pub fn parse(value: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(value, LAYOUT)
}

/// Format a timestamp in the portal layout.
pub fn format(value: OffsetDateTime) -> Result<String, time::error::Format> {
    value.format(LAYOUT)
}

/// Serialize an `OffsetDateTime` in the portal layout.
pub fn serialize<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    let text = format(*value).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

/// Deserialize an `OffsetDateTime` from the portal layout.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
    let text = String::deserialize(deserializer)?;
    parse(&text).map_err(serde::de::Error::custom)
}

/// `Option<OffsetDateTime>` support; `null` and absent map to `None`.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<OffsetDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => super::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<OffsetDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => parse(&text).map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
