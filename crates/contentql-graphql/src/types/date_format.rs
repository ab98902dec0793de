//! The `DateFormatTypes` enum.
//!
//! Fixed set of named date formats accepted by `@date(as: ...)`. The enum does
//! not depend on content and is identical in every schema build.

use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::registry::{EnumDescriptor, TypeDescriptor, TypeOrigin};

pub const DATE_FORMAT_TYPES: &str = "DateFormatTypes";

/// Named date formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    Atom,
    Cookie,
    Iso8601,
    Rfc822,
    Rfc850,
    Rfc1036,
    Rfc1123,
    Rfc2822,
    Rfc3339,
    Rss,
    W3c,
    Microtime,
}

impl DateFormat {
    pub const ALL: [DateFormat; 12] = [
        DateFormat::Atom,
        DateFormat::Cookie,
        DateFormat::Iso8601,
        DateFormat::Rfc822,
        DateFormat::Rfc850,
        DateFormat::Rfc1036,
        DateFormat::Rfc1123,
        DateFormat::Rfc2822,
        DateFormat::Rfc3339,
        DateFormat::Rss,
        DateFormat::W3c,
        DateFormat::Microtime,
    ];

    /// The enum value name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Atom => "atom",
            Self::Cookie => "cookie",
            Self::Iso8601 => "iso8601",
            Self::Rfc822 => "rfc822",
            Self::Rfc850 => "rfc850",
            Self::Rfc1036 => "rfc1036",
            Self::Rfc1123 => "rfc1123",
            Self::Rfc2822 => "rfc2822",
            Self::Rfc3339 => "rfc3339",
            Self::Rss => "rss",
            Self::W3c => "w3c",
            Self::Microtime => "microtime",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.as_str() == value)
    }

    /// Renders `date` in this format.
    ///
    /// # Errors
    ///
    /// Returns an error if the date cannot be represented in the format
    /// (for example RFC 2822 before the year 1900).
    pub fn format(&self, date: OffsetDateTime) -> Result<String, time::error::Format> {
        match self {
            Self::Atom | Self::W3c => date.format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
            )),
            Self::Iso8601 => date.format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"
            )),
            Self::Cookie => {
                let prefix = date.format(format_description!(
                    "[weekday], [day]-[month repr:short]-[year] [hour]:[minute]:[second]"
                ))?;
                Ok(format!("{prefix} {}", zone_name(date.offset())))
            }
            Self::Rfc850 => {
                let prefix = date.format(format_description!(
                    "[weekday], [day]-[month repr:short]-[year repr:last_two] [hour]:[minute]:[second]"
                ))?;
                Ok(format!("{prefix} {}", zone_name(date.offset())))
            }
            Self::Rfc822 | Self::Rfc1036 => date.format(format_description!(
                "[weekday repr:short], [day] [month repr:short] [year repr:last_two] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute]"
            )),
            Self::Rfc1123 | Self::Rss => date.format(format_description!(
                "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute]"
            )),
            Self::Rfc2822 => date.format(&Rfc2822),
            Self::Rfc3339 => date.format(&Rfc3339),
            Self::Microtime => Ok(format!(
                "{}.{:06}",
                date.unix_timestamp(),
                date.microsecond()
            )),
        }
    }
}

/// `UTC` for a zero offset, `+hh:mm` otherwise.
fn zone_name(offset: UtcOffset) -> String {
    if offset.is_utc() {
        return "UTC".to_string();
    }
    let (hours, minutes, _) = offset.as_hms();
    let sign = if offset.is_negative() { '-' } else { '+' };
    format!("{sign}{:02}:{:02}", hours.abs(), minutes.abs())
}

/// Descriptor of the `DateFormatTypes` enum.
#[must_use]
pub fn date_format_types_enum() -> TypeDescriptor {
    let mut descriptor = EnumDescriptor::new(DATE_FORMAT_TYPES, TypeOrigin::Builtin)
        .description("Named formats accepted by the @date directive");
    for format in DateFormat::ALL {
        descriptor = descriptor.value(format.as_str(), None);
    }
    TypeDescriptor::Enum(descriptor)
}
