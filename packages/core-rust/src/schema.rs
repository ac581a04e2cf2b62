//! Payload and parameter constraints for the concerts API.
//!
//! Handlers run these checks on decoded input before touching the store, so
//! the store only ever sees well-formed records. Each check reports the first
//! violated constraint as a [`ValidationError`].

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::types::{ConcertPayload, Field, NewConcert};

/// Default page number when the query string omits `page`.
pub const DEFAULT_PAGE: usize = 1;
/// Default page size when the query string omits `limit`.
pub const DEFAULT_LIMIT: usize = 10;
/// Largest accepted page size.
pub const MAX_LIMIT: usize = 100;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern is a valid regex"));

/// Kind of constraint a value violated. The string form is the error `name`
/// sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    MissingField,
    InvalidLength,
    InvalidPattern,
    InvalidRange,
    InvalidType,
    InvalidFormat,
}

impl ViolationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidLength => "invalid_length",
            Self::InvalidPattern => "invalid_pattern",
            Self::InvalidRange => "invalid_range",
            Self::InvalidType => "invalid_type",
            Self::InvalidFormat => "invalid_format",
        }
    }
}

/// A single constraint violation on a named input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub kind: ViolationKind,
    /// Name of the offending attribute, query parameter or path segment.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(kind: ViolationKind, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            field,
            message: message.into(),
        }
    }

    /// Error name reported to clients (e.g. `"invalid_pattern"`).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }
}

/// Pagination parameters for listing concerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    /// 1-based page number.
    pub page: usize,
    /// Items per page, in `1..=MAX_LIMIT`.
    pub limit: usize,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListParams {
    /// Parses raw query-string values, applying defaults for missing ones.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if a value is not an integer, if `page`
    /// is below 1, or if `limit` is outside `1..=100`.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, ValidationError> {
        let page = match page {
            Some(raw) => parse_bounded("page", raw, 1, None)?,
            None => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(raw) => parse_bounded("limit", raw, 1, Some(MAX_LIMIT))?,
            None => DEFAULT_LIMIT,
        };
        Ok(Self { page, limit })
    }
}

fn parse_bounded(
    field: &'static str,
    raw: &str,
    min: usize,
    max: Option<usize>,
) -> Result<usize, ValidationError> {
    let value: i64 = raw.trim().parse().map_err(|_| {
        ValidationError::new(
            ViolationKind::InvalidType,
            field,
            format!("invalid value {raw:?}, must be an integer"),
        )
    })?;

    let out_of_range = || {
        let bound = match max {
            Some(max) => format!("between {min} and {max}"),
            None => format!("greater or equal than {min}"),
        };
        ValidationError::new(
            ViolationKind::InvalidRange,
            field,
            format!("{value} must be {bound}"),
        )
    };

    let value = usize::try_from(value).map_err(|_| out_of_range())?;
    if value < min || max.is_some_and(|max| value > max) {
        return Err(out_of_range());
    }
    Ok(value)
}

/// Checks that a path segment is a UUID concert identifier.
///
/// # Errors
///
/// Returns an `invalid_format` error when `id` does not parse as a UUID.
pub fn validate_concert_id(id: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(id).map(|_| ()).map_err(|_| {
        ValidationError::new(
            ViolationKind::InvalidFormat,
            "concert_id",
            format!("{id:?} must be formatted as a UUID"),
        )
    })
}

fn check_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < 1 {
        return Err(ValidationError::new(
            ViolationKind::InvalidLength,
            field,
            "length must be greater or equal than 1",
        ));
    }
    Ok(())
}

fn check_date(value: &str) -> Result<(), ValidationError> {
    if !DATE_PATTERN.is_match(value) {
        return Err(ValidationError::new(
            ViolationKind::InvalidPattern,
            "date",
            format!("{value:?} must match the regular expression \"^\\d{{4}}-\\d{{2}}-\\d{{2}}$\""),
        ));
    }
    Ok(())
}

fn check_price(value: i64) -> Result<(), ValidationError> {
    if value < 1 {
        return Err(ValidationError::new(
            ViolationKind::InvalidRange,
            "price",
            format!("{value} must be greater or equal than 1"),
        ));
    }
    Ok(())
}

/// Validates every attribute that is present, ignoring absent ones.
///
/// Used for updates, where any subset of attributes may be supplied.
///
/// # Errors
///
/// Returns the first constraint a present attribute violates.
pub fn validate_update(payload: &ConcertPayload) -> Result<(), ValidationError> {
    if let Some(artist) = payload.artist.as_present() {
        check_non_empty("artist", artist)?;
    }
    if let Some(date) = payload.date.as_present() {
        check_date(date)?;
    }
    if let Some(venue) = payload.venue.as_present() {
        check_non_empty("venue", venue)?;
    }
    if let Some(price) = payload.price.as_present() {
        check_price(*price)?;
    }
    Ok(())
}

/// Validates a create payload and converts it into a [`NewConcert`].
///
/// # Errors
///
/// Returns `missing_field` for the first absent attribute, otherwise the
/// first constraint a present attribute violates.
pub fn validate_create(payload: ConcertPayload) -> Result<NewConcert, ValidationError> {
    validate_update(&payload)?;

    let ConcertPayload {
        artist,
        date,
        venue,
        price,
    } = payload;

    Ok(NewConcert {
        artist: required("artist", artist)?,
        date: required("date", date)?,
        venue: required("venue", venue)?,
        price: required("price", price)?,
    })
}

fn required<T>(field: &'static str, value: Field<T>) -> Result<T, ValidationError> {
    Option::from(value).ok_or_else(|| {
        ValidationError::new(
            ViolationKind::MissingField,
            field,
            format!("{field:?} is missing from request body"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> ConcertPayload {
        ConcertPayload {
            artist: Field::Present("Radiohead".to_string()),
            date: Field::Present("2025-06-14".to_string()),
            venue: Field::Present("Glastonbury".to_string()),
            price: Field::Present(120),
        }
    }

    #[test]
    fn list_params_defaults() {
        let params = ListParams::parse(None, None).unwrap();
        assert_eq!(params, ListParams { page: 1, limit: 10 });
        assert_eq!(params, ListParams::default());
    }

    #[test]
    fn list_params_accepts_bounds() {
        let params = ListParams::parse(Some("3"), Some("100")).unwrap();
        assert_eq!(params, ListParams { page: 3, limit: 100 });
        assert_eq!(ListParams::parse(None, Some("1")).unwrap().limit, 1);
    }

    #[test]
    fn list_params_rejects_out_of_range() {
        let err = ListParams::parse(Some("0"), None).unwrap_err();
        assert_eq!(err.kind, ViolationKind::InvalidRange);
        assert_eq!(err.field, "page");

        let err = ListParams::parse(None, Some("101")).unwrap_err();
        assert_eq!(err.kind, ViolationKind::InvalidRange);
        assert_eq!(err.field, "limit");

        let err = ListParams::parse(Some("-4"), None).unwrap_err();
        assert_eq!(err.name(), "invalid_range");
    }

    #[test]
    fn list_params_rejects_non_integers() {
        let err = ListParams::parse(Some("two"), None).unwrap_err();
        assert_eq!(err.kind, ViolationKind::InvalidType);
        assert_eq!(err.name(), "invalid_type");
    }

    #[test]
    fn create_requires_every_field() {
        let payload = ConcertPayload {
            venue: Field::Absent,
            ..full_payload()
        };
        let err = validate_create(payload).unwrap_err();
        assert_eq!(err.kind, ViolationKind::MissingField);
        assert_eq!(err.field, "venue");
    }

    #[test]
    fn create_converts_valid_payload() {
        let concert = validate_create(full_payload()).unwrap();
        assert_eq!(concert.artist, "Radiohead");
        assert_eq!(concert.price, 120);
    }

    #[test]
    fn date_must_match_pattern() {
        for bad in [
            "2025/06/14",
            "25-06-14",
            "2025-6-14",
            "2025-06-14T00:00",
            "\u{662}\u{660}\u{662}\u{664}-\u{660}\u{661}-\u{660}\u{661}",
            "\u{ff12}\u{ff10}\u{ff12}\u{ff15}-06-14",
        ] {
            let payload = ConcertPayload {
                date: Field::Present(bad.to_string()),
                ..full_payload()
            };
            let err = validate_create(payload).unwrap_err();
            assert_eq!(err.kind, ViolationKind::InvalidPattern, "{bad}");
        }
    }

    #[test]
    fn price_must_be_positive() {
        let payload = ConcertPayload {
            price: Field::Present(0),
            ..full_payload()
        };
        assert_eq!(
            validate_create(payload).unwrap_err().kind,
            ViolationKind::InvalidRange
        );
    }

    #[test]
    fn empty_artist_is_invalid_length() {
        let payload = ConcertPayload {
            artist: Field::Present(String::new()),
            ..ConcertPayload::default()
        };
        let err = validate_update(&payload).unwrap_err();
        assert_eq!(err.kind, ViolationKind::InvalidLength);
        assert_eq!(err.field, "artist");
    }

    #[test]
    fn update_ignores_absent_fields() {
        assert!(validate_update(&ConcertPayload::default()).is_ok());
    }

    #[test]
    fn concert_id_must_be_uuid() {
        assert!(validate_concert_id("6f9619ff-8b86-4d01-b42d-00cf4fc964ff").is_ok());
        let err = validate_concert_id("not-a-uuid").unwrap_err();
        assert_eq!(err.kind, ViolationKind::InvalidFormat);
    }
}
