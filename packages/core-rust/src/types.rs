use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;
use uuid::Uuid;

/// A concert with all its details, as stored and returned to clients.
///
/// Wire names are `id, artist, date, venue, price`; `id` and `date` are text,
/// `price` is an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Concert {
    /// Unique concert ID (UUID). Assigned at creation, never changes.
    #[schema(example = "5f0c1b7e-2a44-4cc5-9a0e-3f1b2c6d7e8f")]
    pub id: String,
    /// Performing artist or band.
    #[schema(example = "The Beatles")]
    pub artist: String,
    /// Concert date (`YYYY-MM-DD`).
    #[schema(example = "2024-01-01")]
    pub date: String,
    /// Concert venue.
    #[schema(example = "The O2 Arena")]
    pub venue: String,
    /// Ticket price in USD.
    #[schema(example = 100, minimum = 1)]
    pub price: i64,
}

/// Validated data for a new concert. Produced by
/// [`validate_create`](crate::schema::validate_create), consumed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConcert {
    pub artist: String,
    pub date: String,
    pub venue: String,
    pub price: i64,
}

impl NewConcert {
    /// Attaches an identifier, producing the stored record.
    #[must_use]
    pub fn into_concert(self, id: String) -> Concert {
        Concert {
            id,
            artist: self.artist,
            date: self.date,
            venue: self.venue,
            price: self.price,
        }
    }
}

/// An attribute that is either supplied by the client or not.
///
/// Distinguishes "not supplied" from any supplied value. A key missing from
/// the request body decodes to `Absent`; a key with a value decodes to
/// `Present`. A key with `null` is a decode error for non-nullable `T`.
///
/// Struct fields of this type need `#[serde(default, skip_serializing_if =
/// "Field::is_absent")]` so that missing keys map to `Absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Absent,
    Present(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> Field<T> {
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Borrows the supplied value, if any.
    #[must_use]
    pub fn as_present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }

    /// Overwrites `target` with the supplied value; leaves it untouched when absent.
    pub fn apply_to(self, target: &mut T) {
        if let Self::Present(value) = self {
            *target = value;
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }
}

impl<T> From<Field<T>> for Option<T> {
    fn from(field: Field<T>) -> Self {
        match field {
            Field::Present(value) => Some(value),
            Field::Absent => None,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::Present)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Present(value) => value.serialize(serializer),
            Self::Absent => serializer.serialize_none(),
        }
    }
}

/// Request body for creating or updating a concert.
///
/// On create every attribute must be present. On update only the present
/// attributes are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConcertPayload {
    /// Performing artist or band.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    #[schema(value_type = Option<String>, min_length = 1, example = "The Beatles")]
    pub artist: Field<String>,
    /// Concert date (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    #[schema(value_type = Option<String>, pattern = r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$", example = "2024-01-01")]
    pub date: Field<String>,
    /// Concert venue.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    #[schema(value_type = Option<String>, min_length = 1, example = "The O2 Arena")]
    pub venue: Field<String>,
    /// Ticket price in USD.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    #[schema(value_type = Option<i64>, minimum = 1, example = 100)]
    pub price: Field<i64>,
}

impl ConcertPayload {
    /// Applies every present attribute to `concert`. The id is never touched.
    pub fn apply_to(self, concert: &mut Concert) {
        self.artist.apply_to(&mut concert.artist);
        self.date.apply_to(&mut concert.date);
        self.venue.apply_to(&mut concert.venue);
        self.price.apply_to(&mut concert.price);
    }
}

/// Structured error returned in response bodies.
///
/// `name` identifies the error kind (`not_found`, `missing_field`, ...);
/// `id` is unique to this occurrence so it can be correlated with logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub name: String,
    pub id: String,
    pub message: String,
    pub temporary: bool,
    pub timeout: bool,
    pub fault: bool,
}

impl ErrorBody {
    /// A client error (not temporary, not a timeout, not a server fault).
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: Uuid::new_v4().to_string(),
            message: message.into(),
            temporary: false,
            timeout: false,
            fault: false,
        }
    }

    /// A server-side error.
    #[must_use]
    pub fn fault(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fault: true,
            ..Self::new(name, message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> Concert {
        Concert {
            id: "c-1".to_string(),
            artist: "The Beatles".to_string(),
            date: "2024-01-01".to_string(),
            venue: "The O2 Arena".to_string(),
            price: 100,
        }
    }

    #[test]
    fn missing_keys_decode_as_absent() {
        let payload: ConcertPayload = serde_json::from_str(r#"{"price": 150}"#).unwrap();
        assert!(payload.artist.is_absent());
        assert!(payload.date.is_absent());
        assert!(payload.venue.is_absent());
        assert_eq!(payload.price, Field::Present(150));
    }

    #[test]
    fn empty_string_is_present_not_absent() {
        let payload: ConcertPayload = serde_json::from_str(r#"{"artist": ""}"#).unwrap();
        assert_eq!(payload.artist, Field::Present(String::new()));
    }

    #[test]
    fn explicit_null_is_rejected() {
        let result: Result<ConcertPayload, _> = serde_json::from_str(r#"{"venue": null}"#);
        assert!(result.is_err());
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let payload = ConcertPayload {
            price: Field::Present(5),
            ..ConcertPayload::default()
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({ "price": 5 }));
    }

    #[test]
    fn apply_overwrites_only_present_fields() {
        let mut concert = stored();
        ConcertPayload {
            price: Field::Present(250),
            ..ConcertPayload::default()
        }
        .apply_to(&mut concert);

        assert_eq!(concert.price, 250);
        assert_eq!(concert.artist, "The Beatles");
        assert_eq!(concert.date, "2024-01-01");
        assert_eq!(concert.venue, "The O2 Arena");
        assert_eq!(concert.id, "c-1");
    }

    #[test]
    fn concert_wire_names() {
        let json = serde_json::to_value(stored()).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["artist", "date", "id", "price", "venue"]);
        assert!(json["price"].is_i64());
    }

    #[test]
    fn field_option_conversions() {
        assert_eq!(Field::from(Some(3)), Field::Present(3));
        assert_eq!(Field::<i32>::from(None), Field::Absent);
        assert_eq!(Option::from(Field::Present("x")), Some("x"));
    }

    #[test]
    fn error_body_ids_are_unique() {
        let a = ErrorBody::new("not_found", "concert not found: x");
        let b = ErrorBody::new("not_found", "concert not found: x");
        assert_ne!(a.id, b.id);
        assert!(!a.fault);
        assert!(ErrorBody::fault("encode", "boom").fault);
    }
}
