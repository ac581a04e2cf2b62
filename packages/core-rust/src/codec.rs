//! Wire formats and content negotiation.
//!
//! A [`CodecRegistry`] maps normalized media-type tokens to a [`WireFormat`].
//! Request bodies are decoded with the format named by `Content-Type`;
//! responses are encoded with the format picked from `Accept`.
//!
//! `Accept` negotiation is first-match-wins over declaration order: the
//! `q` weights are stripped and ignored, so
//! `application/json;q=0.9, application/msgpack` selects JSON. Clients that
//! rely on this ordering keep working; do not re-sort by weight.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Media type of the textual format.
pub const JSON: &str = "application/json";
/// Media type of the binary format.
pub const MSGPACK: &str = "application/msgpack";
/// `Accept` wildcard, resolved to the registry's default format.
pub const WILDCARD: &str = "*/*";

/// A concrete serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireFormat {
    /// Self-describing text (`serde_json`).
    Json,
    /// Compact binary, named-field maps (`rmp_serde::to_vec_named`).
    MsgPack,
}

impl WireFormat {
    /// Media type written to `Content-Type` for bodies in this format.
    #[must_use]
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Json => JSON,
            Self::MsgPack => MSGPACK,
        }
    }

    /// Serializes `value` in this format.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if the value cannot be represented.
    pub fn encode<T: Serialize + ?Sized>(self, value: &T) -> Result<Vec<u8>, CodecError> {
        let result = match self {
            Self::Json => serde_json::to_vec(value).map_err(|e| e.to_string()),
            Self::MsgPack => rmp_serde::to_vec_named(value).map_err(|e| e.to_string()),
        };
        result.map_err(|message| CodecError::Encode {
            media_type: self.media_type(),
            message,
        })
    }

    /// Deserializes `bytes` in this format.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if the bytes are malformed or do not
    /// match the shape of `T`.
    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, CodecError> {
        let result = match self {
            Self::Json => serde_json::from_slice(bytes).map_err(|e| e.to_string()),
            Self::MsgPack => rmp_serde::from_slice(bytes).map_err(|e| e.to_string()),
        };
        result.map_err(|message| CodecError::Decode {
            media_type: self.media_type(),
            message,
        })
    }
}

/// Failure to encode or decode a body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("failed to encode {media_type} body: {message}")]
    Encode {
        media_type: &'static str,
        message: String,
    },
    #[error("failed to decode {media_type} body: {message}")]
    Decode {
        media_type: &'static str,
        message: String,
    },
}

/// Reduces a header entry to its bare media type: parameters after the first
/// `;` are dropped, whitespace trimmed, ASCII letters lowercased.
#[must_use]
pub fn normalize_media_type(raw: &str) -> String {
    let bare = raw.split_once(';').map_or(raw, |(token, _params)| token);
    bare.trim().to_ascii_lowercase()
}

/// Splits an `Accept` value into normalized candidates, in declaration order.
/// Empty entries (e.g. from `"a,,b"`) are skipped.
pub fn accept_candidates(accept: &str) -> impl Iterator<Item = String> + '_ {
    accept
        .split(',')
        .map(normalize_media_type)
        .filter(|candidate| !candidate.is_empty())
}

/// Registry of media-type tokens to wire formats.
///
/// Lookups are by normalized token. Registration order is preserved so the
/// registry can be listed deterministically; registering an existing token
/// replaces its format.
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    entries: Vec<(String, WireFormat)>,
    default_format: WireFormat,
}

impl CodecRegistry {
    /// Creates a registry whose only entry is the given default format.
    #[must_use]
    pub fn new(default_format: WireFormat) -> Self {
        let mut registry = Self {
            entries: Vec::new(),
            default_format,
        };
        registry.register(default_format.media_type(), default_format);
        registry
    }

    /// Registers `token` (normalized) as selecting `format`.
    pub fn register(&mut self, token: &str, format: WireFormat) -> &mut Self {
        let token = normalize_media_type(token);
        if let Some(entry) = self.entries.iter_mut().find(|(t, _)| *t == token) {
            entry.1 = format;
        } else {
            self.entries.push((token, format));
        }
        self
    }

    /// Format used when nothing in a header is recognized.
    #[must_use]
    pub fn default_format(&self) -> WireFormat {
        self.default_format
    }

    /// Looks up an already-normalized token.
    #[must_use]
    pub fn lookup(&self, token: &str) -> Option<WireFormat> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, format)| *format)
    }

    /// Registered tokens in registration order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(token, _)| token.as_str())
    }

    /// Picks the decoder for a request body from its `Content-Type`.
    ///
    /// Never fails: absent, empty or unregistered values select the default
    /// format, and any payload problem surfaces later as a decode error.
    #[must_use]
    pub fn decoder_for(&self, content_type: Option<&str>) -> WireFormat {
        let Some(raw) = content_type else {
            return self.default_format;
        };
        let token = normalize_media_type(raw);
        match self.lookup(&token) {
            Some(format) => format,
            None => {
                if !token.is_empty() {
                    debug!(content_type = raw, "unrecognized content type, using default decoder");
                }
                self.default_format
            }
        }
    }

    /// Picks the encoder for a response from the request's `Accept`.
    ///
    /// Walks candidates in declaration order and returns the first that is a
    /// registered token or the `*/*` wildcard. Weights never reorder
    /// candidates.
    #[must_use]
    pub fn encoder_for(&self, accept: Option<&str>) -> WireFormat {
        let Some(accept) = accept else {
            return self.default_format;
        };
        accept_candidates(accept)
            .find_map(|candidate| {
                if candidate == WILDCARD {
                    Some(self.default_format)
                } else {
                    self.lookup(&candidate)
                }
            })
            .unwrap_or(self.default_format)
    }
}

impl Default for CodecRegistry {
    /// JSON as the default, plus MessagePack.
    fn default() -> Self {
        let mut registry = Self::new(WireFormat::Json);
        registry.register(MSGPACK, WireFormat::MsgPack);
        registry
    }
}
