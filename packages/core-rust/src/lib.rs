//! Concerts core: wire types, payload validation, and JSON/`MsgPack` content negotiation.

pub mod codec;
pub mod schema;
pub mod types;

pub use codec::{CodecError, CodecRegistry, WireFormat};
pub use schema::{ListParams, ValidationError, ViolationKind};
pub use types::{Concert, ConcertPayload, ErrorBody, Field, NewConcert};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
