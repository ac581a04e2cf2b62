//! Record storage for the concerts server.
//!
//! A single in-memory [`ConcertStore`] is the source of truth for all
//! concerts. Nothing is persisted across restarts.

pub mod concert_store;

pub use concert_store::*;
