//! Concerts server: in-memory concert records over HTTP with JSON/`MsgPack` negotiation.

pub mod network;
pub mod storage;

pub use network::{AppState, NetworkConfig, NetworkModule};
pub use storage::{ConcertStore, StoreError};
