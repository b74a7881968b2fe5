//! Types shared between the phonebook client crates and the wire.

pub mod domain;
pub mod error;
pub mod protocol;
