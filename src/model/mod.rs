//! Core data model types: the parsed message, its attachments and addresses.

pub mod address;
pub mod attachment;
pub mod message;
