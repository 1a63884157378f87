//! Writing extracted content to disk.

pub mod attachment;
