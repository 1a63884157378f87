//! `mailsift`: pull headers, body, attachments and PDF text out of email files.
//!
//! Two container formats are supported: Outlook `.msg` items and RFC 5322
//! `.eml` messages. The caller chooses the format with
//! [`parser::ContainerFormat`]; an [`extract::Extractor`] then saves every
//! attachment into one output directory and reads the text of PDF attachments,
//! reporting everything to a [`report::ReportSink`].

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod model;
pub mod parser;
pub mod pdf;
pub mod report;
