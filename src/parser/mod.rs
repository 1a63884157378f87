//! Container parsing: Outlook `.msg` items and RFC 5322 `.eml` messages.
//!
//! Both formats implement [`MessageSource`]; the caller picks one explicitly
//! through [`ContainerFormat`]. Nothing here sniffs file contents.

pub mod date;
pub mod eml;
pub mod html;
pub mod msg;

use std::path::Path;

use crate::error::Result;
use crate::model::message::Message;

/// Turns one container file into a [`Message`].
pub trait MessageSource {
    /// Parse the file at `path`.
    ///
    /// I/O failures and unreadable containers are returned as errors;
    /// individual headers that cannot be resolved are left empty instead.
    fn parse_path(&self, path: &Path) -> Result<Message>;
}

/// The container formats mailsift understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    /// Outlook mail item (OLE compound file with MAPI properties).
    Msg,
    /// Internet message (RFC 5322 / MIME).
    Eml,
}

impl ContainerFormat {
    /// The parser for this format.
    pub fn source(self) -> &'static dyn MessageSource {
        match self {
            Self::Msg => &msg::MsgParser,
            Self::Eml => &eml::EmlParser,
        }
    }

    /// Parse `path` as this format.
    pub fn parse(self, path: &Path) -> Result<Message> {
        self.source().parse_path(path)
    }

    /// Short lowercase name, also the usual file extension.
    pub fn name(self) -> &'static str {
        match self {
            Self::Msg => "msg",
            Self::Eml => "eml",
        }
    }
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Keep a header value only if it has visible content.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
