//! Parser for `.eml` files (RFC 5322 messages with a MIME part tree).

use std::path::Path;

use mail_parser::{MessageParser, MessagePart, MimeHeaders, PartType};
use tracing::debug;

use crate::error::{ExtractError, Result};
use crate::model::address::{join_addresses, EmailAddress};
use crate::model::attachment::Attachment;
use crate::model::message::Message;

use super::{date, html, non_empty, MessageSource};

/// Reads internet-message files with `mail-parser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmlParser;

impl MessageSource for EmlParser {
    fn parse_path(&self, path: &Path) -> Result<Message> {
        let data = std::fs::read(path).map_err(|e| ExtractError::io(path, e))?;
        parse_eml_bytes(&data).ok_or_else(|| ExtractError::EmlParse(path.to_path_buf()))
    }
}

/// What a single MIME part contributes to the [`Message`].
#[derive(Debug, PartialEq, Eq)]
enum PartRole {
    /// Named attachment-disposition part.
    Attachment(String),
    /// `text/plain` body text.
    PlainBody,
    /// `text/html` body, used only if no plain body exists.
    HtmlBody,
    /// Containers, inline resources and nameless attachments.
    Ignored,
}

/// Parse a raw RFC 5322 message.
///
/// Returns `None` only when `mail-parser` cannot make sense of the input at
/// all; missing headers simply stay empty.
pub fn parse_eml_bytes(data: &[u8]) -> Option<Message> {
    let parsed = MessageParser::default().parse(data)?;

    let sender = parsed.from().and_then(|from| join_addresses(&to_addresses(from)));
    let recipients = parsed.to().and_then(|to| join_addresses(&to_addresses(to)));

    let mut plain_parts: Vec<String> = Vec::new();
    let mut html_body: Option<String> = None;
    let mut attachments = Vec::new();

    // `parts` is flat and in document order, so this is a depth-first walk.
    for (idx, part) in parsed.parts.iter().enumerate() {
        match classify(part) {
            PartRole::Attachment(filename) => {
                debug!(part = idx, filename = %filename, "Attachment part");
                attachments.push(Attachment {
                    filename,
                    content_type: content_type_of(part),
                    data: part.contents().to_vec(),
                });
            }
            PartRole::PlainBody => plain_parts.push(part_text(part)),
            PartRole::HtmlBody => {
                if html_body.is_none() {
                    html_body = Some(part_text(part));
                }
            }
            PartRole::Ignored => debug!(part = idx, "Skipping part"),
        }
    }

    let body = if !plain_parts.is_empty() {
        plain_parts.join("\n")
    } else if let Some(html) = html_body {
        debug!("No text/plain part, rendering HTML body");
        html::html_to_text(&html)
    } else {
        String::new()
    };

    Some(Message {
        subject: parsed.subject().and_then(non_empty),
        sender,
        recipients,
        date: parsed.date().and_then(date::from_mail_parser),
        body,
        attachments,
    })
}

fn classify(part: &MessagePart<'_>) -> PartRole {
    if matches!(part.body, PartType::Multipart(_)) {
        return PartRole::Ignored;
    }

    // text/plain is body text even when it is marked as an attachment.
    let subtype = text_subtype(part);
    if subtype.as_deref() == Some("plain") {
        return PartRole::PlainBody;
    }

    let is_attachment = part
        .content_disposition()
        .is_some_and(|d| d.ctype().eq_ignore_ascii_case("attachment"));
    if is_attachment {
        return match part.attachment_name().and_then(non_empty) {
            Some(name) => PartRole::Attachment(name),
            None => PartRole::Ignored,
        };
    }

    match subtype.as_deref() {
        Some("html") => PartRole::HtmlBody,
        _ => PartRole::Ignored,
    }
}

/// Lowercased subtype of a `text/*` part, or `None` for any other type.
fn text_subtype(part: &MessagePart<'_>) -> Option<String> {
    match part.content_type() {
        Some(ct) if ct.ctype().eq_ignore_ascii_case("text") => {
            Some(ct.subtype().unwrap_or("plain").to_ascii_lowercase())
        }
        Some(_) => None,
        // A part without Content-Type defaults to text/plain.
        None => match part.body {
            PartType::Text(_) => Some("plain".to_string()),
            PartType::Html(_) => Some("html".to_string()),
            _ => None,
        },
    }
}

fn part_text(part: &MessagePart<'_>) -> String {
    match part.text_contents() {
        Some(text) => text.to_string(),
        None => String::from_utf8_lossy(part.contents()).into_owned(),
    }
}

fn content_type_of(part: &MessagePart<'_>) -> Option<String> {
    part.content_type().map(|ct| match ct.subtype() {
        Some(sub) => format!("{}/{}", ct.ctype(), sub),
        None => ct.ctype().to_string(),
    })
}

fn to_addresses(address: &mail_parser::Address<'_>) -> Vec<EmailAddress> {
    address
        .iter()
        .map(|addr| EmailAddress::new(addr.name(), addr.address()))
        .collect()
}
