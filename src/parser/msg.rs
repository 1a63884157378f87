//! Parser for Outlook `.msg` items.
//!
//! A `.msg` file is an OLE compound file holding MAPI properties. The
//! `msg_parser` crate does the container work; this module maps its
//! `Outlook` value onto [`Message`]. The file is read completely inside
//! `Outlook::from_path` and released before this module returns.
//!
//! `msg_parser` only exposes the 8.3 `AttachFilename`, so the long filename
//! (`PidTagAttachLongFilename`, 0x3707) is read from the compound file
//! directly with `cfb`.

use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use base64::Engine;
use msg_parser::Outlook;
use tracing::{debug, warn};

use crate::error::{ExtractError, Result};
use crate::model::address::{join_addresses, EmailAddress};
use crate::model::attachment::Attachment;
use crate::model::message::Message;

use super::{date, non_empty, MessageSource};

/// Reads Outlook mail items with `msg_parser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgParser;

impl MessageSource for MsgParser {
    fn parse_path(&self, path: &Path) -> Result<Message> {
        if !path.exists() {
            return Err(ExtractError::FileNotFound(path.to_path_buf()));
        }
        let outlook = Outlook::from_path(path).map_err(|e| ExtractError::MsgParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let long_names = long_filenames(path).unwrap_or_else(|e| {
            debug!(path = %path.display(), error = %e, "No long attachment filenames");
            Vec::new()
        });
        outlook_to_message(outlook, &long_names)
    }
}

const ATTACH_STORAGE_PREFIX: &str = "__attach_version1.0_#";
const LONG_FILENAME_UNICODE: &str = "__substg1.0_3707001F";
const LONG_FILENAME_ANSI: &str = "__substg1.0_3707001E";

/// Long filename of every top-level attachment storage, in storage id order.
///
/// `msg_parser` lists attachments in the same order.
fn long_filenames(path: &Path) -> std::io::Result<Vec<Option<String>>> {
    let mut comp = cfb::CompoundFile::open(std::fs::File::open(path)?)?;
    let mut storages: Vec<(u32, PathBuf)> = comp
        .read_root_storage()
        .filter(|entry| entry.is_storage())
        .filter_map(|entry| {
            let id = entry.name().strip_prefix(ATTACH_STORAGE_PREFIX)?;
            let id = u32::from_str_radix(id, 16).ok()?;
            Some((id, entry.path().to_path_buf()))
        })
        .collect();
    storages.sort_by_key(|(id, _)| *id);

    let mut names = Vec::with_capacity(storages.len());
    for (_, storage) in &storages {
        names.push(read_long_filename(&mut comp, storage)?);
    }
    Ok(names)
}

fn read_long_filename<F: Read + Seek>(
    comp: &mut cfb::CompoundFile<F>,
    storage: &Path,
) -> std::io::Result<Option<String>> {
    let unicode = storage.join(LONG_FILENAME_UNICODE);
    if comp.is_stream(&unicode) {
        let mut buf = Vec::new();
        comp.open_stream(&unicode)?.read_to_end(&mut buf)?;
        let units: Vec<u16> = buf
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        return Ok(non_empty(String::from_utf16_lossy(&units).trim_end_matches('\0')));
    }

    let ansi = storage.join(LONG_FILENAME_ANSI);
    if comp.is_stream(&ansi) {
        let mut buf = Vec::new();
        comp.open_stream(&ansi)?.read_to_end(&mut buf)?;
        return Ok(non_empty(String::from_utf8_lossy(&buf).trim_end_matches('\0')));
    }
    Ok(None)
}

fn outlook_to_message(outlook: Outlook, long_names: &[Option<String>]) -> Result<Message> {
    let sender = EmailAddress::new(Some(&outlook.sender.name), Some(&outlook.sender.email));
    let to: Vec<EmailAddress> = outlook
        .to
        .iter()
        .map(|person| EmailAddress::new(Some(&person.name), Some(&person.email)))
        .collect();

    // Storages without any readable property are dropped by msg_parser, so
    // the lists only line up when their lengths agree.
    let long_names: &[Option<String>] = if long_names.len() == outlook.attachments.len() {
        long_names
    } else {
        if !long_names.is_empty() {
            warn!(
                storages = long_names.len(),
                attachments = outlook.attachments.len(),
                "Attachment storages do not line up, ignoring long filenames"
            );
        }
        &[]
    };

    let mut attachments = Vec::with_capacity(outlook.attachments.len());
    for (idx, att) in outlook.attachments.iter().enumerate() {
        let long_name = long_names.get(idx).and_then(Option::as_deref);
        let Some(filename) = resolve_filename(long_name, &att.display_name, &att.file_name)
        else {
            warn!(index = idx, "Skipping Outlook attachment without a filename");
            continue;
        };
        let data = decode_payload(&filename, &att.payload)?;
        debug!(index = idx, filename = %filename, size = data.len(), "Attachment");
        attachments.push(Attachment {
            filename,
            content_type: non_empty(&att.mime_tag),
            data,
        });
    }

    Ok(Message {
        subject: non_empty(&outlook.subject),
        sender: join_addresses([&sender]),
        recipients: join_addresses(&to),
        date: date::parse_date(&outlook.headers.date),
        body: outlook.body,
        attachments,
    })
}

/// Pick the attachment's long filename, then its display name, then the 8.3 name.
fn resolve_filename(
    long_name: Option<&str>,
    display_name: &str,
    short_name: &str,
) -> Option<String> {
    long_name
        .and_then(non_empty)
        .or_else(|| non_empty(display_name))
        .or_else(|| non_empty(short_name))
}

/// Decode an attachment payload as exposed by `msg_parser`.
///
/// Binary MAPI properties come out hex-encoded; base64 is accepted too.
fn decode_payload(filename: &str, payload: &str) -> Result<Vec<u8>> {
    let trimmed = payload.trim();
    if let Ok(bytes) = hex::decode(trimmed) {
        return Ok(bytes);
    }
    base64::engine::general_purpose::STANDARD
        .decode(trimmed)
        .map_err(|e| ExtractError::AttachmentDecode {
            filename: filename.to_string(),
            reason: e.to_string(),
        })
}
