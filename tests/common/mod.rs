//! Fixture builders shared by the integration tests.
//!
//! EML and PDF fixtures are generated in the test, so the expected bytes are
//! always at hand. Outlook items cannot be built that way and live under
//! `tests/fixtures/`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use base64::Engine;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Path of a checked-in fixture file.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Build a PDF with one line of Courier text per page.
pub fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// One attachment of a generated message.
pub struct Part<'a> {
    pub filename: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

/// Build a `multipart/mixed` RFC 5322 message.
///
/// The body and every attachment are base64-encoded, so the decoded bytes are
/// exactly `body` and `Part::data`.
pub fn eml_bytes(subject: &str, body: &str, parts: &[Part<'_>]) -> Vec<u8> {
    let mut out = String::new();
    out.push_str("From: Alice Example <alice@example.com>\r\n");
    out.push_str("To: Bob Example <bob@example.com>\r\n");
    out.push_str(&format!("Subject: {subject}\r\n"));
    out.push_str("Date: Tue, 2 Jan 2024 09:30:00 +0000\r\n");
    out.push_str("MIME-Version: 1.0\r\n");
    out.push_str("Content-Type: multipart/mixed; boundary=\"=_mailsift_test\"\r\n\r\n");

    out.push_str("--=_mailsift_test\r\n");
    out.push_str("Content-Type: text/plain; charset=utf-8\r\n");
    out.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
    out.push_str(&wrapped_base64(body.as_bytes()));

    for part in parts {
        out.push_str("--=_mailsift_test\r\n");
        out.push_str(&format!(
            "Content-Type: {}; name=\"{}\"\r\n",
            part.content_type, part.filename
        ));
        out.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{}\"\r\n",
            part.filename
        ));
        out.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
        out.push_str(&wrapped_base64(part.data));
    }
    out.push_str("--=_mailsift_test--\r\n");
    out.into_bytes()
}

fn wrapped_base64(data: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / 76 * 2 + 2);
    for chunk in encoded.as_bytes().chunks(76) {
        out.push_str(std::str::from_utf8(chunk).unwrap());
        out.push_str("\r\n");
    }
    out
}
