//! Report sinks: where the extracted information goes.
//!
//! The driver never prints. It calls a [`ReportSink`], which either streams
//! labeled text sections ([`TextReport`]) or collects a [`MessageReport`] per
//! input and writes it as JSON ([`JsonReport`]).

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ExtractError, Result};
use crate::model::attachment::Attachment;
use crate::model::message::Message;
use crate::parser::ContainerFormat;

/// Receives the events of one extraction pass, in order.
///
/// For every input the driver calls [`begin`](Self::begin), then either
/// [`failure`](Self::failure) or [`message`](Self::message) followed by the
/// attachment events, and finally [`end`](Self::end).
pub trait ReportSink {
    /// A new input is about to be processed.
    fn begin(&mut self, source: &Path, format: ContainerFormat) -> Result<()>;

    /// Headers and body of the parsed message.
    fn message(&mut self, message: &Message) -> Result<()>;

    /// The message carries no attachments.
    fn no_attachments(&mut self) -> Result<()>;

    /// An attachment is about to be saved.
    fn attachment_found(&mut self, attachment: &Attachment) -> Result<()>;

    /// The attachment was written to `path`.
    fn attachment_saved(&mut self, attachment: &Attachment, path: &Path) -> Result<()>;

    /// Outcome of PDF text extraction for the attachment named `filename`.
    fn pdf_text(&mut self, filename: &str, outcome: &Result<String>) -> Result<()>;

    /// Processing of the current input failed with `error`.
    fn failure(&mut self, error: &ExtractError) -> Result<()>;

    /// The current input is done.
    fn end(&mut self) -> Result<()>;
}

/// Sentinel text shown in place of PDF content when extraction fails.
pub fn pdf_error_text(error: &ExtractError) -> String {
    format!("Error reading PDF: {error}")
}

// ── Text ────────────────────────────────────────────────────────

/// Human-readable report with `=== Section ===` headers.
pub struct TextReport<W: Write> {
    out: W,
    date_format: String,
}

impl<W: Write> TextReport<W> {
    /// Report to `out`, rendering dates as RFC 2822.
    pub fn new(out: W) -> Self {
        Self {
            out,
            date_format: "%a, %d %b %Y %H:%M:%S %z".to_string(),
        }
    }

    /// Use a `strftime` format for the Date line.
    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: std::fmt::Arguments<'_>) -> Result<()> {
        self.out.write_fmt(text).map_err(ExtractError::Report)
    }
}

fn or_none(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("(none)")
}

impl<W: Write> ReportSink for TextReport<W> {
    fn begin(&mut self, source: &Path, format: ContainerFormat) -> Result<()> {
        tracing::debug!(source = %source.display(), %format, "Reporting");
        Ok(())
    }

    fn message(&mut self, message: &Message) -> Result<()> {
        let date = message
            .date
            .map(|d| d.format(&self.date_format).to_string());
        self.write(format_args!(
            "\n=== Email Contents ===\nSubject: {}\nFrom: {}\nTo: {}\nDate: {}\n",
            or_none(&message.subject),
            or_none(&message.sender),
            or_none(&message.recipients),
            or_none(&date),
        ))?;
        self.write(format_args!("\n=== Email Body ===\n{}\n", message.body))?;
        if message.has_attachments() {
            self.write(format_args!("\n=== Attachments ===\n"))?;
        }
        Ok(())
    }

    fn no_attachments(&mut self) -> Result<()> {
        self.write(format_args!("\nNo attachments found.\n"))
    }

    fn attachment_found(&mut self, attachment: &Attachment) -> Result<()> {
        self.write(format_args!("Found attachment: {}\n", attachment.filename))
    }

    fn attachment_saved(&mut self, attachment: &Attachment, path: &Path) -> Result<()> {
        let size = humansize::format_size(attachment.size(), humansize::BINARY);
        self.write(format_args!(
            "Saved attachment to: {} ({size})\n",
            path.display()
        ))
    }

    fn pdf_text(&mut self, filename: &str, outcome: &Result<String>) -> Result<()> {
        let text = match outcome {
            Ok(text) => text.clone(),
            Err(e) => pdf_error_text(e),
        };
        self.write(format_args!("\n=== PDF Content: {filename} ===\n{text}\n"))
    }

    fn failure(&mut self, error: &ExtractError) -> Result<()> {
        self.write(format_args!("Error: {error}\n"))
    }

    fn end(&mut self) -> Result<()> {
        self.out.flush().map_err(ExtractError::Report)
    }
}

// ── JSON ────────────────────────────────────────────────────────

/// Everything extracted from one input, as written by [`JsonReport`].
#[derive(Debug, Clone, Serialize)]
pub struct MessageReport {
    pub source: PathBuf,
    pub format: ContainerFormat,
    pub subject: Option<String>,
    pub sender: Option<String>,
    pub recipients: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub body: Option<String>,
    pub attachments: Vec<AttachmentReport>,
    /// Set when processing stopped early.
    pub error: Option<String>,
}

/// One attachment entry of a [`MessageReport`].
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentReport {
    pub filename: String,
    pub content_type: Option<String>,
    pub size: u64,
    /// `None` until the file has been written.
    pub saved_to: Option<PathBuf>,
    pub pdf: Option<PdfReport>,
}

/// PDF extraction outcome of an attachment.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PdfReport {
    Ok { text: String },
    Error { reason: String },
}

/// Writes one pretty-printed JSON object per input.
pub struct JsonReport<W: Write> {
    out: W,
    current: Option<MessageReport>,
}

impl<W: Write> JsonReport<W> {
    pub fn new(out: W) -> Self {
        Self { out, current: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn current(&mut self) -> Result<&mut MessageReport> {
        self.current.as_mut().ok_or_else(|| {
            ExtractError::Report(std::io::Error::other("report event outside begin/end"))
        })
    }

    fn last_attachment(&mut self) -> Result<&mut AttachmentReport> {
        self.current()?.attachments.last_mut().ok_or_else(|| {
            ExtractError::Report(std::io::Error::other("attachment event before attachment_found"))
        })
    }
}

impl<W: Write> ReportSink for JsonReport<W> {
    fn begin(&mut self, source: &Path, format: ContainerFormat) -> Result<()> {
        self.current = Some(MessageReport {
            source: source.to_path_buf(),
            format,
            subject: None,
            sender: None,
            recipients: None,
            date: None,
            body: None,
            attachments: Vec::new(),
            error: None,
        });
        Ok(())
    }

    fn message(&mut self, message: &Message) -> Result<()> {
        let report = self.current()?;
        report.subject = message.subject.clone();
        report.sender = message.sender.clone();
        report.recipients = message.recipients.clone();
        report.date = message.date;
        report.body = Some(message.body.clone());
        Ok(())
    }

    fn no_attachments(&mut self) -> Result<()> {
        Ok(())
    }

    fn attachment_found(&mut self, attachment: &Attachment) -> Result<()> {
        self.current()?.attachments.push(AttachmentReport {
            filename: attachment.filename.clone(),
            content_type: attachment.content_type.clone(),
            size: attachment.size(),
            saved_to: None,
            pdf: None,
        });
        Ok(())
    }

    fn attachment_saved(&mut self, _attachment: &Attachment, path: &Path) -> Result<()> {
        self.last_attachment()?.saved_to = Some(path.to_path_buf());
        Ok(())
    }

    fn pdf_text(&mut self, _filename: &str, outcome: &Result<String>) -> Result<()> {
        self.last_attachment()?.pdf = Some(match outcome {
            Ok(text) => PdfReport::Ok { text: text.clone() },
            Err(e) => PdfReport::Error {
                reason: e.to_string(),
            },
        });
        Ok(())
    }

    fn failure(&mut self, error: &ExtractError) -> Result<()> {
        self.current()?.error = Some(error.to_string());
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        let Some(report) = self.current.take() else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| ExtractError::Report(std::io::Error::other(e)))?;
        writeln!(self.out, "{json}").map_err(ExtractError::Report)?;
        self.out.flush().map_err(ExtractError::Report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_message() -> Message {
        Message {
            subject: Some("Invoice".to_string()),
            sender: Some("Alice <alice@example.com>".to_string()),
            recipients: None,
            date: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            body: "Please find it attached.".to_string(),
            attachments: vec![Attachment {
                filename: "invoice.pdf".to_string(),
                content_type: Some("application/pdf".to_string()),
                data: vec![0; 2048],
            }],
        }
    }

    #[test]
    fn test_text_report_sections() {
        let message = sample_message();
        let mut report = TextReport::new(Vec::new()).with_date_format("%Y-%m-%d %H:%M");
        report.begin(Path::new("a.eml"), ContainerFormat::Eml).unwrap();
        report.message(&message).unwrap();
        report.attachment_found(&message.attachments[0]).unwrap();
        report
            .attachment_saved(&message.attachments[0], Path::new("out/invoice.pdf"))
            .unwrap();
        report.pdf_text("invoice.pdf", &Ok("Total: 42\n".to_string())).unwrap();
        report.end().unwrap();

        let text = String::from_utf8(report.into_inner()).unwrap();
        assert!(text.contains("=== Email Contents ===\nSubject: Invoice\n"));
        assert!(text.contains("From: Alice <alice@example.com>\n"));
        assert!(text.contains("To: (none)\n"));
        assert!(text.contains("Date: 2024-01-02 03:04\n"));
        assert!(text.contains("=== Email Body ===\nPlease find it attached.\n"));
        assert!(text.contains("=== Attachments ===\nFound attachment: invoice.pdf\n"));
        assert!(text.contains("Saved attachment to: out/invoice.pdf (2 KiB)\n"));
        assert!(text.contains("=== PDF Content: invoice.pdf ===\nTotal: 42\n"));
    }

    #[test]
    fn test_text_report_pdf_error_sentinel() {
        let mut report = TextReport::new(Vec::new());
        let outcome = Err(ExtractError::Pdf("bad xref".to_string()));
        report.pdf_text("broken.pdf", &outcome).unwrap();
        let text = String::from_utf8(report.into_inner()).unwrap();
        assert!(text.contains("Error reading PDF: bad xref"));
    }

    #[test]
    fn test_json_report_collects_one_object() {
        let message = sample_message();
        let mut report = JsonReport::new(Vec::new());
        report.begin(Path::new("a.msg"), ContainerFormat::Msg).unwrap();
        report.message(&message).unwrap();
        report.attachment_found(&message.attachments[0]).unwrap();
        report
            .attachment_saved(&message.attachments[0], Path::new("out/invoice.pdf"))
            .unwrap();
        report
            .pdf_text("invoice.pdf", &Err(ExtractError::Pdf("bad xref".to_string())))
            .unwrap();
        report.end().unwrap();

        let value: serde_json::Value = serde_json::from_slice(&report.into_inner()).unwrap();
        assert_eq!(value["format"], "msg");
        assert_eq!(value["subject"], "Invoice");
        assert_eq!(value["attachments"][0]["size"], 2048);
        assert_eq!(value["attachments"][0]["saved_to"], "out/invoice.pdf");
        assert_eq!(value["attachments"][0]["pdf"]["status"], "error");
        assert_eq!(value["attachments"][0]["pdf"]["reason"], "bad xref");
        assert!(value["error"].is_null());
    }

    #[test]
    fn test_json_report_event_without_begin() {
        let mut report = JsonReport::new(Vec::new());
        assert!(matches!(
            report.message(&sample_message()),
            Err(ExtractError::Report(_))
        ));
    }
}
