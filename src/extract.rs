//! The extraction driver: parse, report, save attachments, read PDFs.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::error::Result;
use crate::export::attachment::save_attachment;
use crate::model::message::Message;
use crate::parser::ContainerFormat;
use crate::pdf::extract_pdf_text;
use crate::report::ReportSink;

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "attachments";

/// Default extension that triggers PDF text extraction.
pub const DEFAULT_PDF_EXTENSION: &str = "pdf";

/// What happened to one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionOutcome {
    /// Paths written, in attachment order (a path repeats if a name collided).
    pub saved: Vec<PathBuf>,
    /// PDF attachments whose text was extracted.
    pub pdf_extracted: usize,
    /// PDF attachments whose text could not be extracted.
    pub pdf_failed: usize,
}

/// Result of running several inputs.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Inputs processed to the end.
    pub succeeded: usize,
    /// Inputs that failed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Runs the extraction pass for messages.
#[derive(Debug, Clone)]
pub struct Extractor {
    output_dir: PathBuf,
    pdf_extension: String,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl Extractor {
    /// Save attachments under `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            pdf_extension: DEFAULT_PDF_EXTENSION.to_string(),
        }
    }

    /// Change the extension (without the dot) that triggers PDF extraction.
    pub fn with_pdf_extension(mut self, extension: impl Into<String>) -> Self {
        self.pdf_extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Directory that receives saved attachments.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Parse `path` as `format` and process the resulting message.
    ///
    /// The sink sees `begin`, the message events and `end`. Errors from
    /// parsing or saving abort this input and are returned; the sink is not
    /// told about them (see [`extract_all`](Self::extract_all)).
    pub fn extract(
        &self,
        format: ContainerFormat,
        path: &Path,
        sink: &mut dyn ReportSink,
    ) -> Result<ExtractionOutcome> {
        sink.begin(path, format)?;
        let message = format.parse(path)?;
        info!(
            path = %path.display(),
            %format,
            attachments = message.attachments.len(),
            "Parsed message"
        );
        let outcome = self.process_message(&message, sink)?;
        sink.end()?;
        Ok(outcome)
    }

    /// Report `message` and handle its attachments in order.
    ///
    /// A PDF whose text cannot be read is reported and skipped. Any other
    /// error stops processing of this message.
    pub fn process_message(
        &self,
        message: &Message,
        sink: &mut dyn ReportSink,
    ) -> Result<ExtractionOutcome> {
        sink.message(message)?;

        let mut outcome = ExtractionOutcome::default();
        if !message.has_attachments() {
            sink.no_attachments()?;
            return Ok(outcome);
        }

        for attachment in &message.attachments {
            sink.attachment_found(attachment)?;
            let path = save_attachment(attachment, &self.output_dir)?;
            sink.attachment_saved(attachment, &path)?;

            if attachment.has_extension(&self.pdf_extension) {
                let text = extract_pdf_text(&path);
                match &text {
                    Ok(_) => outcome.pdf_extracted += 1,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Could not read PDF attachment");
                        outcome.pdf_failed += 1;
                    }
                }
                sink.pdf_text(&attachment.filename, &text)?;
            }
            outcome.saved.push(path);
        }

        Ok(outcome)
    }

    /// Process each input independently.
    ///
    /// A failing input is reported to the sink and logged; the remaining
    /// inputs are still attempted.
    pub fn extract_all<'a, I>(&self, inputs: I, sink: &mut dyn ReportSink) -> BatchSummary
    where
        I: IntoIterator<Item = (ContainerFormat, &'a Path)>,
    {
        let mut summary = BatchSummary::default();
        for (format, path) in inputs {
            match self.extract(format, path, sink) {
                Ok(_) => summary.succeeded += 1,
                Err(e) => {
                    error!(path = %path.display(), %format, error = %e, "Extraction failed");
                    let reported = sink.failure(&e).and_then(|()| sink.end());
                    if let Err(report_err) = reported {
                        warn!(error = %report_err, "Could not report failure");
                    }
                    summary.failed.push((path.to_path_buf(), e.to_string()));
                }
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attachment::Attachment;
    use crate::report::TextReport;

    fn attachment(filename: &str, data: &[u8]) -> Attachment {
        Attachment {
            filename: filename.to_string(),
            content_type: None,
            data: data.to_vec(),
        }
    }

    fn run(extractor: &Extractor, message: &Message) -> (Result<ExtractionOutcome>, String) {
        let mut report = TextReport::new(Vec::new());
        let result = extractor.process_message(message, &mut report);
        (result, String::from_utf8(report.into_inner()).unwrap())
    }

    #[test]
    fn test_no_attachments_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("attachments");
        let extractor = Extractor::new(&out);

        let (result, text) = run(&extractor, &Message::default());

        assert!(result.unwrap().saved.is_empty());
        assert!(text.contains("No attachments found."));
        assert!(!out.exists());
    }

    #[test]
    fn test_non_pdf_is_saved_without_extraction() {
        let tmp = tempfile::tempdir().unwrap();
        let extractor = Extractor::new(tmp.path());
        let message = Message {
            attachments: vec![attachment("notes.txt", b"hello")],
            ..Message::default()
        };

        let (result, text) = run(&extractor, &message);
        let outcome = result.unwrap();

        assert_eq!(outcome.saved, vec![tmp.path().join("notes.txt")]);
        assert_eq!(outcome.pdf_extracted + outcome.pdf_failed, 0);
        assert!(!text.contains("PDF Content"));
    }

    #[test]
    fn test_broken_pdf_does_not_stop_later_attachments() {
        let tmp = tempfile::tempdir().unwrap();
        let extractor = Extractor::new(tmp.path());
        let message = Message {
            attachments: vec![
                attachment("broken.PDF", b"definitely not a pdf"),
                attachment("after.txt", b"still saved"),
            ],
            ..Message::default()
        };

        let (result, text) = run(&extractor, &message);
        let outcome = result.unwrap();

        assert_eq!(outcome.pdf_failed, 1);
        assert_eq!(outcome.saved.len(), 2);
        assert!(text.contains("=== PDF Content: broken.PDF ===\nError reading PDF: "));
        assert_eq!(std::fs::read(tmp.path().join("after.txt")).unwrap(), b"still saved");
    }

    #[test]
    fn test_invalid_filename_aborts_message() {
        let tmp = tempfile::tempdir().unwrap();
        let extractor = Extractor::new(tmp.path());
        let message = Message {
            attachments: vec![
                attachment("../evil.sh", b"x"),
                attachment("never.txt", b"y"),
            ],
            ..Message::default()
        };

        let (result, _) = run(&extractor, &message);

        assert!(result.is_err());
        assert!(!tmp.path().join("never.txt").exists());
    }

    #[test]
    fn test_custom_pdf_extension() {
        let extractor = Extractor::new("out").with_pdf_extension(".PDFX");
        assert_eq!(extractor.pdf_extension, "PDFX");
        assert_eq!(extractor.output_dir(), Path::new("out"));
    }
}
