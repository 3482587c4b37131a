//! Fixed-width record codec
//!
//! Turns a batch of [`Record`]s into one header line and one detail line per
//! record. The codec is configured once per run through [`CodecSettings`]
//! and never reads ambient state.
//!
//! A record that cannot be formatted at all becomes an empty line so the rest
//! of the batch still exports; the failure is logged and kept on the
//! [`EncodedBatch`].

pub mod detail;
pub mod encoding;
pub mod fields;
pub mod header;
pub mod layout;
pub mod lookup;

pub use detail::{format_detail, DetailContext, DetailLine};
pub use encoding::OutputEncoding;
pub use header::{format_header, DestinationKind, HeaderIdentity, HEADER_WIDTH};
pub use layout::{FieldSpec, LayoutVersion};

use crate::core::aggregate::HeaderDescriptor;
use crate::domain::{Cnes, Competency, FieldFormatError, Record, Result};
use crate::log_record_fallback;

/// Line terminator of the fixed-width file
pub const LINE_TERMINATOR: &str = "\r\n";

/// Everything the codec needs to know about the issuing facility and output
#[derive(Debug, Clone)]
pub struct CodecSettings {
    pub cnes: Cnes,
    pub identity: HeaderIdentity,
    pub layout: LayoutVersion,
    pub encoding: OutputEncoding,
}

/// A fully formatted batch, ready to be encoded and written
#[derive(Debug, Clone)]
pub struct EncodedBatch {
    pub descriptor: HeaderDescriptor,
    pub header: String,
    /// One entry per record; empty for records that could not be formatted
    pub lines: Vec<String>,
    /// Records replaced by an empty line
    pub failures: Vec<FieldFormatError>,
    /// Field-level fallbacks applied to records that were kept
    pub substitutions: Vec<FieldFormatError>,
}

impl EncodedBatch {
    /// Whole file content, every line terminated by CRLF
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for line in std::iter::once(&self.header).chain(self.lines.iter()) {
            out.push_str(line);
            out.push_str(LINE_TERMINATOR);
        }
        out
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}

/// Header plus detail formatter for one configured facility
#[derive(Debug, Clone)]
pub struct RecordCodec {
    settings: CodecSettings,
}

impl RecordCodec {
    pub fn new(settings: CodecSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CodecSettings {
        &self.settings
    }

    pub fn format_header(&self, descriptor: &HeaderDescriptor) -> String {
        format_header(descriptor, &self.settings.identity)
    }

    /// Formats one record at its 1-based position in the batch
    pub fn format_detail(
        &self,
        record: &Record,
        index: usize,
        competency: Competency,
    ) -> std::result::Result<DetailLine, FieldFormatError> {
        format_detail(record, index, &self.context(competency))
    }

    /// Formats a whole batch against its precomputed header totals
    ///
    /// Per-record problems are recovered; this never fails.
    pub fn encode_batch(&self, descriptor: HeaderDescriptor, records: &[Record]) -> EncodedBatch {
        let ctx = self.context(descriptor.competency);
        let mut lines = Vec::with_capacity(records.len());
        let mut failures = Vec::new();
        let mut substitutions = Vec::new();

        for (offset, record) in records.iter().enumerate() {
            match format_detail(record, offset + 1, &ctx) {
                Ok(line) => {
                    for substitution in &line.substitutions {
                        log_record_fallback!(
                            substitution,
                            descriptor.competency,
                            "unencodable characters replaced by '?'"
                        );
                    }
                    substitutions.extend(line.substitutions);
                    lines.push(line.text);
                }
                Err(error) => {
                    log_record_fallback!(&error, descriptor.competency, "empty line");
                    failures.push(error);
                    lines.push(String::new());
                }
            }
        }

        EncodedBatch {
            header: self.format_header(&descriptor),
            descriptor,
            lines,
            failures,
            substitutions,
        }
    }

    /// Aggregates the batch and formats it in one step
    ///
    /// Fails only for an empty batch.
    pub fn encode(&self, competency: Competency, records: &[Record]) -> Result<EncodedBatch> {
        let descriptor = HeaderDescriptor::from_records(competency, records)?;
        Ok(self.encode_batch(descriptor, records))
    }

    fn context(&self, competency: Competency) -> DetailContext<'_> {
        DetailContext {
            cnes: &self.settings.cnes,
            competency,
            layout: self.settings.layout,
            encoding: self.settings.encoding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Cnpj;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn codec(layout: LayoutVersion) -> RecordCodec {
        RecordCodec::new(CodecSettings {
            cnes: Cnes::new("2560372").unwrap(),
            identity: HeaderIdentity {
                org_name: "Hospital Exemplo".to_string(),
                org_acronym: "HEX".to_string(),
                cnpj: Cnpj::new("25062282000182").unwrap(),
                destination_name: "Secretaria Municipal de Saude".to_string(),
                destination_kind: DestinationKind::Municipal,
                version_tag: "D04.10".to_string(),
            },
            layout,
            encoding: OutputEncoding::Utf8,
        })
    }

    fn record(i: usize) -> Record {
        Record::new()
            .with("cod_procedimento", format!("03010100{i:02}"))
            .with("quantidade", "1")
            .with("data_atendimento", "2024-01-10")
    }

    #[test]
    fn test_encode_batch_widths_and_terminators() {
        let codec = codec(LayoutVersion::Extended);
        let records: Vec<Record> = (1..=3).map(record).collect();
        let batch = codec.encode(Competency::new(2024, 1).unwrap(), &records).unwrap();

        assert_eq!(batch.header.chars().count(), HEADER_WIDTH);
        assert!(batch.lines.iter().all(|l| l.chars().count() == 349));

        let text = batch.to_text();
        assert!(text.ends_with("\r\n"));
        assert_eq!(text.matches("\r\n").count(), 4);
    }

    #[test]
    fn test_unusable_record_becomes_empty_line() {
        let codec = codec(LayoutVersion::Compact);
        let records = vec![record(1), Record::new(), record(3)];
        let batch = codec.encode(Competency::new(2024, 1).unwrap(), &records).unwrap();

        assert_eq!(batch.lines.len(), 3);
        assert_eq!(batch.lines[1], "");
        assert_eq!(batch.failed_count(), 1);
        assert_eq!(batch.failures[0].record_index(), 2);
        assert_eq!(batch.lines[2].chars().count(), 177);
        assert_eq!(batch.descriptor.total_lines, 3);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_fallback_log_names_competency_and_stage() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let codec = codec(LayoutVersion::Extended);
        let records = vec![record(1), Record::new()];
        tracing::subscriber::with_default(subscriber, || {
            codec.encode(Competency::new(2024, 1).unwrap(), &records).unwrap();
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Record formatting recovered"));
        assert!(output.contains("competency=202401"));
        assert!(output.contains("stage=WRITING"));
        assert!(output.contains("record_index=2"));
    }

    #[test]
    fn test_empty_batch_fails_before_formatting() {
        let codec = codec(LayoutVersion::Extended);
        let err = codec.encode(Competency::new(2024, 1).unwrap(), &[]).unwrap_err();
        assert!(err.is_no_data());
    }
}
