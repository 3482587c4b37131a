//! Export pipeline
//!
//! Two public entry points: [`ExportPipeline::fetch`] reads the records of a
//! period from the configured source, and [`ExportPipeline::render`] turns a
//! fetched batch into a file. [`ExportPipeline::run`] chains them.
//!
//! The fixed-width render walks `VALIDATING -> AGGREGATING -> WRITING -> DONE`;
//! tabular renders go straight to `WRITING`. The whole output is built in
//! memory before anything touches the destination.

use crate::adapters::RecordSource;
use crate::config::BpaConfig;
use crate::core::aggregate::HeaderDescriptor;
use crate::core::codec::{CodecSettings, HeaderIdentity, RecordCodec};
use crate::core::export::state::{ExportState, StateTrail};
use crate::core::export::summary::{ExportFormat, ExportReport};
use crate::core::export::tabular::{render_csv, render_xlsx};
use crate::core::export::writer::{fixed_width_file_name, tabular_file_name, write_atomic};
use crate::core::statistics::BatchStatistics;
use crate::core::validation::{validate_batch, ValidationReport};
use crate::domain::{BpaError, Cnes, Cnpj, Competency, Record, Result};
use crate::{log_error_with_context, log_export_complete, log_export_start};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// What to do when advisory validation finds problems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Warnings are reported and the export continues
    #[default]
    Proceed,
    /// Any warning stops the run with [`BpaError::Validation`]
    Strict,
}

/// Records fetched for one run, read-only from here on
#[derive(Debug, Clone)]
pub struct FetchedBatch {
    competency: Option<Competency>,
    records: Vec<Record>,
    statistics: BatchStatistics,
}

impl FetchedBatch {
    pub fn new(competency: Option<Competency>, records: Vec<Record>) -> Self {
        let statistics = BatchStatistics::from_records(&records);
        Self {
            competency,
            records,
            statistics,
        }
    }

    pub fn competency(&self) -> Option<Competency> {
        self.competency
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn statistics(&self) -> &BatchStatistics {
        &self.statistics
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Result of a fetch
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Records(FetchedBatch),
    /// The source answered but had nothing for the period
    NoData { competency: Option<Competency> },
}

/// Fetch/render orchestration over one record source
pub struct ExportPipeline {
    source: Arc<dyn RecordSource>,
    codec: RecordCodec,
    output_dir: PathBuf,
    file_prefix: String,
}

impl ExportPipeline {
    /// Builds the pipeline from a loaded configuration
    ///
    /// # Errors
    ///
    /// Returns [`BpaError::ConfigValidation`] if the facility code or tax ID
    /// fail their shape check.
    pub fn new(config: &BpaConfig, source: Arc<dyn RecordSource>) -> Result<Self> {
        Ok(Self {
            source,
            codec: RecordCodec::new(codec_settings(config)?),
            output_dir: PathBuf::from(&config.export.output_dir),
            file_prefix: config.export.file_prefix.clone(),
        })
    }

    /// Overrides the destination directory used by [`ExportPipeline::run`]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn codec(&self) -> &RecordCodec {
        &self.codec
    }

    /// Reads the records of `competency` (every record when `None`)
    ///
    /// # Errors
    ///
    /// Returns [`BpaError::DataSource`] when the source fails. An empty
    /// result is not an error; it comes back as [`FetchOutcome::NoData`].
    pub async fn fetch(&self, competency: Option<Competency>) -> Result<FetchOutcome> {
        let period = period_label(competency);
        tracing::info!(
            competency = %period,
            source = %self.source.describe(),
            stage = %ExportState::Fetching,
            "Fetching records"
        );

        let records = match self.source.fetch_records(competency.as_ref()).await {
            Ok(records) => records,
            Err(e) => {
                log_error_with_context!(
                    &e,
                    "Failed to fetch records",
                    competency = %period,
                    record_count = 0,
                    stage = %ExportState::Fetching
                );
                return Err(e);
            }
        };

        if records.is_empty() {
            tracing::info!(
                competency = %period,
                stage = %ExportState::NoData,
                "No records for period"
            );
            return Ok(FetchOutcome::NoData { competency });
        }

        let batch = FetchedBatch::new(competency, records);
        batch.statistics().log();
        Ok(FetchOutcome::Records(batch))
    }

    /// Runs advisory validation over a batch
    ///
    /// # Errors
    ///
    /// Returns [`BpaError::ConfigValidation`] for a batch fetched without a
    /// competency, since service dates are checked against the period.
    pub fn validate(&self, batch: &FetchedBatch) -> Result<ValidationReport> {
        let competency = require_competency(batch)?;
        let report = validate_batch(competency, batch.records());
        if !report.is_clean() {
            tracing::warn!(
                competency = %competency,
                record_count = batch.len(),
                warning_count = report.warnings.len(),
                records_with_warnings = report.records_with_warnings(),
                stage = %ExportState::Validating,
                "Validation found problems"
            );
        }
        Ok(report)
    }

    /// Writes `batch` as `format` into `dest_dir`
    ///
    /// # Errors
    ///
    /// - [`BpaError::EmptyResult`] for an empty batch (no file is written)
    /// - [`BpaError::ConfigValidation`] for a fixed-width render without a
    ///   competency
    /// - [`BpaError::Write`] when the destination cannot be written; no
    ///   partial file is left under the final name
    pub fn render(
        &self,
        batch: &FetchedBatch,
        format: ExportFormat,
        dest_dir: &Path,
    ) -> Result<ExportReport> {
        self.render_inner(batch, None, format, dest_dir)
    }

    /// Same as [`ExportPipeline::render`], reusing a report the caller already
    /// obtained from [`ExportPipeline::validate`] for this batch
    pub fn render_validated(
        &self,
        batch: &FetchedBatch,
        validation: ValidationReport,
        format: ExportFormat,
        dest_dir: &Path,
    ) -> Result<ExportReport> {
        self.render_inner(batch, Some(validation), format, dest_dir)
    }

    fn render_inner(
        &self,
        batch: &FetchedBatch,
        validation: Option<ValidationReport>,
        format: ExportFormat,
        dest_dir: &Path,
    ) -> Result<ExportReport> {
        let started = Instant::now();
        let mut trail = StateTrail::new();

        let outcome = if format.is_fixed_width() {
            self.render_fixed_width(batch, validation, dest_dir, &mut trail)
        } else {
            self.render_tabular(batch, format, dest_dir, &mut trail)
        };

        match outcome {
            Ok(mut report) => {
                report.trail = trail;
                report.duration = started.elapsed();
                log_export_complete!(report.record_count, report.duration);
                Ok(report)
            }
            Err(e) => {
                if !e.is_no_data() {
                    let stage = trail.current();
                    trail.fail();
                    log_error_with_context!(
                        &e,
                        "Export failed",
                        competency = %period_label(batch.competency()),
                        record_count = batch.len(),
                        stage = %stage,
                        trail = %trail
                    );
                }
                Err(e)
            }
        }
    }

    /// Fetches, validates and renders one competency into the configured
    /// output directory
    pub async fn run(
        &self,
        competency: Competency,
        format: ExportFormat,
        policy: ValidationPolicy,
    ) -> Result<ExportReport> {
        log_export_start!(competency, format);

        let batch = match self.fetch(Some(competency)).await? {
            FetchOutcome::Records(batch) => batch,
            FetchOutcome::NoData { .. } => {
                return Err(BpaError::EmptyResult {
                    competency: competency.to_string(),
                })
            }
        };

        let validation = if policy == ValidationPolicy::Strict && format.is_fixed_width() {
            let report = self.validate(&batch)?;
            if !report.is_clean() {
                return Err(BpaError::Validation(format!(
                    "{} warning(s) in {} record(s); strict mode stops the export",
                    report.warnings.len(),
                    report.records_with_warnings()
                )));
            }
            Some(report)
        } else {
            None
        };

        let report = self.render_inner(&batch, validation, format, &self.output_dir)?;
        report.log_summary();
        Ok(report)
    }

    fn render_fixed_width(
        &self,
        batch: &FetchedBatch,
        validation: Option<ValidationReport>,
        dest_dir: &Path,
        trail: &mut StateTrail,
    ) -> Result<ExportReport> {
        step(trail, ExportState::Validating)?;
        let competency = require_competency(batch)?;
        if batch.is_empty() {
            step(trail, ExportState::NoData)?;
            return Err(BpaError::EmptyResult {
                competency: competency.to_string(),
            });
        }
        let validation = match validation {
            Some(report) => report,
            None => self.validate(batch)?,
        };

        step(trail, ExportState::Aggregating)?;
        let descriptor = HeaderDescriptor::from_records(competency, batch.records())?;
        tracing::debug!(
            competency = %competency,
            total_lines = descriptor.total_lines,
            total_pages = descriptor.total_pages,
            control = descriptor.control,
            "Header totals computed"
        );

        step(trail, ExportState::Writing)?;
        let encoded = self.codec.encode_batch(descriptor, batch.records());
        let bytes = self.codec.settings().encoding.encode(&encoded.to_text());
        let name = fixed_width_file_name(&self.file_prefix, competency);
        let path = write_atomic(dest_dir, &name, &bytes)?;
        step(trail, ExportState::Done)?;

        Ok(ExportReport {
            format: ExportFormat::Bpa,
            competency: Some(competency),
            path,
            record_count: batch.len(),
            failed_records: encoded.failed_count(),
            substitutions: encoded.substitutions.len(),
            header: Some(descriptor),
            validation: Some(validation),
            trail: trail.clone(),
            bytes_written: bytes.len(),
            duration: Default::default(),
        })
    }

    fn render_tabular(
        &self,
        batch: &FetchedBatch,
        format: ExportFormat,
        dest_dir: &Path,
        trail: &mut StateTrail,
    ) -> Result<ExportReport> {
        if batch.is_empty() {
            step(trail, ExportState::NoData)?;
            return Err(BpaError::EmptyResult {
                competency: period_label(batch.competency()),
            });
        }

        step(trail, ExportState::Writing)?;
        let bytes = match format {
            ExportFormat::Xlsx => render_xlsx(batch.records())?,
            _ => render_csv(batch.records())?,
        };
        let name = tabular_file_name(format, chrono::Local::now().naive_local());
        let path = write_atomic(dest_dir, &name, &bytes)?;
        step(trail, ExportState::Done)?;

        Ok(ExportReport {
            format,
            competency: batch.competency(),
            path,
            record_count: batch.len(),
            failed_records: 0,
            substitutions: 0,
            header: None,
            validation: None,
            trail: trail.clone(),
            bytes_written: bytes.len(),
            duration: Default::default(),
        })
    }
}

/// Builds the codec settings, shape-checking the facility identifiers
pub fn codec_settings(config: &BpaConfig) -> Result<CodecSettings> {
    let cnes = Cnes::new(config.facility.cnes.as_str()).map_err(BpaError::ConfigValidation)?;
    let cnpj = Cnpj::new(&config.facility.cnpj).map_err(BpaError::ConfigValidation)?;
    Ok(CodecSettings {
        cnes,
        identity: HeaderIdentity {
            org_name: config.facility.name.clone(),
            org_acronym: config.facility.acronym.clone(),
            cnpj,
            destination_name: config.destination.name.clone(),
            destination_kind: config.destination.kind,
            version_tag: config.export.version_tag.clone(),
        },
        layout: config.export.layout,
        encoding: config.export.encoding,
    })
}

fn step(trail: &mut StateTrail, next: ExportState) -> Result<()> {
    trail.advance(next).map_err(BpaError::State)
}

fn require_competency(batch: &FetchedBatch) -> Result<Competency> {
    batch.competency().ok_or_else(|| {
        BpaError::ConfigValidation(
            "A competency (YYYYMM) is required for the fixed-width export".to_string(),
        )
    })
}

fn period_label(competency: Option<Competency>) -> String {
    competency.map_or_else(|| "all".to_string(), |c| c.to_string())
}
