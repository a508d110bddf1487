// 🚀 Extraction run - every module, in order, into one workbook
//
// A failing module is logged and marked "failure" in the Status tab; the run
// always continues with the next module.

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::extract::ExtractionModule;
use crate::sink::{ModuleStatus, RowSink};
use crate::source::CourseSource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::thread;
use std::time::Duration;
use tracing::{error, info, info_span};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionRequest {
    pub university_id: String,
    pub spreadsheet_id: String,
}

impl ExtractionRequest {
    pub fn new(university_id: impl Into<String>, spreadsheet_id: impl Into<String>) -> Self {
        ExtractionRequest {
            university_id: university_id.into(),
            spreadsheet_id: spreadsheet_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleOutcome {
    pub module: &'static str,
    pub tab: String,
    pub status: ModuleStatus,
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub university_id: String,
    pub spreadsheet_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<ModuleOutcome>,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.status == ModuleStatus::Success)
    }

    pub fn failed_modules(&self) -> Vec<&'static str> {
        self.outcomes
            .iter()
            .filter(|o| o.status == ModuleStatus::Failure)
            .map(|o| o.module)
            .collect()
    }

    pub fn total_rows(&self) -> usize {
        self.outcomes.iter().map(|o| o.rows).sum()
    }

    /// One-line summary for logs and HTTP responses
    pub fn summary(&self) -> String {
        let failed = self.failed_modules();
        if failed.is_empty() {
            format!(
                "Extraction for {} finished: {} modules, {} rows",
                self.university_id,
                self.outcomes.len(),
                self.total_rows()
            )
        } else {
            format!(
                "Extraction for {} finished with failures in: {}",
                self.university_id,
                failed.join(", ")
            )
        }
    }
}

/// Run every extraction module for one university into one workbook
pub fn run_extraction(
    source: &dyn CourseSource,
    sink: &mut dyn RowSink,
    request: &ExtractionRequest,
    config: &ExtractConfig,
) -> RunReport {
    let run_id = Uuid::new_v4();
    let span = info_span!(
        "extraction",
        %run_id,
        university_id = %request.university_id,
        spreadsheet_id = %request.spreadsheet_id
    );
    let _enter = span.enter();

    let started_at = Utc::now();
    info!("Extraction run started");

    let mut outcomes = Vec::with_capacity(ExtractionModule::ALL.len());

    for (i, module) in ExtractionModule::ALL.into_iter().enumerate() {
        let outcome = run_module(source, sink, module, request, config);

        if let Err(e) = sink.append_status(module.name(), outcome.status) {
            error!(module = module.name(), error = %e, "Failed to record module status");
        }
        outcomes.push(outcome);

        if config.write_delay_ms > 0 && i + 1 < ExtractionModule::ALL.len() {
            thread::sleep(Duration::from_millis(config.write_delay_ms));
        }
    }

    let report = RunReport {
        run_id,
        university_id: request.university_id.clone(),
        spreadsheet_id: request.spreadsheet_id.clone(),
        started_at,
        finished_at: Utc::now(),
        outcomes,
    };

    info!(
        rows = report.total_rows(),
        failed = report.failed_modules().len(),
        "Extraction run finished"
    );
    report
}

fn run_module(
    source: &dyn CourseSource,
    sink: &mut dyn RowSink,
    module: ExtractionModule,
    request: &ExtractionRequest,
    config: &ExtractConfig,
) -> ModuleOutcome {
    let tab = module.tab(&config.tabs);
    info!(module = module.name(), tab, "Module started");

    match write_module(source, sink, module, &request.university_id, tab) {
        Ok(rows) => {
            info!(module = module.name(), rows, "Module finished");
            ModuleOutcome {
                module: module.name(),
                tab: tab.to_string(),
                status: ModuleStatus::Success,
                rows,
                error: None,
            }
        }
        Err(e) => {
            error!(module = module.name(), kind = e.kind(), error = %e, "Module failed");
            ModuleOutcome {
                module: module.name(),
                tab: tab.to_string(),
                status: ModuleStatus::Failure,
                rows: 0,
                error: Some(e.to_string()),
            }
        }
    }
}

fn write_module(
    source: &dyn CourseSource,
    sink: &mut dyn RowSink,
    module: ExtractionModule,
    university_id: &str,
    tab: &str,
) -> Result<usize, ExtractError> {
    source.check_connection()?;

    let rows = module.build_rows(source, university_id)?;

    sink.ensure_tab(tab)
        .map_err(|e| ExtractError::sink_write(tab, e))?;
    sink.clear_tab(tab)
        .map_err(|e| ExtractError::sink_write(tab, e))?;
    sink.write_rows(tab, module.header(), &rows)
        .map_err(|e| ExtractError::sink_write(tab, e))?;

    Ok(rows.len())
}
