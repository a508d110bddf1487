// 📤 Row Sink - where extracted rows end up
//
// A workbook is a set of named tabs plus a Status tab that records one line per
// module run. `CsvWorkbook` keeps one directory per spreadsheet id with one CSV
// file per tab; `MemoryWorkbook` keeps everything in memory for tests.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const STATUS_TAB: &str = "Status";
pub const STATUS_HEADER: [&str; 2] = ["Module", "Status"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleStatus {
    Success,
    Failure,
}

impl ModuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleStatus::Success => "success",
            ModuleStatus::Failure => "failure",
        }
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RowSink - tab-oriented output of an extraction run
pub trait RowSink {
    /// Create the tab if it does not exist yet
    fn ensure_tab(&mut self, name: &str) -> Result<()>;

    /// Remove every row of the tab, header included
    fn clear_tab(&mut self, name: &str) -> Result<()>;

    /// Write header + rows; the header is marked bold where the backend can
    fn write_rows(&mut self, name: &str, header: &[&str], rows: &[Vec<String>]) -> Result<()>;

    fn append_status(&mut self, module: &str, status: ModuleStatus) -> Result<()>;
}

// ============================================================================
// CSV WORKBOOK
// ============================================================================

pub struct CsvWorkbook {
    dir: PathBuf,
}

/// Directory segment for a spreadsheet id; never resolves outside the output dir
pub fn workbook_dir_name(spreadsheet_id: &str) -> Result<String> {
    if spreadsheet_id.trim().is_empty() {
        anyhow::bail!("Spreadsheet id must not be empty");
    }

    // `encode` escapes separators but leaves dots alone
    let name = urlencoding::encode(spreadsheet_id).into_owned();
    if name == "." || name == ".." {
        anyhow::bail!("Spreadsheet id '{}' is not a valid workbook name", spreadsheet_id);
    }

    Ok(name)
}

impl CsvWorkbook {
    /// Open (creating if needed) the workbook for one spreadsheet id
    pub fn open(output_dir: impl AsRef<Path>, spreadsheet_id: &str) -> Result<Self> {
        let dir = output_dir.as_ref().join(workbook_dir_name(spreadsheet_id)?);

        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create workbook directory {}", dir.display()))?;

        Ok(CsvWorkbook { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn tab_path(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.csv", urlencoding::encode(name)))
    }

    /// Every record of a tab, header first
    pub fn read_tab(&self, name: &str) -> Result<Vec<Vec<String>>> {
        let path = self.tab_path(name);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("Failed to open tab {}", path.display()))?;

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record.with_context(|| format!("Failed to read tab {}", name))?;
            records.push(record.iter().map(str::to_string).collect());
        }

        Ok(records)
    }
}

impl RowSink for CsvWorkbook {
    fn ensure_tab(&mut self, name: &str) -> Result<()> {
        let path = self.tab_path(name);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to create tab {}", path.display()))?;
        Ok(())
    }

    fn clear_tab(&mut self, name: &str) -> Result<()> {
        let path = self.tab_path(name);
        fs::File::create(&path).with_context(|| format!("Failed to clear tab {}", path.display()))?;
        Ok(())
    }

    fn write_rows(&mut self, name: &str, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
        let path = self.tab_path(name);
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("Failed to open tab {}", path.display()))?;

        writer.write_record(header)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        debug!(tab = name, rows = rows.len(), "Wrote tab");
        Ok(())
    }

    fn append_status(&mut self, module: &str, status: ModuleStatus) -> Result<()> {
        let path = self.tab_path(STATUS_TAB);
        let is_new = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open status tab {}", path.display()))?;

        let mut writer = csv::Writer::from_writer(file);
        if is_new {
            writer.write_record(STATUS_HEADER)?;
        }
        writer.write_record([module, status.as_str()])?;
        writer.flush()?;

        Ok(())
    }
}

// ============================================================================
// MEMORY WORKBOOK
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTab {
    pub header: Vec<String>,
    pub header_bold: bool,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Default)]
pub struct MemoryWorkbook {
    tabs: HashMap<String, MemoryTab>,
    statuses: Vec<(String, ModuleStatus)>,
    failing_tab: Option<String>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: make every write to `tab` fail
    pub fn with_failing_tab(mut self, tab: &str) -> Self {
        self.failing_tab = Some(tab.to_string());
        self
    }

    pub fn tab(&self, name: &str) -> Option<&MemoryTab> {
        self.tabs.get(name)
    }

    pub fn tab_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tabs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn statuses(&self) -> &[(String, ModuleStatus)] {
        &self.statuses
    }
}

impl RowSink for MemoryWorkbook {
    fn ensure_tab(&mut self, name: &str) -> Result<()> {
        self.tabs.entry(name.to_string()).or_default();
        Ok(())
    }

    fn clear_tab(&mut self, name: &str) -> Result<()> {
        if let Some(tab) = self.tabs.get_mut(name) {
            *tab = MemoryTab::default();
        }
        Ok(())
    }

    fn write_rows(&mut self, name: &str, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
        if self.failing_tab.as_deref() == Some(name) {
            anyhow::bail!("tab {} is read-only", name);
        }

        let tab = self.tabs.entry(name.to_string()).or_default();
        tab.header = header.iter().map(|h| h.to_string()).collect();
        tab.header_bold = true;
        tab.rows = rows.to_vec();
        Ok(())
    }

    fn append_status(&mut self, module: &str, status: ModuleStatus) -> Result<()> {
        self.statuses.push((module.to_string(), status));
        Ok(())
    }
}
