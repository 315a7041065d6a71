// 📂 Record Source - positional CSV → typed records
//
// All three files are parsed to completion before the store is touched,
// so a corrupt row aborts the run with zero writes.

use crate::entities::{Department, DepartmentAssignment, Employee, SyncEntity};
use crate::error::{Result, SyncError};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const DEFAULT_EMPLOYEES_FILE: &str = "employees_continued.csv";
pub const DEFAULT_DEPARTMENTS_FILE: &str = "departments_continued.csv";
pub const DEFAULT_ASSIGNMENTS_FILE: &str = "employees_departments_related_dates.csv";

// ============================================================================
// ROW ACCESS
// ============================================================================

/// One positional CSV row plus the provenance needed for error reports.
pub struct RowFields<'r> {
    record: &'r StringRecord,
    source_name: &'r str,
    line: u64,
}

impl<'r> RowFields<'r> {
    pub fn new(record: &'r StringRecord, source_name: &'r str, line: u64) -> Self {
        RowFields {
            record,
            source_name,
            line,
        }
    }

    fn raw(&self, index: usize, field: &'static str) -> Result<&'r str> {
        self.record
            .get(index)
            .ok_or_else(|| self.malformed(field, "is missing".to_string()))
    }

    pub fn text(&self, index: usize, field: &'static str) -> Result<String> {
        Ok(self.raw(index, field)?.to_string())
    }

    pub fn integer(&self, index: usize, field: &'static str) -> Result<i64> {
        let value = self.raw(index, field)?;
        value
            .trim()
            .parse::<i64>()
            .map_err(|e| self.malformed(field, format!("`{}` is not an integer ({})", value, e)))
    }

    pub fn date(&self, index: usize, field: &'static str) -> Result<NaiveDate> {
        let value = self.raw(index, field)?;
        NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
            self.malformed(field, format!("`{}` is not a YYYY-MM-DD date ({})", value, e))
        })
    }

    fn malformed(&self, field: &'static str, reason: String) -> SyncError {
        SyncError::MalformedRecord {
            source_name: self.source_name.to_string(),
            line: self.line,
            field,
            reason,
        }
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse every row of a headed, comma separated stream into `E`.
///
/// The first row is a header and is skipped. Fields are positional, order
/// is preserved.
pub fn read_records<E: SyncEntity, R: Read>(reader: R, source_name: &str) -> Result<Vec<E>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| csv_error(source_name, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() != E::FIELD_COUNT {
            return Err(SyncError::MalformedRecord {
                source_name: source_name.to_string(),
                line,
                field: "row",
                reason: format!("expected {} fields, found {}", E::FIELD_COUNT, record.len()),
            });
        }

        records.push(E::from_row(&RowFields::new(&record, source_name, line))?);
    }

    debug!(
        source = source_name,
        kind = E::KIND.name(),
        count = records.len(),
        "parsed records"
    );

    Ok(records)
}

fn csv_error(source_name: &str, e: csv::Error) -> SyncError {
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    match e.into_kind() {
        csv::ErrorKind::Io(source) => SyncError::ReadInput {
            path: PathBuf::from(source_name),
            source,
        },
        other => SyncError::MalformedRecord {
            source_name: source_name.to_string(),
            line,
            field: "row",
            reason: format!("{:?}", other),
        },
    }
}

// ============================================================================
// DATASET
// ============================================================================

/// Locations of the three input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub employees: PathBuf,
    pub departments: PathBuf,
    pub assignments: PathBuf,
}

impl DatasetPaths {
    /// The conventional file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        DatasetPaths {
            employees: dir.join(DEFAULT_EMPLOYEES_FILE),
            departments: dir.join(DEFAULT_DEPARTMENTS_FILE),
            assignments: dir.join(DEFAULT_ASSIGNMENTS_FILE),
        }
    }
}

/// Fully parsed input for one reconciliation run.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub employees: Vec<Employee>,
    pub departments: Vec<Department>,
    pub assignments: Vec<DepartmentAssignment>,
    /// SHA-256 over the raw input bytes, when loaded from disk.
    pub digest: Option<String>,
}

impl Dataset {
    pub fn new(
        employees: Vec<Employee>,
        departments: Vec<Department>,
        assignments: Vec<DepartmentAssignment>,
    ) -> Self {
        Dataset {
            employees,
            departments,
            assignments,
            digest: None,
        }
    }

    /// Read and parse all three files.
    pub fn load(paths: &DatasetPaths) -> Result<Self> {
        let mut hasher = Sha256::new();

        let employees = load_file::<Employee>(&paths.employees, &mut hasher)?;
        let departments = load_file::<Department>(&paths.departments, &mut hasher)?;
        let assignments = load_file::<DepartmentAssignment>(&paths.assignments, &mut hasher)?;

        let dataset = Dataset {
            employees,
            departments,
            assignments,
            digest: Some(format!("{:x}", hasher.finalize())),
        };

        info!(
            employees = dataset.employees.len(),
            departments = dataset.departments.len(),
            assignments = dataset.assignments.len(),
            "loaded dataset"
        );

        Ok(dataset)
    }

    pub fn total_records(&self) -> usize {
        self.employees.len() + self.departments.len() + self.assignments.len()
    }
}

fn load_file<E: SyncEntity>(path: &Path, hasher: &mut Sha256) -> Result<Vec<E>> {
    let bytes = fs::read(path).map_err(|source| SyncError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    hasher.update(&bytes);

    let source_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown.csv");

    read_records(bytes.as_slice(), source_name)
}
