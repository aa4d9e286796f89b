//! Parser for engine result listings
//!
//! A listing file holds one or more tab separated tables, separated by blank
//! lines:
//!
//! ```text
//! Bars, Displacements - Load case: Deadload
//! ID	Pos	ex	ey	ez	fix	fiy	fiz	Case
//! [-]	[m]	[m]	[m]	[m]	[rad]	[rad]	[rad]	[-]
//! B.1	0.000	0.000	0.000	-0.001	0.000	0.000	0.000	Deadload
//! ```
//!
//! The title line decides the category; the header and unit rows are
//! optional.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use super::category::{RecordShape, ResultCategory};
use super::records::{
    BarResult, FemBar, FemNode, FemShell, GenericResult, NodeResult, ResultRecord, ShellResult,
};
use crate::error::{FdError, FdResult};

const CASE_TITLE_PATTERN: &str = r"(?:Load case|Load combination): (?P<case>.+?)\s*$";

/// Outcome of one file in a batch
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: FdResult<Vec<ResultRecord>>,
}

/// Per-file outcomes, in the order the files were requested
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub files: Vec<FileOutcome>,
}

impl BatchOutcome {
    /// Records of every file that parsed, file order preserved
    pub fn records(&self) -> impl Iterator<Item = &ResultRecord> {
        self.files
            .iter()
            .filter_map(|file| file.result.as_ref().ok())
            .flatten()
    }

    pub fn errors(&self) -> impl Iterator<Item = &FdError> {
        self.files.iter().filter_map(|file| file.result.as_ref().err())
    }

    pub fn into_parts(self) -> (Vec<ResultRecord>, Vec<FdError>) {
        let mut records = Vec::new();
        let mut errors = Vec::new();
        for file in self.files {
            match file.result {
                Ok(mut parsed) => records.append(&mut parsed),
                Err(err) => errors.push(err),
            }
        }
        (records, errors)
    }
}

pub struct ResultsReader {
    titles: Vec<(ResultCategory, Regex)>,
    case_title: Regex,
}

impl Default for ResultsReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsReader {
    pub fn new() -> Self {
        let titles = ResultCategory::ALL
            .iter()
            .map(|&category| {
                let regex = Regex::new(category.title_pattern()).expect("title patterns are valid");
                (category, regex)
            })
            .collect();
        Self {
            titles,
            case_title: Regex::new(CASE_TITLE_PATTERN).expect("case pattern is valid"),
        }
    }

    /// Category of a table title. The hint is tried first.
    pub fn identify(&self, title: &str, hint: Option<ResultCategory>) -> Option<ResultCategory> {
        if let Some(hint) = hint {
            if self.matches(hint, title) {
                return Some(hint);
            }
        }
        self.titles
            .iter()
            .find(|(_, regex)| regex.is_match(title))
            .map(|(category, _)| *category)
    }

    fn matches(&self, category: ResultCategory, title: &str) -> bool {
        self.titles
            .iter()
            .any(|(c, regex)| *c == category && regex.is_match(title))
    }

    /// Parse one listing file. Any problem is a `ParseFailure` naming the file.
    pub fn parse(
        &self,
        path: impl AsRef<Path>,
        hint: Option<ResultCategory>,
    ) -> FdResult<Vec<ResultRecord>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| FdError::parse_failure(path, format!("cannot read file: {}", e)))?;
        let records = self
            .parse_str(&content, hint)
            .map_err(|cause| FdError::parse_failure(path, cause))?;
        tracing::debug!("Parsed {} records from {:?}", records.len(), path);
        Ok(records)
    }

    /// Parse listing text. The error is the cause only, without a path.
    pub fn parse_str(
        &self,
        content: &str,
        hint: Option<ResultCategory>,
    ) -> Result<Vec<ResultRecord>, String> {
        let mut records = Vec::new();
        let mut file_category: Option<ResultCategory> = None;

        for table in split_tables(content) {
            let (title_line, title) = table[0];
            let category = self.identify(title.trim(), hint).ok_or_else(|| {
                format!("line {}: unrecognized result table '{}'", title_line, title.trim())
            })?;
            match file_category {
                Some(existing) if existing != category => {
                    return Err(format!(
                        "line {}: {} table in a {} listing",
                        title_line, category, existing
                    ));
                }
                _ => file_category = Some(category),
            }

            let title_case = self
                .case_title
                .captures(title)
                .map(|caps| caps["case"].to_string());
            let mut parser = TableParser::new(category, title_case);
            for &(line_no, line) in &table[1..] {
                if let Some(record) = parser.line(line_no, line)? {
                    records.push(record);
                }
            }
        }

        Ok(records)
    }

    /// Parse several files one after another. A failing file is recorded and
    /// the remaining files are still parsed.
    pub fn parse_batch(&self, files: &[(PathBuf, Option<ResultCategory>)]) -> BatchOutcome {
        let files = files
            .iter()
            .map(|(path, hint)| {
                let result = self.parse(path, *hint);
                if let Err(err) = &result {
                    tracing::warn!("{}", err);
                }
                FileOutcome {
                    path: path.clone(),
                    result,
                }
            })
            .collect();
        BatchOutcome { files }
    }

    /// Parse files on the blocking pool in parallel. Outcomes come back in
    /// request order, not completion order.
    pub async fn parse_batch_concurrent(
        self: Arc<Self>,
        files: Vec<(PathBuf, Option<ResultCategory>)>,
    ) -> BatchOutcome {
        let handles: Vec<_> = files
            .into_iter()
            .map(|(path, hint)| {
                let reader = Arc::clone(&self);
                let task_path = path.clone();
                let handle = tokio::task::spawn_blocking(move || reader.parse(&task_path, hint));
                (path, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (path, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(FdError::parse_failure(&path, join_err.to_string())),
            };
            if let Err(err) = &result {
                tracing::warn!("{}", err);
            }
            outcomes.push(FileOutcome { path, result });
        }
        BatchOutcome { files: outcomes }
    }
}

/// Non-empty tables as `(line number, line)` lists, title first
fn split_tables(content: &str) -> Vec<Vec<(usize, &str)>> {
    let mut tables = Vec::new();
    let mut current: Vec<(usize, &str)> = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !current.is_empty() {
                tables.push(std::mem::take(&mut current));
            }
        } else {
            current.push((i + 1, line));
        }
    }
    if !current.is_empty() {
        tables.push(current);
    }
    tables
}

enum RowState {
    /// Next row may be the header
    Start,
    /// Next row may be the unit row
    AfterHeader,
    Data,
}

struct TableParser {
    category: ResultCategory,
    title_case: Option<String>,
    state: RowState,
    generic_columns: Vec<String>,
    previous: Vec<String>,
}

impl TableParser {
    fn new(category: ResultCategory, title_case: Option<String>) -> Self {
        Self {
            category,
            title_case,
            state: RowState::Start,
            generic_columns: Vec::new(),
            previous: Vec::new(),
        }
    }

    fn line(&mut self, line_no: usize, line: &str) -> Result<Option<ResultRecord>, String> {
        let cells: Vec<&str> = line.split('\t').map(str::trim).collect();

        if let RowState::Start = self.state {
            self.state = RowState::AfterHeader;
            if self.category.shape() == RecordShape::Generic {
                self.generic_columns = cells.iter().map(|c| c.to_string()).collect();
                return Ok(None);
            }
            if self.is_header(&cells) {
                let expected = self.category.columns().len();
                if cells.len() != expected {
                    return Err(format!(
                        "line {}: {} header has {} columns, expected {}",
                        line_no,
                        self.category,
                        cells.len(),
                        expected
                    ));
                }
                return Ok(None);
            }
        }

        if let RowState::AfterHeader = self.state {
            self.state = RowState::Data;
            if is_unit_row(&cells) {
                return Ok(None);
            }
        }

        self.record(line_no, cells).map(Some)
    }

    fn is_header(&self, cells: &[&str]) -> bool {
        match (cells.first(), self.category.columns().first()) {
            (Some(cell), Some(column)) => cell.eq_ignore_ascii_case(column),
            _ => false,
        }
    }

    fn record(&mut self, line_no: usize, cells: Vec<&str>) -> Result<ResultRecord, String> {
        let shape = self.category.shape();
        let width = match shape {
            RecordShape::Generic => self.generic_columns.len(),
            _ => self.category.columns().len(),
        };
        if cells.len() > width {
            return Err(format!(
                "line {}: {} columns, expected at most {}",
                line_no,
                cells.len(),
                width
            ));
        }

        let mut row: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        row.resize(width, String::new());
        for i in 0..shape.fill_down_count() {
            if row[i].is_empty() {
                match self.previous.get(i) {
                    Some(above) if !above.is_empty() => row[i] = above.clone(),
                    _ => return Err(format!("line {}: missing identifier", line_no)),
                }
            }
        }
        self.previous = row.clone();

        let cells = Cells {
            line_no,
            category: self.category,
            row: &row,
        };
        let record = match shape {
            RecordShape::FemNode => ResultRecord::FemNode(FemNode {
                id: cells.integer(0)?,
                x: cells.number(1)?,
                y: cells.number(2)?,
                z: cells.number(3)?,
            }),
            RecordShape::FemBar => ResultRecord::FemBar(FemBar {
                id: row[0].clone(),
                element_id: cells.integer(1)?,
                nodes: [cells.integer(2)?, cells.integer(3)?],
            }),
            RecordShape::FemShell => {
                let nodes = (2..width)
                    .filter(|&i| !row[i].is_empty())
                    .map(|i| cells.integer(i))
                    .collect::<Result<Vec<u32>, String>>()?;
                if nodes.len() < 3 {
                    return Err(format!("line {}: shell element with {} nodes", line_no, nodes.len()));
                }
                ResultRecord::FemShell(FemShell {
                    id: row[0].clone(),
                    element_id: cells.integer(1)?,
                    nodes,
                })
            }
            RecordShape::Node => ResultRecord::Node(NodeResult {
                category: self.category,
                id: row[0].clone(),
                node_id: cells.integer(1)?,
                values: cells.values(2)?,
                case_id: self.case_id(&row),
            }),
            RecordShape::Bar => ResultRecord::Bar(BarResult {
                category: self.category,
                id: row[0].clone(),
                pos: cells.number(1)?,
                values: cells.values(2)?,
                case_id: self.case_id(&row),
            }),
            RecordShape::Shell => ResultRecord::Shell(ShellResult {
                category: self.category,
                id: row[0].clone(),
                element_id: cells.integer(1)?,
                node_id: if row[2].is_empty() {
                    None
                } else {
                    Some(cells.integer(2)?)
                },
                values: cells.values(3)?,
                case_id: self.case_id(&row),
            }),
            RecordShape::Generic => ResultRecord::Generic(GenericResult {
                category: self.category,
                columns: self.generic_columns.clone(),
                cells: row.clone(),
            }),
        };
        Ok(record)
    }

    /// Title suffix wins over the `Case` column
    fn case_id(&self, row: &[String]) -> Option<String> {
        if self.title_case.is_some() {
            return self.title_case.clone();
        }
        if !self.category.has_load_cases() {
            return None;
        }
        row.last().filter(|c| !c.is_empty()).cloned()
    }
}

fn is_unit_row(cells: &[&str]) -> bool {
    cells.iter().any(|c| c.starts_with('['))
        && cells.iter().all(|c| c.is_empty() || c.starts_with('['))
}

struct Cells<'a> {
    line_no: usize,
    category: ResultCategory,
    row: &'a [String],
}

impl Cells<'_> {
    fn column(&self, i: usize) -> &str {
        self.category.columns().get(i).copied().unwrap_or("?")
    }

    fn integer(&self, i: usize) -> Result<u32, String> {
        let raw = &self.row[i];
        raw.parse::<u32>().map_err(|_| {
            format!(
                "line {}: invalid integer '{}' in column '{}'",
                self.line_no,
                raw,
                self.column(i)
            )
        })
    }

    fn number(&self, i: usize) -> Result<f64, String> {
        let raw = &self.row[i];
        if raw.is_empty() {
            return Err(format!(
                "line {}: missing value in column '{}'",
                self.line_no,
                self.column(i)
            ));
        }
        parse_number(raw).ok_or_else(|| {
            format!(
                "line {}: invalid number '{}' in column '{}'",
                self.line_no,
                raw,
                self.column(i)
            )
        })
    }

    fn values(&self, start: usize) -> Result<Vec<f64>, String> {
        let count = self.category.value_columns().len();
        (start..start + count).map(|i| self.number(i)).collect()
    }
}

/// Accepts a decimal comma, as written with regional formatting on.
fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().or_else(|| {
        if raw.contains('.') {
            None
        } else {
            raw.replacen(',', ".", 1).parse::<f64>().ok()
        }
    })
}
