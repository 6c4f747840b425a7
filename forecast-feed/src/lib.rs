//! Converts a varustatistik spreadsheet export of Swedish restaurant
//! hourly sales totals into the tab-separated external forecast feed
//! consumed by the downstream forecasting system.

use std::{io::Cursor, num::ParseFloatError, path::Path};

pub mod classify;
pub mod extract;
pub mod format;
pub mod timezone;

use calamine::{open_workbook_auto_from_rs, DataType, Range, Reader, Sheets};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use time::{format_description::FormatItem, macros::format_description, Date};

pub use classify::{classify, VariableId};
pub use extract::{total_rows, TotalRow};
pub use format::{render, HEADER};
pub use timezone::{utc_offset, UtcOffset};

pub(crate) const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Calamine(#[from] calamine::Error),
    #[error("The sheet {0} does not exist")]
    SheetMissing(String),
    #[error("Unable to parse date {value:?} in total row {label:?}")]
    InvalidDate {
        value: String,
        label: String,
        source: time::error::Parse,
    },
    #[error("Unable to parse quantity {value:?} in total row {label:?}")]
    InvalidQuantity {
        value: String,
        label: String,
        source: ParseFloatError,
    },
    #[error("Incorrect data type {value:?} for quantity in total row {label:?}")]
    QuantityDataType { value: DataType, label: String },
    #[error("Unable to format date")]
    FormatDate(#[from] time::error::Format),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Sheets holding monthly data are named `YYYY-MM`.
static MONTH_SHEET_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").expect("Unable to compile regex"));

/// Default/template tab present in every export, never holds data.
const TEMPLATE_SHEET_NAME: &str = "Blad1";

/// Whether a sheet holds monthly data and should be processed.
pub fn is_month_sheet(name: &str) -> bool {
    name != TEMPLATE_SHEET_NAME && MONTH_SHEET_NAME.is_match(name)
}

/// Identity of one output record. Extracted rows sharing a key have
/// their quantities summed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AggregationKey {
    date: Date,
    time: String,
    timezone: UtcOffset,
    variable_id: VariableId,
}

/// One line of the external forecast feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub date: Date,
    pub time: String,
    pub timezone: UtcOffset,
    pub variable_id: VariableId,
    pub value: f64,
}

/// Classifies and sums the extracted rows into one record per
/// (date, time, variable), sorted lexicographically by that triple.
///
/// Rows with an unrecognized category are discarded.
pub fn aggregate(rows: Vec<TotalRow>) -> Vec<OutputRecord> {
    let mut totals: IndexMap<AggregationKey, f64> = IndexMap::new();

    for row in rows {
        let Some(variable_id) = classify(&row.category) else {
            continue;
        };
        let key = AggregationKey {
            date: row.date,
            time: format!("{0}:00:00", row.hour),
            timezone: utc_offset(row.date),
            variable_id,
        };
        *totals.entry(key).or_insert(0.0) += row.quantity;
    }

    let mut records: Vec<OutputRecord> = totals
        .into_iter()
        .map(|(key, value)| OutputRecord {
            date: key.date,
            time: key.time,
            timezone: key.timezone,
            variable_id: key.variable_id,
            value,
        })
        .collect();

    records.sort_by(|a, b| {
        (a.date, a.time.as_str(), a.variable_id).cmp(&(b.date, b.time.as_str(), b.variable_id))
    });

    records
}

/// Runs the filter → extract → aggregate steps over named sheet
/// grids. Only monthly data sheets are processed; the contents of
/// excluded sheets are never read.
pub fn records_from_sheets<I>(sheets: I) -> Result<Vec<OutputRecord>>
where
    I: IntoIterator<Item = (String, Range<DataType>)>,
{
    let mut rows = Vec::new();
    for (sheet_name, sheet) in sheets {
        if !is_month_sheet(&sheet_name) {
            continue;
        }
        tracing::debug!("Processing sheet: {sheet_name}");
        for row in total_rows(&sheet) {
            rows.push(row?);
        }
    }
    tracing::debug!("Extracted {} total rows", rows.len());

    Ok(aggregate(rows))
}

/// Opens a workbook held in memory and produces the aggregated,
/// sorted records.
pub fn extract_records(spreadsheet_bytes: &[u8]) -> Result<Vec<OutputRecord>> {
    let cursor = Cursor::new(spreadsheet_bytes);
    let mut workbook: Sheets<_> = open_workbook_auto_from_rs(cursor)?;

    let sheet_names = workbook.sheet_names().to_owned();
    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in sheet_names {
        let sheet = workbook
            .worksheet_range(&sheet_name)
            .ok_or_else(|| Error::SheetMissing(sheet_name.clone()))??;
        sheets.push((sheet_name, sheet));
    }

    records_from_sheets(sheets)
}

/// Runs the full pipeline over a workbook held in memory and returns
/// the formatted feed.
///
/// With no qualifying sheets or no total rows the result is just the
/// header line. Any workbook access, quantity coercion or date error
/// aborts the whole run; there is no partial output.
pub fn generate_feed(spreadsheet_bytes: &[u8]) -> Result<String> {
    render(&extract_records(spreadsheet_bytes)?)
}

/// Programmatic entry point: reads the spreadsheet at `input`, returns
/// the formatted feed and, if `output` is given, also writes it there.
///
/// The output file is only written after the whole pipeline has
/// succeeded.
pub fn format_external_forecast(
    input: impl AsRef<Path>,
    output: Option<&Path>,
) -> Result<String> {
    let spreadsheet_bytes = std::fs::read(input)?;
    let feed = generate_feed(&spreadsheet_bytes)?;

    if let Some(path) = output {
        std::fs::write(path, &feed)?;
    }

    Ok(feed)
}
