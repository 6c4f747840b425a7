use calamine::{DataType, Range};
use once_cell::sync::Lazy;
use regex::Regex;
use time::Date;

use crate::{Error, Result, DATE_FORMAT};

/// Pattern of a total/summary label in column 0, e.g.
/// `Totalt 2024-05-10 Café Kallt Kl: 14`. The category capture is
/// non-greedy; trailing text after the hour is permitted.
static TOTAL_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Totalt (\d{4}-\d{2}-\d{2}) (.+?) Kl: (\d{2})").expect("Unable to compile regex")
});

/// Column holding the quantity (antal) for a total row.
const QUANTITY_COLUMN: usize = 4;

/// One hourly total extracted from a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalRow {
    pub date: Date,
    pub category: String,
    /// Two-digit hour of day as captured from the label.
    pub hour: String,
    pub quantity: f64,
}

/// Scans a sheet for total rows.
///
/// Rows whose first cell is not a matching `Totalt ...` label are
/// skipped, as are matching rows with an absent, blank or zero
/// quantity. A matching row with a quantity that cannot be coerced to
/// a number fails the whole run.
pub fn total_rows(sheet: &Range<DataType>) -> impl Iterator<Item = Result<TotalRow>> + '_ {
    sheet.rows().filter_map(|row| parse_row(row).transpose())
}

fn parse_row(row: &[DataType]) -> Result<Option<TotalRow>> {
    let Some(label) = row.first().and_then(DataType::get_string) else {
        return Ok(None);
    };
    if !label.starts_with("Totalt") {
        return Ok(None);
    }
    let Some(captures) = TOTAL_LABEL.captures(label) else {
        return Ok(None);
    };

    let quantity = match quantity(row.get(QUANTITY_COLUMN), label)? {
        Some(quantity) if quantity != 0.0 => quantity,
        _ => return Ok(None),
    };

    let date_str = &captures[1];
    let date = Date::parse(date_str, DATE_FORMAT).map_err(|source| Error::InvalidDate {
        value: date_str.to_owned(),
        label: label.to_owned(),
        source,
    })?;

    Ok(Some(TotalRow {
        date,
        category: captures[2].to_owned(),
        hour: captures[3].to_owned(),
        quantity,
    }))
}

/// Coerces the quantity cell to a number. Absent, empty and
/// blank-string cells yield `None`, distinct from a present `0`.
fn quantity(cell: Option<&DataType>, label: &str) -> Result<Option<f64>> {
    let Some(value) = cell else {
        return Ok(None);
    };

    match value {
        DataType::Empty => Ok(None),
        DataType::Int(quantity) => Ok(Some(*quantity as f64)),
        DataType::Float(quantity) => Ok(Some(*quantity)),
        DataType::String(quantity) => {
            let trimmed = quantity.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse()
                .map(Some)
                .map_err(|source| Error::InvalidQuantity {
                    value: quantity.clone(),
                    label: label.to_owned(),
                    source,
                })
        }
        _ => Err(Error::QuantityDataType {
            value: value.clone(),
            label: label.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn sheet(rows: Vec<Vec<DataType>>) -> Range<DataType> {
        let height = rows.len() as u32;
        let mut range = Range::new((0, 0), (height.saturating_sub(1), 5));
        for (row_index, row) in rows.into_iter().enumerate() {
            for (column_index, value) in row.into_iter().enumerate() {
                range.set_value((row_index as u32, column_index as u32), value);
            }
        }
        range
    }

    fn total_row(label: &str, quantity: DataType) -> Vec<DataType> {
        vec![
            DataType::String(label.to_string()),
            DataType::Empty,
            DataType::Empty,
            DataType::Empty,
            quantity,
        ]
    }

    fn extract(range: &Range<DataType>) -> Result<Vec<TotalRow>> {
        total_rows(range).collect()
    }

    #[test]
    fn test_extract_single_total_row() {
        let range = sheet(vec![total_row(
            "Totalt 2024-05-10 Café Kallt Kl: 14",
            DataType::Float(7.0),
        )]);

        let rows = extract(&range).unwrap();
        assert_eq!(
            rows,
            vec![TotalRow {
                date: date!(2024 - 05 - 10),
                category: "Café Kallt".to_string(),
                hour: "14".to_string(),
                quantity: 7.0,
            }]
        );
    }

    #[test]
    fn test_skips_non_total_rows() {
        let range = sheet(vec![
            vec![DataType::String("Varugrupp".to_string())],
            vec![DataType::Empty],
            vec![DataType::Float(3.0)],
            total_row("Totalt 2024-05-10 Food Kitchen Kl: 12", DataType::Int(3)),
            vec![DataType::String("Kaffe 25cl".to_string())],
        ]);

        let rows = extract(&range).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Food Kitchen");
        assert_eq!(rows[0].quantity, 3.0);
    }

    #[test]
    fn test_skips_malformed_total_labels() {
        let cases = vec![
            "Totalt",
            "Totalt 2024-05-10",
            "Totalt 2024-05-10 Café Kallt",
            "Totalt 2024-05-10 Café Kallt Kl: 9",
            "Totalt maj Café Kallt Kl: 14",
        ];

        for label in cases {
            let range = sheet(vec![total_row(label, DataType::Float(7.0))]);
            assert!(extract(&range).unwrap().is_empty(), "{label:?}");
        }
    }

    #[test]
    fn test_allows_trailing_text_after_hour() {
        let range = sheet(vec![total_row(
            "Totalt 2024-05-10 Café Kallt Kl: 14:00",
            DataType::Float(7.0),
        )]);

        let rows = extract(&range).unwrap();
        assert_eq!(rows[0].hour, "14");
        assert_eq!(rows[0].category, "Café Kallt");
    }

    #[test]
    fn test_skips_blank_and_zero_quantities() {
        let cases = vec![
            DataType::Empty,
            DataType::Float(0.0),
            DataType::Int(0),
            DataType::String("".to_string()),
            DataType::String("  ".to_string()),
        ];

        for quantity in cases {
            let range = sheet(vec![total_row(
                "Totalt 2024-05-10 Café Kallt Kl: 14",
                quantity.clone(),
            )]);
            assert!(extract(&range).unwrap().is_empty(), "{quantity:?}");
        }
    }

    #[test]
    fn test_missing_quantity_column() {
        let range = sheet(vec![vec![DataType::String(
            "Totalt 2024-05-10 Café Kallt Kl: 14".to_string(),
        )]]);

        assert!(extract(&range).unwrap().is_empty());
    }

    #[test]
    fn test_coerces_string_quantity() {
        let range = sheet(vec![total_row(
            "Totalt 2024-05-10 Café Kallt Kl: 14",
            DataType::String("7.5".to_string()),
        )]);

        let rows = extract(&range).unwrap();
        assert_eq!(rows[0].quantity, 7.5);
    }

    #[test]
    fn test_non_numeric_quantity_is_fatal() {
        let range = sheet(vec![total_row(
            "Totalt 2024-05-10 Café Kallt Kl: 14",
            DataType::String("sju".to_string()),
        )]);

        let error = extract(&range).unwrap_err();
        assert!(matches!(error, Error::InvalidQuantity { .. }), "{error}");
    }

    #[test]
    fn test_bool_quantity_is_fatal() {
        let range = sheet(vec![total_row(
            "Totalt 2024-05-10 Café Kallt Kl: 14",
            DataType::Bool(true),
        )]);

        let error = extract(&range).unwrap_err();
        assert!(matches!(error, Error::QuantityDataType { .. }), "{error}");
    }

    #[test]
    fn test_invalid_date_is_fatal() {
        let range = sheet(vec![total_row(
            "Totalt 2024-13-10 Café Kallt Kl: 14",
            DataType::Float(7.0),
        )]);

        let error = extract(&range).unwrap_err();
        assert!(matches!(error, Error::InvalidDate { .. }), "{error}");
    }
}
