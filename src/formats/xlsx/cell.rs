use std::fmt;

use calamine::Data;
use serde::Serialize;

use crate::types::DateTime;

use super::styles::CellFormat;

/// Typed raw value of a cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(DateTime),
}

impl CellValue {
    pub fn from_data(data: &Data) -> Result<Option<CellValue>, String> {
        Ok(Some(match data {
            Data::Empty => return Ok(None),
            Data::String(value) => CellValue::String(value.clone()),
            Data::Int(value) => CellValue::Int(*value),
            Data::Float(value) => CellValue::from_float(*value),
            Data::Bool(value) => CellValue::Bool(*value),
            Data::DateTime(value) => CellValue::DateTime(value.as_datetime().ok_or_else(|| format!(
                "{value:?} is not a valid date/time"))?),
            Data::DateTimeIso(value) => parse_iso_date_time(value)
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::String(value.clone())),
            Data::DurationIso(value) => CellValue::String(value.clone()),
            Data::Error(error) => CellValue::String(error.to_string()),
        }))
    }

    // Numbers without fractional part are stored as floats in the workbook, but they are integers
    // for the user.
    pub fn from_float(value: f64) -> CellValue {
        if value.fract() == 0.0 && value.abs() < 1e15 {
            CellValue::Int(value as i64)
        } else {
            CellValue::Float(value)
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(value) => write!(f, "{value}"),
            CellValue::Int(value) => write!(f, "{value}"),
            CellValue::Float(value) => write!(f, "{value}"),
            CellValue::Bool(value) => write!(f, "{value}"),
            CellValue::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> CellValue {
        CellValue::String(value.to_owned())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> CellValue {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> CellValue {
        CellValue::from_float(value)
    }
}

fn parse_iso_date_time(value: &str) -> Option<DateTime> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok().or_else(|| {
        chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}

/// Treats missing values, empty and whitespace-only strings as blank.
pub fn is_blank(value: Option<&CellValue>) -> bool {
    match value {
        None => true,
        Some(CellValue::String(value)) => value.trim().is_empty(),
        Some(_) => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: Option<CellValue>,
    pub formula: Option<String>,
    pub comment: Option<String>,
    pub link: Option<String>,
    pub format: CellFormat,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Cell {
        Cell {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn has_content(&self) -> bool {
        self.value.is_some() || self.formula.is_some() || self.comment.is_some() || self.link.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CellData {
    pub value: Option<CellValue>,
    pub formula: Option<String>,
    pub comment: Option<String>,
    pub link: Option<String>,
}

/// Projects a cell to its value, formula (only for formula cells), comment and hyperlink target.
pub fn read(cell: &Cell) -> CellData {
    CellData {
        value: cell.value.clone(),
        formula: cell.formula.clone(),
        comment: cell.comment.clone(),
        link: cell.link.clone(),
    }
}

#[cfg(test)]
mod tests {
    use calamine::CellErrorType;
    use rstest::rstest;

    use super::*;

    #[rstest(data, expected,
        case(Data::Empty, None),
        case(Data::String(s!("Revenue")), Some(CellValue::String(s!("Revenue")))),
        case(Data::Int(42), Some(CellValue::Int(42))),
        case(Data::Float(1500.0), Some(CellValue::Int(1500))),
        case(Data::Float(0.25), Some(CellValue::Float(0.25))),
        case(Data::Bool(true), Some(CellValue::Bool(true))),
        case(Data::Error(CellErrorType::Div0), Some(CellValue::String(s!("#DIV/0!")))),
        case(Data::DateTimeIso(s!("2024-03-31")), Some(CellValue::DateTime(
            chrono::NaiveDate::from_ymd_opt(2024, 3, 31).unwrap().and_hms_opt(0, 0, 0).unwrap()))),
        case(Data::DurationIso(s!("PT1H")), Some(CellValue::String(s!("PT1H")))),
    )]
    fn value_conversion(data: Data, expected: Option<CellValue>) {
        assert_eq!(CellValue::from_data(&data).unwrap(), expected);
    }

    #[test]
    fn value_serialization() {
        let date = chrono::NaiveDate::from_ymd_opt(2023, 12, 31).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let values = vec![
            Some(CellValue::from("Q4 2023")), Some(CellValue::from(10.0)), Some(CellValue::from(0.5)),
            Some(CellValue::DateTime(date)), None,
        ];

        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"["Q4 2023",10,0.5,"2023-12-31T00:00:00",null]"#,
        );
    }

    #[rstest(value, blank,
        case(None, true),
        case(Some(CellValue::from("")), true),
        case(Some(CellValue::from(" \t")), true),
        case(Some(CellValue::from("x")), false),
        case(Some(CellValue::Int(0)), false),
    )]
    fn blank_values(value: Option<CellValue>, blank: bool) {
        assert_eq!(is_blank(value.as_ref()), blank);
    }

    #[test]
    fn reading() {
        let cell = Cell {
            value: Some(CellValue::Int(30)),
            formula: Some(s!("=E4+E5")),
            comment: Some(s!("Calculated")),
            link: None,
            format: CellFormat {bold: true, ..Default::default()},
        };

        assert_eq!(read(&cell), CellData {
            value: Some(CellValue::Int(30)),
            formula: Some(s!("=E4+E5")),
            comment: Some(s!("Calculated")),
            link: None,
        });
        assert_eq!(read(&Cell::default()), CellData::default());
    }
}
