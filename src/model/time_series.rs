use serde::Serialize;

use crate::core::GenericResult;
use crate::formats::xlsx::{self, CellData, CellValue, Sheet};
use crate::styling::{self, StyleRecord};

pub const FIRST_PERIOD_COLUMN: u32 = 5;

const CALENDAR_ROW: u32 = 1;
const FISCAL_ROW: u32 = 2;
const FISCAL_DATE_ROW: u32 = 3;

/// Labels of the period columns: calendar period, fiscal period and fiscal date.
#[derive(Debug, Default, PartialEq)]
pub struct PeriodHeaders {
    pub calendar: Vec<Option<CellValue>>,
    pub fiscal: Vec<Option<CellValue>>,
    pub fiscal_date: Vec<Option<CellValue>>,
}

impl PeriodHeaders {
    pub fn read(sheet: &Sheet) -> GenericResult<PeriodHeaders> {
        let mut headers = PeriodHeaders::default();

        for column in FIRST_PERIOD_COLUMN..=sheet.max_column() {
            let header = |row: u32| -> GenericResult<Option<CellValue>> {
                if row > sheet.max_row() {
                    return Ok(None);
                }
                Ok(sheet.value(row, column)?.cloned())
            };

            headers.calendar.push(header(CALENDAR_ROW)?);
            headers.fiscal.push(header(FISCAL_ROW)?);
            headers.fiscal_date.push(header(FISCAL_DATE_ROW)?);
        }

        Ok(headers)
    }

    pub fn len(&self) -> usize {
        self.calendar.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calendar.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePoint {
    pub period: Option<CellValue>,
    pub fiscal: Option<CellValue>,
    pub fiscal_date: Option<CellValue>,
    pub value: Option<CellValue>,
    pub formula: Option<String>,
    pub comment: Option<String>,
    pub link: Option<String>,
    #[serde(rename = "styling")]
    pub style: StyleRecord,
}

/// Expands the period columns of a metric row into time points in header order.
pub fn assemble(sheet: &Sheet, row: u32, headers: &PeriodHeaders) -> GenericResult<Vec<TimePoint>> {
    let mut points = Vec::with_capacity(headers.len());

    for index in 0..headers.len() {
        let cell = sheet.cell(row, FIRST_PERIOD_COLUMN + index as u32)?;
        let CellData {value, formula, comment, link} = xlsx::read(cell);
        let style = styling::extract(&cell.format, false, formula.is_some());

        points.push(TimePoint {
            period: headers.calendar[index].clone(),
            fiscal: headers.fiscal[index].clone(),
            fiscal_date: headers.fiscal_date[index].clone(),
            value, formula, comment, link, style,
        });
    }

    Ok(points)
}
