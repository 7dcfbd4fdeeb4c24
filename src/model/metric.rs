use serde::Serialize;

use crate::core::GenericResult;
use crate::formats::xlsx::{self, CellValue, Sheet};
use crate::styling::{self, StyleRecord};

use super::hierarchy::{HierarchyContext, HierarchyNode, serialize_level};
use super::time_series::{self, PeriodHeaders, TimePoint};

const NAME_COLUMN: u32 = 1;
const UNIT_COLUMN: u32 = 2;
const SOURCE_COLUMN: u32 = 3;
const TAG_ID_COLUMN: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameField {
    pub name: Option<CellValue>,
    #[serde(rename = "order")]
    pub anchor_row: u32,
    pub link: Option<String>,
    #[serde(rename = "styling")]
    pub style: StyleRecord,
    #[serde(rename = "empty_row_after")]
    pub has_trailing_blank_row: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceField {
    pub value: Option<CellValue>,
    #[serde(rename = "order")]
    pub anchor_row: u32,
    pub link: Option<String>,
    #[serde(rename = "styling")]
    pub style: StyleRecord,
    #[serde(rename = "empty_row_after")]
    pub has_trailing_blank_row: bool,
}

/// A single line item of the model with the hierarchy it belongs to and its per-period values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    #[serde(serialize_with = "serialize_level")]
    pub section: Option<HierarchyNode>,
    #[serde(serialize_with = "serialize_level")]
    pub category: Option<HierarchyNode>,
    #[serde(serialize_with = "serialize_level")]
    pub subcategory: Option<HierarchyNode>,
    #[serde(serialize_with = "serialize_level")]
    pub subsubcategory: Option<HierarchyNode>,

    pub name: NameField,
    pub values: Vec<TimePoint>,
    pub unit: Option<CellValue>,
    pub source: SourceField,
    pub tag_id: Option<CellValue>,
}

impl MetricRecord {
    pub fn read(sheet: &Sheet, row: u32, context: &HierarchyContext, headers: &PeriodHeaders) -> GenericResult<MetricRecord> {
        let has_trailing_blank_row = sheet.is_next_row_empty(row);

        let cell = sheet.layout_cell(row, NAME_COLUMN)?;
        let data = xlsx::read(cell);
        let name = NameField {
            name: data.value,
            anchor_row: row,
            link: data.link,
            style: styling::extract(&cell.format, false, false),
            has_trailing_blank_row,
        };

        let cell = sheet.layout_cell(row, SOURCE_COLUMN)?;
        let data = xlsx::read(cell);
        let source = SourceField {
            value: data.value,
            anchor_row: row,
            link: data.link,
            style: styling::extract(&cell.format, true, false),
            has_trailing_blank_row,
        };

        let HierarchyContext {section, category, subcategory, subsubcategory} = context.clone();

        Ok(MetricRecord {
            section, category, subcategory, subsubcategory,
            name,
            values: time_series::assemble(sheet, row, headers)?,
            unit: sheet.layout_cell(row, UNIT_COLUMN)?.value.clone(),
            source,
            tag_id: sheet.layout_cell(row, TAG_ID_COLUMN)?.value.clone(),
        })
    }
}
