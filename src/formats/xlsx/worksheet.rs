use std::collections::HashMap;

use serde::Deserialize;

use crate::core::{GenericResult, ScanError};

use super::package::Relationship;
use super::util::{parse_cell_ref, parse_range_ref};

/// Per-cell metadata of a worksheet which calamine doesn't provide.
#[derive(Debug, Default)]
pub struct Annotations {
    pub style_ids: HashMap<(u32, u32), usize>,
    pub links: HashMap<(u32, u32), String>,
    pub comments: HashMap<(u32, u32), String>,
}

pub fn parse_worksheet(data: &str, relationships: &[Relationship], annotations: &mut Annotations) -> GenericResult<()> {
    let worksheet: WorksheetXml = quick_xml::de::from_str(data).map_err(|e| format!(
        "Failed to parse the worksheet: {e}"))?;

    let (mut max_row, mut max_column) = (0, 0);

    for (row_index, row) in worksheet.sheet_data.rows.iter().enumerate() {
        let row_id = row.id.unwrap_or(row_index as u32 + 1);
        let mut next_column = 1;
        max_row = max_row.max(row_id);

        for cell in &row.cells {
            let (row_id, column) = match cell.reference.as_deref() {
                Some(reference) => parse_cell_ref(reference)?,
                None => (row_id, next_column),
            };
            next_column = column + 1;
            max_row = max_row.max(row_id);
            max_column = max_column.max(column);

            if let Some(style_id) = cell.style_id {
                annotations.style_ids.insert((row_id, column), style_id);
            }
        }
    }

    for hyperlink in worksheet.hyperlinks.map(|hyperlinks| hyperlinks.hyperlinks).unwrap_or_default() {
        let ((first_row, first_column), (last_row, last_column)) = parse_range_ref(&hyperlink.reference)?;

        let target = match (hyperlink.relationship_id, hyperlink.location) {
            (Some(id), _) => {
                let relationship = relationships.iter().find(|relationship| relationship.id == id).ok_or_else(|| {
                    ScanError::malformed_cell(
                        first_row, first_column, &hyperlink.reference,
                        format!("hyperlink references an unknown {id:?} relationship"))
                })?;
                relationship.target.clone()
            },
            (None, Some(location)) => format!("#{location}"),
            (None, None) => continue,
        };

        // Ranges may span the whole sheet, so only cells within the sheet data get the link
        let last_row = last_row.min(max_row.max(first_row));
        let last_column = last_column.min(max_column.max(first_column));

        for row in first_row..=last_row {
            for column in first_column..=last_column {
                annotations.links.insert((row, column), target.clone());
            }
        }
    }

    Ok(())
}

pub fn parse_comments(data: &str, annotations: &mut Annotations) -> GenericResult<()> {
    let comments: CommentsXml = quick_xml::de::from_str(data).map_err(|e| format!(
        "Failed to parse worksheet comments: {e}"))?;

    for comment in comments.comment_list.map(|list| list.comments).unwrap_or_default() {
        let position = parse_cell_ref(&comment.reference)?;
        annotations.comments.insert(position, comment.text.plain_text());
    }

    Ok(())
}

#[derive(Deserialize)]
struct WorksheetXml {
    #[serde(rename = "sheetData", default)]
    sheet_data: SheetDataXml,
    hyperlinks: Option<HyperlinksXml>,
}

#[derive(Deserialize, Default)]
struct SheetDataXml {
    #[serde(rename = "row", default)]
    rows: Vec<RowXml>,
}

#[derive(Deserialize)]
struct RowXml {
    #[serde(rename = "@r")]
    id: Option<u32>,
    #[serde(rename = "c", default)]
    cells: Vec<CellXml>,
}

#[derive(Deserialize)]
struct CellXml {
    #[serde(rename = "@r")]
    reference: Option<String>,
    #[serde(rename = "@s")]
    style_id: Option<usize>,
}

#[derive(Deserialize)]
struct HyperlinksXml {
    #[serde(rename = "hyperlink", default)]
    hyperlinks: Vec<HyperlinkXml>,
}

#[derive(Deserialize)]
struct HyperlinkXml {
    #[serde(rename = "@ref")]
    reference: String,
    // quick-xml matches prefixed attributes by their local name
    #[serde(rename = "@id")]
    relationship_id: Option<String>,
    #[serde(rename = "@location")]
    location: Option<String>,
}

#[derive(Deserialize)]
struct CommentsXml {
    #[serde(rename = "commentList")]
    comment_list: Option<CommentListXml>,
}

#[derive(Deserialize)]
struct CommentListXml {
    #[serde(rename = "comment", default)]
    comments: Vec<CommentXml>,
}

#[derive(Deserialize)]
struct CommentXml {
    #[serde(rename = "@ref")]
    reference: String,
    #[serde(default)]
    text: RichTextXml,
}

#[derive(Deserialize, Default)]
struct RichTextXml {
    t: Option<TextXml>,
    #[serde(rename = "r", default)]
    runs: Vec<RunXml>,
}

impl RichTextXml {
    fn plain_text(&self) -> String {
        let mut text = String::new();

        if let Some(t) = self.t.as_ref() {
            text.push_str(&t.value);
        }

        for run in &self.runs {
            if let Some(t) = run.t.as_ref() {
                text.push_str(&t.value);
            }
        }

        text
    }
}

#[derive(Deserialize)]
struct RunXml {
    t: Option<TextXml>,
}

#[derive(Deserialize)]
struct TextXml {
    #[serde(rename = "$text", default)]
    value: String,
}
