use std::collections::HashSet;
use std::fmt;

use log::{debug, trace};
use serde::{Serialize, Serializer};

use crate::core::GenericResult;
use crate::formats::xlsx::{self, CellValue, Sheet};
use crate::styling::{self, StyleRecord};

pub const DEFAULT_SECTIONS: [&str; 9] = [
    "Document",
    "KPIs",
    "Geography Breakdown",
    "Income Statement",
    "Balance Sheet",
    "Cash Flow Statement",
    "Adjusted EBITDA",
    "Property, Plant and Equipment, net",
    "Other Breakdown",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Section,
    Category,
    Subcategory,
    Subsubcategory,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Section => "section",
            Level::Category => "category",
            Level::Subcategory => "subcategory",
            Level::Subsubcategory => "subsubcategory",
        })
    }
}

/// A grouping row: the row it was established at and how it looks. Blank rows establish nameless
/// nodes which close the level but don't count as active for the following rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyNode {
    pub name: Option<CellValue>,
    #[serde(rename = "order")]
    pub anchor_row: u32,
    #[serde(rename = "styling")]
    pub style: Option<StyleRecord>,
    #[serde(rename = "empty_row_after")]
    pub has_trailing_blank_row: bool,
}

impl HierarchyNode {
    fn read(sheet: &Sheet, row: u32, name: Option<CellValue>) -> GenericResult<HierarchyNode> {
        let cell = sheet.cell(row, 1)?;
        let style = name.as_ref().map(|_| styling::extract(&cell.format, false, false));

        Ok(HierarchyNode {
            name,
            anchor_row: row,
            style,
            has_trailing_blank_row: sheet.is_next_row_empty(row),
        })
    }

    pub fn is_active(&self) -> bool {
        self.name.is_some()
    }
}

/// Serializes a missing hierarchy level as a node with empty fields, so every metric has the same
/// shape regardless of its nesting.
pub fn serialize_level<S: Serializer>(node: &Option<HierarchyNode>, serializer: S) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct MissingNode {
        name: Option<CellValue>,
        order: Option<u32>,
        styling: Option<StyleRecord>,
        empty_row_after: bool,
    }

    match node {
        Some(node) => node.serialize(serializer),
        None => MissingNode {
            name: None,
            order: None,
            styling: None,
            empty_row_after: false,
        }.serialize(serializer),
    }
}

/// Active hierarchy nodes at some point of the scan. The context is never modified in place: every
/// change produces a new context, so metrics keep a snapshot of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HierarchyContext {
    pub section: Option<HierarchyNode>,
    pub category: Option<HierarchyNode>,
    pub subcategory: Option<HierarchyNode>,
    pub subsubcategory: Option<HierarchyNode>,
}

impl HierarchyContext {
    pub fn get(&self, level: Level) -> Option<&HierarchyNode> {
        match level {
            Level::Section => self.section.as_ref(),
            Level::Category => self.category.as_ref(),
            Level::Subcategory => self.subcategory.as_ref(),
            Level::Subsubcategory => self.subsubcategory.as_ref(),
        }
    }

    /// Returns a new context with the node set at the specified level and all deeper levels reset.
    #[must_use]
    pub fn with(&self, level: Level, node: HierarchyNode) -> HierarchyContext {
        let mut context = self.clone();

        if level <= Level::Section {
            context.category = None;
        }
        if level <= Level::Category {
            context.subcategory = None;
        }
        if level <= Level::Subcategory {
            context.subsubcategory = None;
        }

        let slot = match level {
            Level::Section => &mut context.section,
            Level::Category => &mut context.category,
            Level::Subcategory => &mut context.subcategory,
            Level::Subsubcategory => &mut context.subsubcategory,
        };
        *slot = Some(node);

        context
    }

    fn active(&self, level: Level) -> Option<&HierarchyNode> {
        self.get(level).filter(|node| node.is_active())
    }

    /// Infers the level of a label-only row from its adjacency to the current anchor rows: a label
    /// right below another label is nested into it, otherwise it starts a new sibling.
    pub fn label_level(&self, row: u32) -> Level {
        let category = match self.active(Level::Category) {
            Some(category) => category,
            None => return Level::Category,
        };

        if let Some(subcategory) = self.active(Level::Subcategory) {
            if row == subcategory.anchor_row + 1 {
                Level::Subsubcategory
            } else {
                Level::Subcategory
            }
        } else if row == category.anchor_row + 1 {
            Level::Subcategory
        } else {
            Level::Category
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowKind {
    Label(Level),
    Metric,
}

pub struct Classifier<'a> {
    sections: &'a HashSet<String>,
}

impl<'a> Classifier<'a> {
    pub fn new(sections: &'a HashSet<String>) -> Classifier<'a> {
        Classifier {sections}
    }

    /// Classifies the row and returns the hierarchy context to process the following rows with.
    pub fn classify(&self, sheet: &Sheet, row: u32, context: &HierarchyContext) -> GenericResult<(HierarchyContext, RowKind)> {
        let label = sheet.value(row, 1)?.filter(|&label| !xlsx::is_blank(Some(label))).cloned();

        let mut has_data = false;
        for column in 2..=sheet.max_column() {
            if !xlsx::is_blank(sheet.value(row, column)?) {
                has_data = true;
                break;
            }
        }

        let level = if label.as_ref().and_then(CellValue::as_str).is_some_and(|label| self.sections.contains(label)) {
            Level::Section
        } else if !has_data {
            context.label_level(row)
        } else {
            trace!("Row #{}: {:?} metric.", row, label);
            return Ok((context.clone(), RowKind::Metric));
        };

        let node = HierarchyNode::read(sheet, row, label)?;
        match node.name.as_ref() {
            Some(name) => debug!("Row #{}: {:?} {}.", row, name, level),
            None => trace!("Row #{}: blank row closes the {}.", row, level),
        }

        Ok((context.with(level, node), RowKind::Label(level)))
    }
}
