use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use log::trace;
use serde::Deserialize;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::core::{GenericResult, ScanError};

use super::util::{relationships_path, resolve_part_path};

const WORKBOOK_PART: &str = "xl/workbook.xml";

/// Gives access to the raw XML parts of an OOXML package which calamine doesn't expose.
pub struct Package<R> {
    archive: ZipArchive<R>,
}

impl Package<BufReader<File>> {
    pub fn open(path: &Path) -> GenericResult<Package<BufReader<File>>> {
        let file = File::open(path).map_err(|e| format!("Unable to open {path:?}: {e}"))?;
        Package::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> Package<R> {
    pub fn new(reader: R) -> GenericResult<Package<R>> {
        let archive = ZipArchive::new(reader).map_err(|e| format!(
            "The file is not a valid XLSX package: {e}"))?;
        Ok(Package {archive})
    }

    pub fn read_part(&mut self, name: &str) -> GenericResult<Option<String>> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err!("Unable to read {:?} package part: {}", name, e),
        };

        let mut data = String::new();
        file.read_to_string(&mut data).map_err(|e| format!(
            "Unable to read {name:?} package part: {e}"))?;

        trace!("Read {:?} package part ({} bytes).", name, data.len());
        Ok(Some(data))
    }

    pub fn read_xml<T: for<'de> Deserialize<'de>>(&mut self, name: &str) -> GenericResult<Option<T>> {
        let data = match self.read_part(name)? {
            Some(data) => data,
            None => return Ok(None),
        };

        Ok(Some(quick_xml::de::from_str(&data).map_err(|e| format!(
            "Failed to parse {name:?} package part: {e}"))?))
    }

    pub fn relationships(&mut self, part: &str) -> GenericResult<Vec<Relationship>> {
        let relationships: RelationshipsXml = match self.read_xml(&relationships_path(part))? {
            Some(relationships) => relationships,
            None => return Ok(Vec::new()),
        };

        Ok(relationships.relationships.into_iter().map(|relationship| {
            let external = relationship.target_mode.as_deref() == Some("External");
            let target = if external {
                relationship.target
            } else {
                resolve_part_path(part, &relationship.target)
            };

            Relationship {
                id: relationship.id,
                kind: relationship.kind,
                target,
                external,
            }
        }).collect())
    }

    /// Resolves the sheet which is active when the workbook is opened (the first one by default).
    pub fn active_sheet(&mut self) -> GenericResult<SheetPart> {
        let workbook: WorkbookXml = self.read_xml(WORKBOOK_PART)?.ok_or_else(|| format!(
            "The package doesn't contain {WORKBOOK_PART:?}"))?;

        let active_tab = workbook.book_views
            .and_then(|views| views.views.into_iter().next())
            .and_then(|view| view.active_tab)
            .unwrap_or(0);

        let sheets = workbook.sheets.map(|sheets| sheets.sheets).unwrap_or_default();
        let sheet = sheets.into_iter().nth(active_tab).ok_or_else(|| ScanError::input_not_found(
            format!("Active worksheet (#{})", active_tab + 1)))?;

        let relationships = self.relationships(WORKBOOK_PART)?;
        let relationship = relationships.into_iter()
            .find(|relationship| relationship.id == sheet.relationship_id)
            .ok_or_else(|| ScanError::input_not_found(format!(
                "{:?} worksheet part", sheet.name)))?;

        Ok(SheetPart {
            name: sheet.name,
            path: relationship.target,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetPart {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub kind: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    pub fn is_of_kind(&self, kind: &str) -> bool {
        self.kind.rsplit('/').next() == Some(kind)
    }
}

#[derive(Deserialize)]
struct WorkbookXml {
    #[serde(rename = "bookViews")]
    book_views: Option<BookViewsXml>,
    sheets: Option<SheetsXml>,
}

#[derive(Deserialize)]
struct BookViewsXml {
    #[serde(rename = "workbookView", default)]
    views: Vec<WorkbookViewXml>,
}

#[derive(Deserialize)]
struct WorkbookViewXml {
    #[serde(rename = "@activeTab")]
    active_tab: Option<usize>,
}

#[derive(Deserialize)]
struct SheetsXml {
    #[serde(rename = "sheet", default)]
    sheets: Vec<SheetXml>,
}

#[derive(Deserialize)]
struct SheetXml {
    #[serde(rename = "@name")]
    name: String,
    // quick-xml matches prefixed attributes by their local name
    #[serde(rename = "@id")]
    relationship_id: String,
}

#[derive(Deserialize)]
struct RelationshipsXml {
    #[serde(rename = "Relationship", default)]
    relationships: Vec<RelationshipXml>,
}

#[derive(Deserialize)]
struct RelationshipXml {
    #[serde(rename = "@Id")]
    id: String,
    #[serde(rename = "@Type")]
    kind: String,
    #[serde(rename = "@Target")]
    target: String,
    #[serde(rename = "@TargetMode")]
    target_mode: Option<String>,
}
