use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use log::{debug, info};
use serde::Serialize;

use crate::core::GenericResult;
use crate::formats::xlsx::Sheet;
use crate::types::UtcTimestamp;

use super::hierarchy::{Classifier, DEFAULT_SECTIONS, HierarchyContext, RowKind};
use super::metric::MetricRecord;
use super::time_series::PeriodHeaders;

pub const FIRST_DATA_ROW: u32 = 4;

/// The filing the model has been last updated with.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Provenance {
    pub source: String,
    pub file_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub company: String,
    pub ticker: String,
    pub updated_at: UtcTimestamp,
    pub last_updated_with: Provenance,
    pub metrics: Vec<MetricRecord>,
}

impl Document {
    pub fn to_json(&self) -> GenericResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| format!(
            "Failed to serialize {} document: {}", self.ticker, e).into())
    }
}

pub struct DocumentBuilder {
    company: String,
    ticker: String,
    provenance: Provenance,
    updated_at: Option<UtcTimestamp>,
    sections: HashSet<String>,
}

impl DocumentBuilder {
    pub fn new(company: &str, ticker: &str, provenance: Provenance) -> DocumentBuilder {
        DocumentBuilder {
            company: company.to_owned(),
            ticker: ticker.to_owned(),
            provenance,
            updated_at: None,
            sections: DEFAULT_SECTIONS.iter().map(|&section| section.to_owned()).collect(),
        }
    }

    pub fn updated_at(mut self, time: UtcTimestamp) -> DocumentBuilder {
        self.updated_at = Some(time);
        self
    }

    pub fn sections<S: AsRef<str>>(mut self, sections: &[S]) -> DocumentBuilder {
        self.sections = sections.iter().map(|section| section.as_ref().to_owned()).collect();
        self
    }

    pub fn build_from_file(&self, path: &Path) -> GenericResult<Document> {
        let sheet = Sheet::open(path)?;
        let document = self.build(&sheet)?;
        info!("{:?} has been converted: {} metrics.", path, document.metrics.len());
        Ok(document)
    }

    pub fn build(&self, sheet: &Sheet) -> GenericResult<Document> {
        debug!("Building {} ({}) document from {:?} sheet...", self.company, self.ticker, sheet.name());

        let headers = PeriodHeaders::read(sheet)?;
        debug!("{:?} sheet has {} period columns.", sheet.name(), headers.len());

        let classifier = Classifier::new(&self.sections);
        let mut context = HierarchyContext::default();
        let mut metrics = Vec::new();

        for row in FIRST_DATA_ROW..=sheet.max_row() {
            let (next_context, kind) = classifier.classify(sheet, row, &context)?;
            context = next_context;

            if kind == RowKind::Metric {
                metrics.push(MetricRecord::read(sheet, row, &context, &headers)?);
            }
        }

        Ok(Document {
            company: self.company.clone(),
            ticker: self.ticker.clone(),
            updated_at: self.updated_at.unwrap_or_else(Utc::now),
            last_updated_with: self.provenance.clone(),
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::core::ScanError;
    use crate::formats::xlsx::{CellFormat, CellValue, Color, Fill, SheetBuilder};
    use crate::model::HierarchyNode;

    use super::*;

    fn provenance() -> Provenance {
        Provenance {
            source: s!("S-1 Filing"),
            file_link: s!("https://www.sec.gov/Archives/edgar/data/1713445/reddits-1q423.htm"),
        }
    }

    fn node(node: &Option<HierarchyNode>) -> Option<(&str, u32)> {
        node.as_ref().and_then(|node| Some((node.name.as_ref()?.as_str()?, node.anchor_row)))
    }

    fn model() -> Sheet {
        SheetBuilder::new("Model")
            .row(1, vec![None, None, None, None, Some("Q1 2024"), Some("Q2 2024")])
            .row(2, vec![None, None, None, None, Some("Q1 FY24"), Some("Q2 FY24")])
            .row(3, vec![None, None, None, None, Some("2024-03-31"), Some("2024-06-30")])
            .row(4, vec![Some("KPIs")])
            .row(5, vec![Some("Users")])
            .row(6, vec![Some("Daily active users")])
            .row(7, vec![Some("DAUq"), Some("M"), Some("10-Q"), Some("RDDT-1")])
            .value(7, 5, 82.7)
            .value(7, 6, 91.2)
            .row(8, vec![Some("Logged-in DAUq"), Some("M"), Some("10-Q")])
            .value(8, 5, 37.1)
            .formula(8, 6, "=E8*1.1", 40.81)
            .format(4, 1, CellFormat {
                bold: true,
                fill: Some(Fill {pattern: s!("solid"), foreground: Some(Color::Rgb(s!("FFDDEBF7")))}),
                ..Default::default()
            })
            .link(7, 3, "https://www.sec.gov/10-Q.htm")
            .build()
    }

    #[test]
    fn build() {
        let updated_at = Utc.with_ymd_and_hms(2024, 8, 1, 12, 0, 0).unwrap();
        let document = DocumentBuilder::new("Reddit", "RDDT", provenance())
            .updated_at(updated_at)
            .build(&model()).unwrap();

        assert_eq!(document.company, "Reddit");
        assert_eq!(document.ticker, "RDDT");
        assert_eq!(document.updated_at, updated_at);
        assert_eq!(document.last_updated_with, provenance());
        assert_eq!(document.metrics.len(), 2);

        for metric in &document.metrics {
            assert_eq!(node(&metric.section), Some(("KPIs", 4)));
            assert_eq!(node(&metric.category), Some(("Users", 5)));
            assert_eq!(node(&metric.subcategory), Some(("Daily active users", 6)));
            assert_eq!(metric.subsubcategory, None);
            assert_eq!(metric.values.len(), 2);
        }

        let (first, second) = (&document.metrics[0], &document.metrics[1]);
        assert_eq!(first.section, second.section);
        assert_eq!(first.category, second.category);
        assert_eq!(first.subcategory, second.subcategory);

        assert_eq!(first.name.name, Some(CellValue::from("DAUq")));
        assert_eq!(first.tag_id, Some(CellValue::from("RDDT-1")));
        assert_eq!(first.source.link.as_deref(), Some("https://www.sec.gov/10-Q.htm"));
        assert!(!first.name.has_trailing_blank_row);

        assert_eq!(second.tag_id, None);
        assert_eq!(second.values[1].formula.as_deref(), Some("=E8*1.1"));
        assert_eq!(second.values[1].style.text_color, "#000000");
        assert!(second.name.has_trailing_blank_row);

        let style = first.section.as_ref().and_then(|section| section.style.as_ref()).unwrap();
        assert!(style.text_bold);
        assert_eq!(style.background_color, "#DDEBF7");
    }

    #[test]
    fn serialization() {
        let sheet = SheetBuilder::new("Model")
            .value(1, 5, "Q1 2024")
            .value(2, 5, "Q1 FY24")
            .value(3, 5, "2024-03-31")
            .row(4, vec![Some("Revenue"), Some("USD"), Some("10-Q"), None, Some("120")])
            .build();

        let document = DocumentBuilder::new("Reddit", "RDDT", provenance())
            .updated_at(Utc.with_ymd_and_hms(2024, 8, 1, 12, 0, 0).unwrap())
            .build(&sheet).unwrap();

        let style = |text_color: &str| json!({
            "text_color": text_color,
            "text_bold": false,
            "background_color": "#FFFFFF",
            "indents": 0,
            "border": "none",
        });
        let missing = json!({"name": null, "order": null, "styling": null, "empty_row_after": false});

        assert_eq!(serde_json::to_value(&document).unwrap(), json!({
            "company": "Reddit",
            "ticker": "RDDT",
            "updated_at": "2024-08-01T12:00:00Z",
            "last_updated_with": {
                "source": "S-1 Filing",
                "file_link": "https://www.sec.gov/Archives/edgar/data/1713445/reddits-1q423.htm",
            },
            "metrics": [{
                "section": missing.clone(),
                "category": missing.clone(),
                "subcategory": missing.clone(),
                "subsubcategory": missing,
                "name": {
                    "name": "Revenue",
                    "order": 4,
                    "link": null,
                    "styling": style("#0000FF"),
                    "empty_row_after": true,
                },
                "values": [{
                    "period": "Q1 2024",
                    "fiscal": "Q1 FY24",
                    "fiscal_date": "2024-03-31",
                    "value": "120",
                    "formula": null,
                    "comment": null,
                    "link": null,
                    "styling": style("#0000FF"),
                }],
                "unit": "USD",
                "source": {
                    "value": "10-Q",
                    "order": 4,
                    "link": null,
                    "styling": style("#0000FF"),
                    "empty_row_after": true,
                },
                "tag_id": null,
            }],
        }));
    }

    #[test]
    fn custom_sections() {
        let sheet = SheetBuilder::new("Model")
            .row(4, vec![Some("Operating metrics")])
            .row(5, vec![Some("KPIs")])
            .row(6, vec![Some("Users"), Some("M")])
            .build();

        let document = DocumentBuilder::new("Reddit", "RDDT", provenance())
            .sections(&["Operating metrics"])
            .build(&sheet).unwrap();

        let metric = &document.metrics[0];
        assert_eq!(node(&metric.section), Some(("Operating metrics", 4)));
        assert_eq!(node(&metric.category), Some(("KPIs", 5)));
        assert!(metric.values.is_empty());
    }

    #[test]
    fn unlabelled_rows() {
        let sheet = SheetBuilder::new("Model")
            .value(1, 5, "Q1 2024")
            .row(4, vec![Some("Revenue")])
            .row(5, vec![Some("Ads"), Some("USD"), Some("10-Q"), None, Some("40")])
            .row(6, vec![None, Some("USD"), Some("10-Q"), None, Some("42")])
            .row(8, vec![Some("Other"), Some("USD")])
            .build();

        let document = DocumentBuilder::new("Reddit", "RDDT", provenance()).build(&sheet).unwrap();
        assert_eq!(document.metrics.len(), 3);

        let unlabelled = &document.metrics[1];
        assert_eq!(unlabelled.name.name, None);
        assert_eq!(unlabelled.name.anchor_row, 6);
        assert_eq!(unlabelled.values[0].value, Some(CellValue::from("42")));
        assert_eq!(node(&unlabelled.category), Some(("Revenue", 4)));

        // The blank row closes the category
        let other = &document.metrics[2];
        let category = other.category.as_ref().unwrap();
        assert_eq!((&category.name, category.anchor_row, &category.style), (&None, 7, &None));

        let value = serde_json::to_value(other).unwrap();
        assert_eq!(value["category"], json!({"name": null, "order": 7, "styling": null, "empty_row_after": false}));
    }

    #[test]
    fn empty_sheet() {
        let document = DocumentBuilder::new("Reddit", "RDDT", provenance())
            .build(&SheetBuilder::new("Model").build()).unwrap();
        assert!(document.metrics.is_empty());
    }

    #[test]
    fn missing_file() {
        let error = DocumentBuilder::new("Reddit", "RDDT", provenance())
            .build_from_file(Path::new("/nonexistent/RDDT Model.xlsx")).unwrap_err();
        assert!(matches!(error.downcast_ref::<ScanError>(), Some(ScanError::InputNotFound {..})));
    }
}
