use serde::Deserialize;

use crate::core::GenericResult;

/// Raw formatting of a cell as it's stored in the workbook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFormat {
    pub bold: bool,
    pub fill: Option<Fill>,
    pub indent: Option<u32>,
    pub border: Border,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub pattern: String,
    pub foreground: Option<Color>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    Rgb(String),
    Theme(u32),
    Indexed(u32),
    Auto,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Border {
    pub left: Option<String>,
    pub right: Option<String>,
    pub top: Option<String>,
    pub bottom: Option<String>,
}

impl Border {
    pub fn sides(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("left", self.left.as_deref()),
            ("right", self.right.as_deref()),
            ("top", self.top.as_deref()),
            ("bottom", self.bottom.as_deref()),
        ]
    }
}

/// Cell formats indexed by the `s` attribute of worksheet cells.
#[derive(Debug, Default)]
pub struct Styles {
    formats: Vec<CellFormat>,
}

impl Styles {
    pub fn parse(data: &str) -> GenericResult<Styles> {
        let stylesheet: StyleSheetXml = quick_xml::de::from_str(data).map_err(|e| format!(
            "Failed to parse workbook styles: {e}"))?;

        let fonts = stylesheet.fonts.map(|fonts| fonts.fonts).unwrap_or_default();
        let fills = stylesheet.fills.map(|fills| fills.fills).unwrap_or_default();
        let borders = stylesheet.borders.map(|borders| borders.borders).unwrap_or_default();
        let xfs = stylesheet.cell_xfs.map(|xfs| xfs.xfs).unwrap_or_default();

        let mut formats = Vec::with_capacity(xfs.len());

        for (index, xf) in xfs.into_iter().enumerate() {
            let font = match xf.font_id {
                Some(id) => Some(fonts.get(id).ok_or_else(|| format!(
                    "Cell format #{index} references an unknown font #{id}"))?),
                None => None,
            };

            let fill = match xf.fill_id {
                Some(id) => fills.get(id).ok_or_else(|| format!(
                    "Cell format #{index} references an unknown fill #{id}"))?.parse(),
                None => None,
            };

            let border = match xf.border_id {
                Some(id) => borders.get(id).ok_or_else(|| format!(
                    "Cell format #{index} references an unknown border #{id}"))?.parse(),
                None => Border::default(),
            };

            formats.push(CellFormat {
                bold: font.map(FontXml::is_bold).unwrap_or(false),
                fill,
                indent: xf.alignment.and_then(|alignment| alignment.indent),
                border,
            });
        }

        Ok(Styles {formats})
    }

    pub fn get(&self, index: usize) -> Option<&CellFormat> {
        self.formats.get(index)
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

#[derive(Deserialize)]
struct StyleSheetXml {
    fonts: Option<FontsXml>,
    fills: Option<FillsXml>,
    borders: Option<BordersXml>,
    #[serde(rename = "cellXfs")]
    cell_xfs: Option<CellXfsXml>,
}

#[derive(Deserialize)]
struct FontsXml {
    #[serde(rename = "font", default)]
    fonts: Vec<FontXml>,
}

#[derive(Deserialize)]
struct FontXml {
    b: Option<FlagXml>,
}

impl FontXml {
    fn is_bold(&self) -> bool {
        self.b.as_ref().map(FlagXml::is_set).unwrap_or(false)
    }
}

#[derive(Deserialize)]
struct FlagXml {
    #[serde(rename = "@val")]
    val: Option<String>,
}

impl FlagXml {
    fn is_set(&self) -> bool {
        !matches!(self.val.as_deref(), Some("0" | "false"))
    }
}

#[derive(Deserialize)]
struct FillsXml {
    #[serde(rename = "fill", default)]
    fills: Vec<FillXml>,
}

#[derive(Deserialize)]
struct FillXml {
    #[serde(rename = "patternFill")]
    pattern_fill: Option<PatternFillXml>,
}

impl FillXml {
    fn parse(&self) -> Option<Fill> {
        let pattern_fill = self.pattern_fill.as_ref()?;

        let pattern = pattern_fill.pattern_type.as_deref().unwrap_or("none");
        if pattern == "none" {
            return None;
        }

        Some(Fill {
            pattern: pattern.to_owned(),
            foreground: pattern_fill.fg_color.as_ref().and_then(ColorXml::parse),
        })
    }
}

#[derive(Deserialize)]
struct PatternFillXml {
    #[serde(rename = "@patternType")]
    pattern_type: Option<String>,
    #[serde(rename = "fgColor")]
    fg_color: Option<ColorXml>,
}

#[derive(Deserialize)]
struct ColorXml {
    #[serde(rename = "@rgb")]
    rgb: Option<String>,
    #[serde(rename = "@theme")]
    theme: Option<u32>,
    #[serde(rename = "@indexed")]
    indexed: Option<u32>,
    #[serde(rename = "@auto")]
    auto: Option<String>,
}

impl ColorXml {
    fn parse(&self) -> Option<Color> {
        if let Some(rgb) = self.rgb.as_ref() {
            Some(Color::Rgb(rgb.clone()))
        } else if let Some(theme) = self.theme {
            Some(Color::Theme(theme))
        } else if let Some(indexed) = self.indexed {
            Some(Color::Indexed(indexed))
        } else if self.auto.is_some() {
            Some(Color::Auto)
        } else {
            None
        }
    }
}

#[derive(Deserialize)]
struct BordersXml {
    #[serde(rename = "border", default)]
    borders: Vec<BorderXml>,
}

#[derive(Deserialize)]
struct BorderXml {
    left: Option<BorderSideXml>,
    right: Option<BorderSideXml>,
    top: Option<BorderSideXml>,
    bottom: Option<BorderSideXml>,
    // Strict OOXML flavour of left/right
    start: Option<BorderSideXml>,
    end: Option<BorderSideXml>,
}

impl BorderXml {
    fn parse(&self) -> Border {
        let style = |side: &Option<BorderSideXml>| {
            side.as_ref().and_then(|side| side.style.clone()).filter(|style| style != "none")
        };

        Border {
            left: style(&self.left).or_else(|| style(&self.start)),
            right: style(&self.right).or_else(|| style(&self.end)),
            top: style(&self.top),
            bottom: style(&self.bottom),
        }
    }
}

#[derive(Deserialize)]
struct BorderSideXml {
    #[serde(rename = "@style")]
    style: Option<String>,
}

#[derive(Deserialize)]
struct CellXfsXml {
    #[serde(rename = "xf", default)]
    xfs: Vec<XfXml>,
}

#[derive(Deserialize)]
struct XfXml {
    #[serde(rename = "@fontId")]
    font_id: Option<usize>,
    #[serde(rename = "@fillId")]
    fill_id: Option<usize>,
    #[serde(rename = "@borderId")]
    border_id: Option<usize>,
    alignment: Option<AlignmentXml>,
}

#[derive(Deserialize)]
struct AlignmentXml {
    #[serde(rename = "@indent")]
    indent: Option<u32>,
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    const STYLES: &str = indoc!(r#"
        <?xml version="1.0" encoding="UTF-8" standalone="yes"?>
        <styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
            <fonts count="3">
                <font><sz val="11"/><name val="Calibri"/></font>
                <font><b/><sz val="11"/><name val="Calibri"/></font>
                <font><b val="0"/><sz val="11"/></font>
            </fonts>
            <fills count="4">
                <fill><patternFill patternType="none"/></fill>
                <fill><patternFill patternType="gray125"/></fill>
                <fill><patternFill patternType="solid"><fgColor rgb="FFDDEBF7"/><bgColor indexed="64"/></patternFill></fill>
                <fill><patternFill patternType="solid"><fgColor theme="4" tint="0.79"/></patternFill></fill>
            </fills>
            <borders count="2">
                <border><left/><right/><top/><bottom/><diagonal/></border>
                <border><left style="thin"><color indexed="64"/></left><right/><top style="medium"/><bottom style="double"/><diagonal/></border>
            </borders>
            <cellStyleXfs count="1">
                <xf numFmtId="0" fontId="1" fillId="2" borderId="1"/>
            </cellStyleXfs>
            <cellXfs count="4">
                <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
                <xf numFmtId="0" fontId="1" fillId="2" borderId="1" xfId="0" applyFont="1"/>
                <xf numFmtId="0" fontId="2" fillId="3" borderId="0" xfId="0"><alignment horizontal="left" indent="2"/></xf>
                <xf numFmtId="0" fontId="0" fillId="1" borderId="0" xfId="0"><alignment vertical="top"/></xf>
            </cellXfs>
            <dxfs count="1"><dxf><font><b/></font><fill><patternFill><bgColor rgb="FFFF0000"/></patternFill></fill></dxf></dxfs>
        </styleSheet>
    "#);

    #[test]
    fn parse() {
        let styles = Styles::parse(STYLES).unwrap();
        assert_eq!(styles.len(), 4);

        assert_eq!(styles.get(0).unwrap(), &CellFormat::default());

        assert_eq!(styles.get(1).unwrap(), &CellFormat {
            bold: true,
            fill: Some(Fill {
                pattern: s!("solid"),
                foreground: Some(Color::Rgb(s!("FFDDEBF7"))),
            }),
            indent: None,
            border: Border {
                left: Some(s!("thin")),
                right: None,
                top: Some(s!("medium")),
                bottom: Some(s!("double")),
            },
        });

        assert_eq!(styles.get(2).unwrap(), &CellFormat {
            bold: false,
            fill: Some(Fill {
                pattern: s!("solid"),
                foreground: Some(Color::Theme(4)),
            }),
            indent: Some(2),
            border: Border::default(),
        });

        assert_eq!(styles.get(3).unwrap(), &CellFormat {
            fill: Some(Fill {
                pattern: s!("gray125"),
                foreground: None,
            }),
            ..Default::default()
        });

        assert!(styles.get(4).is_none());
    }

    #[test]
    fn dangling_references() {
        let styles = indoc!(r#"
            <styleSheet>
                <fonts count="1"><font/></fonts>
                <cellXfs count="1"><xf fontId="3"/></cellXfs>
            </styleSheet>
        "#);

        let error = Styles::parse(styles).unwrap_err();
        assert_eq!(error.to_string(), "Cell format #0 references an unknown font #3");
    }
}
