use crate::core::GenericResult;

/// Parses `B12`-like (optionally `$`-anchored) cell reference into 1-based `(row, column)`.
pub fn parse_cell_ref(reference: &str) -> GenericResult<(u32, u32)> {
    let reference = reference.replace('$', "");
    let digits_start = reference.find(|c: char| c.is_ascii_digit()).ok_or_else(|| format!(
        "Invalid cell reference: {reference:?}"))?;

    let (letters, digits) = reference.split_at(digits_start);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err!("Invalid cell reference: {:?}", reference);
    }

    let mut column: u32 = 0;
    for c in letters.chars() {
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        column = column.checked_mul(26).and_then(|column| column.checked_add(digit)).ok_or_else(|| format!(
            "Invalid cell reference: {reference:?}"))?;
    }

    let row: u32 = digits.parse().map_err(|_| format!("Invalid cell reference: {reference:?}"))?;
    if row == 0 {
        return Err!("Invalid cell reference: {:?}", reference);
    }

    Ok((row, column))
}

/// Parses `A1:C3` (or a single `A1` cell) into its top-left and bottom-right corners.
pub fn parse_range_ref(reference: &str) -> GenericResult<((u32, u32), (u32, u32))> {
    let (start, end) = match reference.split_once(':') {
        Some((start, end)) => (parse_cell_ref(start)?, parse_cell_ref(end)?),
        None => {
            let cell = parse_cell_ref(reference)?;
            (cell, cell)
        },
    };

    Ok((
        (start.0.min(end.0), start.1.min(end.1)),
        (start.0.max(end.0), start.1.max(end.1)),
    ))
}

/// Resolves relationship target against the directory of its source part.
pub fn resolve_part_path(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_owned();
    }

    let mut components: Vec<&str> = source_part.split('/').collect();
    components.pop();

    for component in target.split('/') {
        match component {
            "" | "." => {},
            ".." => {
                components.pop();
            },
            _ => components.push(component),
        }
    }

    components.join("/")
}

/// Returns `xl/worksheets/_rels/sheet1.xml.rels` for `xl/worksheets/sheet1.xml`.
pub fn relationships_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, name)) => format!("{dir}/_rels/{name}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use super::*;

    #[rstest(reference, expected,
        case("A1", (1, 1)),
        case("E4", (4, 5)),
        case("Z10", (10, 26)),
        case("AA1", (1, 27)),
        case("$AB$12", (12, 28)),
        case("xfd1048576", (1048576, 16384)),
    )]
    fn cell_ref_parsing(reference: &str, expected: (u32, u32)) {
        assert_eq!(parse_cell_ref(reference).unwrap(), expected);
    }

    #[rstest(reference,
        case(""),
        case("A"),
        case("12"),
        case("A0"),
        case("1A"),
        case("A1B"),
    )]
    fn invalid_cell_ref(reference: &str) {
        assert!(parse_cell_ref(reference).is_err());
    }

    #[test]
    fn range_ref_parsing() {
        assert_eq!(parse_range_ref("B2").unwrap(), ((2, 2), (2, 2)));
        assert_eq!(parse_range_ref("A1:C3").unwrap(), ((1, 1), (3, 3)));
        assert_eq!(parse_range_ref("C3:A1").unwrap(), ((1, 1), (3, 3)));
    }

    #[rstest(source, target, expected,
        case("xl/workbook.xml", "worksheets/sheet1.xml", "xl/worksheets/sheet1.xml"),
        case("xl/workbook.xml", "/xl/worksheets/sheet2.xml", "xl/worksheets/sheet2.xml"),
        case("xl/worksheets/sheet1.xml", "../comments1.xml", "xl/comments1.xml"),
        case("xl/worksheets/sheet1.xml", "./../drawings/../comments2.xml", "xl/comments2.xml"),
    )]
    fn part_path_resolution(source: &str, target: &str, expected: &str) {
        assert_eq!(resolve_part_path(source, target), expected);
    }

    #[test]
    fn relationships_path_building() {
        assert_eq!(relationships_path("xl/workbook.xml"), "xl/_rels/workbook.xml.rels");
        assert_eq!(relationships_path("xl/worksheets/sheet1.xml"), "xl/worksheets/_rels/sheet1.xml.rels");
    }
}
