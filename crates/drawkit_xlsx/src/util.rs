//! Stateless helper utilities used by the layout core.

use polars::prelude::AnyValue;
use rust_xlsxwriter::{ColNum, RowNum};

use crate::conf::{N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::error::LayoutError;
use crate::spec::{EnumCellValue, EnumEdgeSide, EnumEdgeStyle, EnumRichSpan, SpecCellStyle};

////////////////////////////////////////////////////////////////////////////////
// #region AddressNotation

/// Convert zero-based `(row, column)` coordinates to A1 notation.
pub fn coords_to_xl(x: RowNum, y: ColNum) -> String {
    format!("{}{}", derive_column_letters(y), x + 1)
}

/// Convert an A1-notation cell address back to zero-based coordinates.
///
/// Absolute markers (`$`) are accepted and ignored.
pub fn xl_to_coords(addr: &str) -> Result<(RowNum, ColNum), LayoutError> {
    let c_addr = addr.trim().replace('$', "");

    let n_letters = c_addr
        .chars()
        .take_while(|chr| chr.is_ascii_alphabetic())
        .count();
    let (c_col, c_row) = c_addr.split_at(n_letters);

    if c_col.is_empty() || c_row.is_empty() || !c_row.chars().all(|chr| chr.is_ascii_digit()) {
        return Err(LayoutError::Configuration(format!(
            "invalid cell address: {addr:?}."
        )));
    }

    let mut n_col: u64 = 0;
    for chr in c_col.chars() {
        let n_digit = (chr.to_ascii_uppercase() as u64) - ('A' as u64) + 1;
        n_col = n_col * 26 + n_digit;
    }
    let n_row: u64 = c_row
        .parse()
        .map_err(|_| LayoutError::Configuration(format!("invalid cell address: {addr:?}.")))?;

    if n_row == 0 || n_row > u64::from(N_NROWS_EXCEL_MAX) || n_col > u64::from(N_NCOLS_EXCEL_MAX) {
        return Err(LayoutError::Configuration(format!(
            "cell address out of grid bounds: {addr:?}."
        )));
    }

    Ok(((n_row - 1) as RowNum, (n_col - 1) as ColNum))
}

/// Column-letter substring of an A1 address for a zero-based column.
pub fn derive_column_letters(y: ColNum) -> String {
    let mut n_col = u32::from(y) + 1;
    let mut l_letters = Vec::new();
    while n_col > 0 {
        let n_rem = (n_col - 1) % 26;
        l_letters.push(char::from(b'A' + n_rem as u8));
        n_col = (n_col - 1) / 26;
    }
    l_letters.iter().rev().collect()
}

/// Row-number substring of an A1 address for a zero-based row.
pub fn derive_row_number(x: RowNum) -> String {
    (x + 1).to_string()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ValueText

/// Display text of a cell value, with `na_rep` standing in for missing ones.
pub fn derive_value_text(value: &EnumCellValue, na_rep: &str) -> String {
    match value {
        EnumCellValue::None => na_rep.to_string(),
        EnumCellValue::String(val) => val.clone(),
        EnumCellValue::Number(val) => val.to_string(),
        EnumCellValue::Bool(val) => val.to_string(),
        EnumCellValue::Rich(spans) => spans
            .iter()
            .filter_map(|span| match span {
                EnumRichSpan::Text(text) => Some(text.as_str()),
                EnumRichSpan::StylePatch(_) => None,
            })
            .collect(),
    }
}

/// Text length of a cell value, `None` when the value has no measurable text.
///
/// Missing values are unmeasurable; auto column sizing skips them.
pub fn derive_value_text_len(value: &EnumCellValue) -> Option<usize> {
    match value {
        EnumCellValue::None => None,
        _ => Some(derive_value_text(value, "").chars().count()),
    }
}

/// Convert one polars cell into a layout cell value.
pub fn convert_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::Boolean(val) => EnumCellValue::Bool(val),
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::UInt8(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt16(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int8(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int16(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int128(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region EdgeStyling

/// Expand an edge style into a patch and merge it onto `style`.
///
/// `Border(n)` sets only the edge-facing side; a patch overlays verbatim.
pub fn apply_edge_style(
    style: &SpecCellStyle,
    edge: &EnumEdgeStyle,
    side: EnumEdgeSide,
) -> SpecCellStyle {
    match edge {
        EnumEdgeStyle::None => style.clone(),
        EnumEdgeStyle::Patch(patch) => style.merge(patch),
        EnumEdgeStyle::Border(val) => {
            let mut patch = SpecCellStyle::default();
            match side {
                EnumEdgeSide::Top => patch.top = Some(*val),
                EnumEdgeSide::Bottom => patch.bottom = Some(*val),
                EnumEdgeSide::Left => patch.left = Some(*val),
                EnumEdgeSide::Right => patch.right = Some(*val),
            }
            style.merge(&patch)
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Validation

/// Validate a grid-cell extent (height or width).
pub fn validate_extent(name: &str, value: u64) -> Result<(), LayoutError> {
    if value == 0 {
        return Err(LayoutError::Configuration(format!("{name} must be >= 1.")));
    }
    Ok(())
}

/// Validate a per-member list length against the container size.
pub fn validate_list_len(name: &str, n_given: usize, n_members: usize) -> Result<(), LayoutError> {
    if n_given != n_members {
        return Err(LayoutError::Configuration(format!(
            "{name} has {n_given} entries but the container has {n_members} members."
        )));
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coords_to_xl_basic_addresses() {
        assert_eq!(coords_to_xl(0, 0), "A1");
        assert_eq!(coords_to_xl(9, 2), "C10");
        assert_eq!(coords_to_xl(0, 25), "Z1");
        assert_eq!(coords_to_xl(0, 26), "AA1");
        assert_eq!(coords_to_xl(0, 701), "ZZ1");
        assert_eq!(coords_to_xl(0, 702), "AAA1");
    }

    #[test]
    fn test_xl_to_coords_round_trip() {
        for (x, y) in [(0u32, 0u16), (3, 4), (99, 25), (0, 26), (1_000, 703)] {
            assert_eq!(xl_to_coords(&coords_to_xl(x, y)).unwrap(), (x, y));
        }
    }

    #[test]
    fn test_xl_to_coords_accepts_absolute_markers() {
        assert_eq!(xl_to_coords("$B$7").unwrap(), (6, 1));
    }

    #[test]
    fn test_xl_to_coords_rejects_malformed_addresses() {
        assert!(xl_to_coords("").is_err());
        assert!(xl_to_coords("12").is_err());
        assert!(xl_to_coords("AB").is_err());
        assert!(xl_to_coords("A0").is_err());
        assert!(xl_to_coords("A1B").is_err());
    }

    #[test]
    fn test_derive_value_text_len_missing_is_unmeasurable() {
        assert_eq!(derive_value_text_len(&EnumCellValue::None), None);
        assert_eq!(
            derive_value_text_len(&EnumCellValue::String("abcd".to_string())),
            Some(4)
        );
        assert_eq!(derive_value_text_len(&EnumCellValue::Number(2.0)), Some(1));
    }

    #[test]
    fn test_rich_value_text_concatenates_fragments_only() {
        let value = EnumCellValue::Rich(vec![
            EnumRichSpan::Text("ab".to_string()),
            EnumRichSpan::StylePatch(SpecCellStyle {
                bold: Some(true),
                ..Default::default()
            }),
            EnumRichSpan::Text("cd".to_string()),
        ]);
        assert_eq!(derive_value_text(&value, ""), "abcd");
        assert_eq!(derive_value_text_len(&value), Some(4));
    }

    #[test]
    fn test_apply_edge_style_border_touches_one_side() {
        let style = SpecCellStyle {
            bold: Some(true),
            ..Default::default()
        };
        let styled = apply_edge_style(&style, &EnumEdgeStyle::Border(2), EnumEdgeSide::Left);
        assert_eq!(styled.left, Some(2));
        assert_eq!(styled.top, None);
        assert_eq!(styled.bold, Some(true));
    }
}
