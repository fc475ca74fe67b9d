//! Two-dimensional grid of elements organized as named columns.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use rust_xlsxwriter::{ColNum, RowNum, Worksheet};

use crate::element::{Element, validate_sizing};
use crate::error::LayoutError;
use crate::series::{EnumSeriesItem, Series};
use crate::spec::{
    Drawable, EnumCellValue, EnumEdgeSide, EnumElementProp, SpecCellStyle, SpecDrawOptions,
    SpecElementOptions, SpecMatrixColumnOptions, SpecMatrixOptions, SpecSeriesOptions,
};
use crate::util::{apply_edge_style, convert_any_value, validate_list_len};

/// One named column of a matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecMatrixColumn {
    /// Column name; drawn as the header when names are requested.
    pub name: String,
    /// Column cells, top to bottom.
    pub cells: Vec<Element>,
}

/// Rectangular grid of elements drawn column by column.
///
/// Every column carries the same number of cells. Columns are rendered as
/// vertical runs side by side; the optional header row sits above the grid
/// and is excluded from the reported extents.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    /// Named columns in draw order.
    pub columns: Vec<SpecMatrixColumn>,
    /// Style patch for column name headers.
    pub name_style: SpecCellStyle,
    /// Per-column overrides, keyed by column name.
    pub col_options: BTreeMap<String, SpecMatrixColumnOptions>,
}

impl Matrix {
    /// Create a matrix by wrapping `columns` with the shared options.
    ///
    /// All columns must carry the same number of cells. Boundary styling
    /// (`top`/`bottom`/`left`/`right`) is merged onto the outermost cells.
    pub fn new(
        columns: Vec<(String, Vec<EnumSeriesItem>)>,
        options: &SpecMatrixOptions,
    ) -> Result<Self, LayoutError> {
        if let Some((name_first, cells_first)) = columns.first() {
            for (name, cells) in &columns {
                if cells.len() != cells_first.len() {
                    return Err(LayoutError::Configuration(format!(
                        "column {name:?} has {} cells but column {name_first:?} has {}.",
                        cells.len(),
                        cells_first.len()
                    )));
                }
            }
        }

        let mut l_columns = Vec::with_capacity(columns.len());
        for (name, cells) in columns {
            let l_cells = cells
                .into_iter()
                .map(|item| {
                    item.into_element(
                        options.height,
                        options.width,
                        &options.style,
                        options.write_op,
                        &options.write_args,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;
            l_columns.push(SpecMatrixColumn {
                name,
                cells: l_cells,
            });
        }

        let n_cols = l_columns.len();
        for (n_idx_col, column) in l_columns.iter_mut().enumerate() {
            let n_rows = column.cells.len();
            for (n_idx_row, elem) in column.cells.iter_mut().enumerate() {
                if n_idx_row == 0 {
                    elem.style = apply_edge_style(&elem.style, &options.top, EnumEdgeSide::Top);
                }
                if n_idx_row + 1 == n_rows {
                    elem.style =
                        apply_edge_style(&elem.style, &options.bottom, EnumEdgeSide::Bottom);
                }
                if n_idx_col == 0 {
                    elem.style = apply_edge_style(&elem.style, &options.left, EnumEdgeSide::Left);
                }
                if n_idx_col + 1 == n_cols {
                    elem.style =
                        apply_edge_style(&elem.style, &options.right, EnumEdgeSide::Right);
                }
            }
        }

        for cfg_col in options.col_options.values() {
            validate_sizing(&cfg_col.column_sizing, cfg_col.padding)?;
        }

        Ok(Self {
            columns: l_columns,
            name_style: options.name_style.clone(),
            col_options: options.col_options.clone(),
        })
    }

    /// Create a matrix from a polars data frame, one element per cell.
    pub fn from_dataframe(
        frame: &DataFrame,
        options: &SpecMatrixOptions,
    ) -> Result<Self, LayoutError> {
        let mut l_columns = Vec::with_capacity(frame.width());
        for column in frame.get_columns() {
            let mut l_cells = Vec::with_capacity(frame.height());
            for n_idx in 0..frame.height() {
                let value = column
                    .get(n_idx)
                    .map_err(|err| LayoutError::Frame(err.to_string()))?;
                l_cells.push(EnumSeriesItem::Value(convert_any_value(value)));
            }
            l_columns.push((column.name().to_string(), l_cells));
        }
        Self::new(l_columns, options)
    }

    /// Number of cell rows.
    pub fn length(&self) -> usize {
        self.columns.first().map_or(0, |column| column.cells.len())
    }

    /// Replace one attribute on every cell.
    pub fn set_prop(&mut self, prop: &EnumElementProp) -> Result<(), LayoutError> {
        crate::series::validate_prop(prop)?;
        for column in &mut self.columns {
            for elem in &mut column.cells {
                crate::series::assign_prop(elem, prop);
            }
        }
        Ok(())
    }

    /// Replace one attribute per column, positionally across columns.
    pub fn set_prop_each(&mut self, props: &[EnumElementProp]) -> Result<(), LayoutError> {
        validate_list_len("props", props.len(), self.columns.len())?;
        for prop in props {
            crate::series::validate_prop(prop)?;
        }
        for (column, prop) in self.columns.iter_mut().zip(props) {
            for elem in &mut column.cells {
                crate::series::assign_prop(elem, prop);
            }
        }
        Ok(())
    }

    /// Merge a style patch onto every cell.
    pub fn add_style(&mut self, patch: &SpecCellStyle) {
        for column in &mut self.columns {
            for elem in &mut column.cells {
                elem.style = elem.style.merge(patch);
            }
        }
    }

    /// Render at `(x, y)`, optionally drawing the header row.
    pub fn draw_with_names(
        &self,
        x: RowNum,
        y: ColNum,
        ws: &mut Worksheet,
        na_rep: &str,
        draw_names: bool,
        opts: &SpecDrawOptions,
    ) -> Result<(), LayoutError> {
        let mut n_col = y;
        for column in &self.columns {
            let cfg_col = self
                .col_options
                .get(&column.name)
                .cloned()
                .unwrap_or_default();

            let mut l_cells = column.cells.clone();
            for elem in &mut l_cells {
                elem.style = elem.style.merge(&cfg_col.style);
            }

            let name_element = if draw_names {
                Some(Element::new(
                    EnumCellValue::String(column.name.clone()),
                    SpecElementOptions {
                        width: l_cells.iter().map(|elem| elem.width).max().unwrap_or(1),
                        style: self.name_style.merge(&cfg_col.name_style),
                        ..Default::default()
                    },
                )?)
            } else {
                None
            };

            let series = Series::from_elements(
                l_cells,
                name_element,
                &SpecSeriesOptions {
                    horizontal: false,
                    first: cfg_col.first.clone(),
                    last: cfg_col.last.clone(),
                    column_sizing: cfg_col.column_sizing,
                    padding: cfg_col.padding,
                    ..Default::default()
                },
            )?;
            series.draw_with_name(x, n_col, ws, na_rep, draw_names, opts)?;
            n_col += series.extent_width();
        }
        Ok(())
    }
}

impl Drawable for Matrix {
    fn extent_height(&self) -> u32 {
        self.columns
            .iter()
            .map(|column| column.cells.iter().map(|elem| elem.height).sum::<u32>())
            .max()
            .unwrap_or(0)
    }

    fn extent_width(&self) -> ColNum {
        self.columns
            .iter()
            .map(|column| {
                column
                    .cells
                    .iter()
                    .map(|elem| elem.width)
                    .max()
                    .unwrap_or(0)
            })
            .sum()
    }

    fn draw(
        &self,
        x: RowNum,
        y: ColNum,
        ws: &mut Worksheet,
        na_rep: &str,
        opts: &SpecDrawOptions,
    ) -> Result<(), LayoutError> {
        self.draw_with_names(x, y, ws, na_rep, false, opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{EnumColumnSizing, EnumEdgeStyle};
    use polars::prelude::Column;

    fn column_of(values: &[&str]) -> Vec<EnumSeriesItem> {
        values
            .iter()
            .map(|val| EnumSeriesItem::Value(EnumCellValue::from(*val)))
            .collect()
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let result = Matrix::new(
            vec![
                ("a".to_string(), column_of(&["1", "2"])),
                ("b".to_string(), column_of(&["1"])),
            ],
            &SpecMatrixOptions::default(),
        );
        assert!(matches!(result, Err(LayoutError::Configuration(_))));
    }

    #[test]
    fn test_new_rejects_invalid_per_column_sizing() {
        let mut col_options = BTreeMap::new();
        col_options.insert(
            "a".to_string(),
            SpecMatrixColumnOptions {
                column_sizing: EnumColumnSizing::Fixed(0.0),
                ..Default::default()
            },
        );
        let result = Matrix::new(
            vec![("a".to_string(), column_of(&["1"]))],
            &SpecMatrixOptions {
                col_options,
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(LayoutError::Configuration(_))));
    }

    #[test]
    fn test_per_column_options_shape_the_drawn_column() {
        let mut col_options = BTreeMap::new();
        col_options.insert(
            "b".to_string(),
            SpecMatrixColumnOptions {
                style: SpecCellStyle {
                    bold: Some(true),
                    ..Default::default()
                },
                first: EnumEdgeStyle::Border(2),
                ..Default::default()
            },
        );
        let matrix = Matrix::new(
            vec![
                ("a".to_string(), column_of(&["1", "2"])),
                ("b".to_string(), column_of(&["3", "4"])),
            ],
            &SpecMatrixOptions {
                col_options,
                ..Default::default()
            },
        )
        .unwrap();

        let mut ws = Worksheet::new();
        matrix
            .draw_with_names(0, 0, &mut ws, "", true, &SpecDrawOptions::default())
            .unwrap();
    }

    #[test]
    fn test_extents_cover_the_cell_grid() {
        let matrix = Matrix::new(
            vec![
                ("a".to_string(), column_of(&["1", "2", "3"])),
                ("b".to_string(), column_of(&["1", "2", "3"])),
            ],
            &SpecMatrixOptions {
                height: 2,
                width: 3,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(matrix.extent_height(), 6);
        assert_eq!(matrix.extent_width(), 6);
        assert_eq!(matrix.length(), 3);
    }

    #[test]
    fn test_boundary_styling_touches_outermost_cells() {
        let matrix = Matrix::new(
            vec![
                ("a".to_string(), column_of(&["1", "2"])),
                ("b".to_string(), column_of(&["1", "2"])),
            ],
            &SpecMatrixOptions {
                top: EnumEdgeStyle::Border(1),
                bottom: EnumEdgeStyle::Border(2),
                left: EnumEdgeStyle::Border(3),
                right: EnumEdgeStyle::Border(4),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(matrix.columns[0].cells[0].style.top, Some(1));
        assert_eq!(matrix.columns[1].cells[0].style.top, Some(1));
        assert_eq!(matrix.columns[0].cells[1].style.bottom, Some(2));
        assert_eq!(matrix.columns[0].cells[0].style.left, Some(3));
        assert_eq!(matrix.columns[0].cells[1].style.left, Some(3));
        assert_eq!(matrix.columns[1].cells[0].style.right, Some(4));
        assert_eq!(matrix.columns[1].cells[0].style.left, None);
    }

    #[test]
    fn test_from_dataframe_converts_cells() {
        let frame = DataFrame::new(vec![
            Column::new("x".into(), &[1i64, 2]),
            Column::new("y".into(), &["a", "b"]),
        ])
        .unwrap();

        let matrix = Matrix::from_dataframe(&frame, &SpecMatrixOptions::default()).unwrap();
        assert_eq!(matrix.columns.len(), 2);
        assert_eq!(matrix.columns[0].cells[0].value, EnumCellValue::Number(1.0));
        assert_eq!(
            matrix.columns[1].cells[1].value,
            EnumCellValue::String("b".to_string())
        );
    }

    #[test]
    fn test_draw_with_header_row() {
        let matrix = Matrix::new(
            vec![
                ("a".to_string(), column_of(&["1", "2"])),
                ("b".to_string(), column_of(&["3", "4"])),
            ],
            &SpecMatrixOptions::default(),
        )
        .unwrap();

        let mut ws = Worksheet::new();
        matrix
            .draw_with_names(0, 0, &mut ws, "", true, &SpecDrawOptions::default())
            .unwrap();
    }

    #[test]
    fn test_set_prop_each_applies_per_column() {
        let mut matrix = Matrix::new(
            vec![
                ("a".to_string(), column_of(&["1", "2"])),
                ("b".to_string(), column_of(&["3", "4"])),
            ],
            &SpecMatrixOptions::default(),
        )
        .unwrap();

        matrix
            .set_prop_each(&[EnumElementProp::Width(2), EnumElementProp::Width(4)])
            .unwrap();
        assert_eq!(matrix.extent_width(), 6);
    }
}
