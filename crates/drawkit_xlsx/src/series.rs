//! One-dimensional run of elements laid out vertically or horizontally.

use polars::prelude::Series as PolarsSeries;
use rust_xlsxwriter::{ColNum, RowNum, Worksheet};

use crate::element::{Element, validate_sizing};
use crate::error::LayoutError;
use crate::spec::{
    Drawable, EnumCellValue, EnumColumnSizing, EnumEdgeSide, EnumElementProp, EnumFieldValue,
    EnumWriteOp, SpecCellStyle, SpecDrawOptions, SpecElementOptions, SpecFieldSpec,
    SpecSeriesOptions,
};
use crate::util::{apply_edge_style, convert_any_value, validate_extent, validate_list_len};

/// Input member of a series: a bare value wrapped with the shared series
/// options, a pre-built element kept as-is, or a field spec carrying its own
/// construction arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumSeriesItem {
    /// Bare value; wrapped into an element with the series options.
    Value(EnumCellValue),
    /// Pre-built element; adopted without re-wrapping.
    Element(Element),
    /// Field spec; element construction arguments, its style patch merged
    /// over the container base style. The value must be scalar.
    Spec(SpecFieldSpec),
}

impl EnumSeriesItem {
    /// Wrap the member into an element using the container defaults.
    pub(crate) fn into_element(
        self,
        height: u32,
        width: ColNum,
        style: &SpecCellStyle,
        write_op: EnumWriteOp,
        write_args: &SpecDrawOptions,
    ) -> Result<Element, LayoutError> {
        match self {
            EnumSeriesItem::Element(elem) => Ok(elem),
            EnumSeriesItem::Value(value) => Element::new(
                value,
                SpecElementOptions {
                    height,
                    width,
                    style: style.clone(),
                    write_op,
                    write_args: write_args.clone(),
                    ..Default::default()
                },
            ),
            EnumSeriesItem::Spec(spec) => match &spec.value {
                EnumFieldValue::Scalar(scalar) => {
                    Element::from_field_spec(&spec, scalar.to_cell_value(), style)
                }
                EnumFieldValue::List(_) => Err(LayoutError::Configuration(
                    "field-spec members must carry a scalar value.".to_string(),
                )),
            },
        }
    }
}

/// Ordered run of elements sharing layout defaults.
///
/// Members are stacked vertically by default; `horizontal` lays them out
/// left to right instead. The optional name element leads the run and is
/// excluded from the reported extents.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Member elements in draw order.
    pub items: Vec<Element>,
    /// Leading name element, drawn before the members when requested.
    pub name_element: Option<Element>,
    /// Horizontal layout flag.
    pub horizontal: bool,
    /// Series-level sizing applied over the whole span after drawing.
    pub column_sizing: EnumColumnSizing,
    /// Padding per side for series-level auto sizing.
    pub padding: f64,
}

impl Series {
    /// Create a series by wrapping `items` with the shared options.
    ///
    /// Boundary styling (`first`/`last`) is merged onto the outermost
    /// members; a single-member series receives both.
    pub fn new(
        items: Vec<EnumSeriesItem>,
        name: Option<EnumCellValue>,
        options: &SpecSeriesOptions,
    ) -> Result<Self, LayoutError> {
        let l_items = items
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

        let name_element = match name {
            Some(value) => Some(Element::new(
                value,
                SpecElementOptions {
                    height: options.height,
                    width: options.width,
                    style: options.style.merge(&options.name_style),
                    ..Default::default()
                },
            )?),
            None => None,
        };

        Self::from_elements(l_items, name_element, options)
    }

    /// Create a series from pre-built elements, applying boundary styling
    /// and the series-level sizing options only.
    pub fn from_elements(
        mut items: Vec<Element>,
        name_element: Option<Element>,
        options: &SpecSeriesOptions,
    ) -> Result<Self, LayoutError> {
        validate_sizing(&options.column_sizing, options.padding)?;

        let (side_first, side_last) = if options.horizontal {
            (EnumEdgeSide::Left, EnumEdgeSide::Right)
        } else {
            (EnumEdgeSide::Top, EnumEdgeSide::Bottom)
        };
        if let Some(elem) = items.first_mut() {
            elem.style = apply_edge_style(&elem.style, &options.first, side_first);
        }
        if let Some(elem) = items.last_mut() {
            elem.style = apply_edge_style(&elem.style, &options.last, side_last);
        }

        Ok(Self {
            items,
            name_element,
            horizontal: options.horizontal,
            column_sizing: options.column_sizing,
            padding: options.padding,
        })
    }

    /// Create a series from a polars series, one element per row.
    ///
    /// Null rows become missing values; the column name becomes the series
    /// name.
    pub fn from_polars(
        series: &PolarsSeries,
        options: &SpecSeriesOptions,
    ) -> Result<Self, LayoutError> {
        let mut l_items = Vec::with_capacity(series.len());
        for n_idx in 0..series.len() {
            let value = series
                .get(n_idx)
                .map_err(|err| LayoutError::Frame(err.to_string()))?;
            l_items.push(EnumSeriesItem::Value(convert_any_value(value)));
        }

        let name = Some(EnumCellValue::String(series.name().to_string()));
        Self::new(l_items, name, options)
    }

    /// Number of member elements.
    pub fn length(&self) -> usize {
        self.items.len()
    }

    /// Replace one attribute on every member element.
    pub fn set_prop(&mut self, prop: &EnumElementProp) -> Result<(), LayoutError> {
        validate_prop(prop)?;
        for elem in &mut self.items {
            assign_prop(elem, prop);
        }
        Ok(())
    }

    /// Replace one attribute per member element, positionally.
    pub fn set_prop_each(&mut self, props: &[EnumElementProp]) -> Result<(), LayoutError> {
        validate_list_len("props", props.len(), self.items.len())?;
        for prop in props {
            validate_prop(prop)?;
        }
        for (elem, prop) in self.items.iter_mut().zip(props) {
            assign_prop(elem, prop);
        }
        Ok(())
    }

    /// Merge a style patch onto every member element.
    pub fn add_style(&mut self, patch: &SpecCellStyle) {
        for elem in &mut self.items {
            elem.style = elem.style.merge(patch);
        }
    }

    /// Merge one style patch per member element, positionally.
    pub fn add_style_each(&mut self, patches: &[SpecCellStyle]) -> Result<(), LayoutError> {
        validate_list_len("patches", patches.len(), self.items.len())?;
        for (elem, patch) in self.items.iter_mut().zip(patches) {
            elem.style = elem.style.merge(patch);
        }
        Ok(())
    }

    /// Render at `(x, y)`, optionally drawing the leading name element.
    pub fn draw_with_name(
        &self,
        x: RowNum,
        y: ColNum,
        ws: &mut Worksheet,
        na_rep: &str,
        draw_name: bool,
        opts: &SpecDrawOptions,
    ) -> Result<(), LayoutError> {
        let mut n_row = x;
        let mut n_col = y;

        if draw_name && let Some(name) = &self.name_element {
            name.draw(n_row, n_col, ws, na_rep, opts)?;
            if self.horizontal {
                n_col += name.width;
            } else {
                n_row += name.height;
            }
        }

        let (n_row_members, n_col_members) = (n_row, n_col);
        for elem in &self.items {
            elem.draw(n_row, n_col, ws, na_rep, opts)?;
            if self.horizontal {
                n_col += elem.width;
            } else {
                n_row += elem.height;
            }
        }

        self.apply_span_sizing(n_row_members, n_col_members, ws)?;
        Ok(())
    }

    fn apply_span_sizing(
        &self,
        x: RowNum,
        y: ColNum,
        ws: &mut Worksheet,
    ) -> Result<(), LayoutError> {
        if self.items.is_empty() {
            return Ok(());
        }

        match (self.horizontal, self.column_sizing) {
            (_, EnumColumnSizing::None) => {}
            (false, EnumColumnSizing::Fixed(val)) => {
                let n_width = self.extent_width();
                for n_idx_col in 0..n_width {
                    ws.set_column_width(y + n_idx_col, val / f64::from(n_width))?;
                }
            }
            (false, EnumColumnSizing::Auto) => {
                let mut n_len_max = 0usize;
                for elem in &self.items {
                    match elem.value_text_len() {
                        Some(n_len) => n_len_max = n_len_max.max(n_len),
                        None => {
                            log::warn!("auto column sizing skipped: a member has no text length");
                            return Ok(());
                        }
                    }
                }
                let n_width = self.extent_width();
                let n_width_total =
                    (n_len_max as f64 + self.padding * 2.0) / f64::from(n_width);
                for n_idx_col in 0..n_width {
                    ws.set_column_width(y + n_idx_col, n_width_total / f64::from(n_width))?;
                }
            }
            (true, EnumColumnSizing::Fixed(val)) => {
                let n_height = self.extent_height();
                for n_idx_row in 0..n_height {
                    ws.set_row_height(x + n_idx_row, val / f64::from(n_height))?;
                }
            }
            // Auto sizing has no row-height analogue; horizontal runs skip it.
            (true, EnumColumnSizing::Auto) => {}
        }
        Ok(())
    }
}

impl Drawable for Series {
    fn extent_height(&self) -> u32 {
        if self.horizontal {
            self.items.iter().map(|elem| elem.height).max().unwrap_or(0)
        } else {
            self.items.iter().map(|elem| elem.height).sum()
        }
    }

    fn extent_width(&self) -> ColNum {
        if self.horizontal {
            self.items.iter().map(|elem| elem.width).sum()
        } else {
            self.items.iter().map(|elem| elem.width).max().unwrap_or(0)
        }
    }

    fn draw(
        &self,
        x: RowNum,
        y: ColNum,
        ws: &mut Worksheet,
        na_rep: &str,
        opts: &SpecDrawOptions,
    ) -> Result<(), LayoutError> {
        self.draw_with_name(x, y, ws, na_rep, true, opts)
    }
}

pub(crate) fn validate_prop(prop: &EnumElementProp) -> Result<(), LayoutError> {
    match prop {
        EnumElementProp::Height(val) => validate_extent("height", u64::from(*val)),
        EnumElementProp::Width(val) => validate_extent("width", u64::from(*val)),
        EnumElementProp::Padding(val) if *val < 0.0 => Err(LayoutError::Configuration(
            "padding must be >= 0.".to_string(),
        )),
        _ => Ok(()),
    }
}

pub(crate) fn assign_prop(elem: &mut Element, prop: &EnumElementProp) {
    match prop {
        EnumElementProp::Height(val) => elem.height = *val,
        EnumElementProp::Width(val) => elem.width = *val,
        EnumElementProp::Style(val) => elem.style = val.clone(),
        EnumElementProp::ColumnSizing(val) => elem.column_sizing = *val,
        EnumElementProp::Padding(val) => elem.padding = *val,
        EnumElementProp::Note(val) => elem.note = val.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{EnumEdgeStyle, EnumFieldScalar};
    use polars::prelude::NamedFrom;

    fn series_of(values: &[&str], options: &SpecSeriesOptions) -> Series {
        let l_items = values
            .iter()
            .map(|val| EnumSeriesItem::Value(EnumCellValue::from(*val)))
            .collect();
        Series::new(l_items, None, options).unwrap()
    }

    #[test]
    fn test_vertical_extents_stack_heights() {
        let series = series_of(
            &["a", "b", "c"],
            &SpecSeriesOptions {
                height: 2,
                width: 3,
                ..Default::default()
            },
        );
        assert_eq!(series.extent_height(), 6);
        assert_eq!(series.extent_width(), 3);
    }

    #[test]
    fn test_horizontal_extents_stack_widths() {
        let series = series_of(
            &["a", "b", "c"],
            &SpecSeriesOptions {
                horizontal: true,
                height: 2,
                width: 3,
                ..Default::default()
            },
        );
        assert_eq!(series.extent_height(), 2);
        assert_eq!(series.extent_width(), 9);
    }

    #[test]
    fn test_edge_styling_touches_outermost_members() {
        let series = series_of(
            &["a", "b", "c"],
            &SpecSeriesOptions {
                first: EnumEdgeStyle::Border(2),
                last: EnumEdgeStyle::Border(5),
                ..Default::default()
            },
        );
        assert_eq!(series.items[0].style.top, Some(2));
        assert_eq!(series.items[1].style.top, None);
        assert_eq!(series.items[1].style.bottom, None);
        assert_eq!(series.items[2].style.bottom, Some(5));
    }

    #[test]
    fn test_horizontal_edge_styling_uses_left_and_right() {
        let series = series_of(
            &["a", "b"],
            &SpecSeriesOptions {
                horizontal: true,
                first: EnumEdgeStyle::Border(1),
                last: EnumEdgeStyle::Border(1),
                ..Default::default()
            },
        );
        assert_eq!(series.items[0].style.left, Some(1));
        assert_eq!(series.items[1].style.right, Some(1));
    }

    #[test]
    fn test_field_spec_members_merge_over_the_base_style() {
        let spec = SpecFieldSpec {
            value: EnumFieldValue::Scalar(EnumFieldScalar::Text("t".to_string())),
            style: SpecCellStyle {
                bold: Some(true),
                ..Default::default()
            },
            height: Some(2),
            width: None,
            note: None,
        };
        let series = Series::new(
            vec![EnumSeriesItem::Spec(spec)],
            None,
            &SpecSeriesOptions {
                style: SpecCellStyle {
                    bold: Some(false),
                    italic: Some(true),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(series.items[0].value, EnumCellValue::String("t".to_string()));
        assert_eq!(series.items[0].style.bold, Some(true));
        assert_eq!(series.items[0].style.italic, Some(true));
        assert_eq!(series.items[0].height, 2);
    }

    #[test]
    fn test_field_spec_members_reject_list_values() {
        let spec = SpecFieldSpec {
            value: EnumFieldValue::List(vec![EnumFieldScalar::Number(1.0)]),
            style: SpecCellStyle::default(),
            height: None,
            width: None,
            note: None,
        };
        let result = Series::new(
            vec![EnumSeriesItem::Spec(spec)],
            None,
            &SpecSeriesOptions::default(),
        );
        assert!(matches!(result, Err(LayoutError::Configuration(_))));
    }

    #[test]
    fn test_from_polars_converts_rows_and_name() {
        let source = PolarsSeries::new("score".into(), &[1i64, 2, 3]);
        let series = Series::from_polars(&source, &SpecSeriesOptions::default()).unwrap();
        assert_eq!(series.length(), 3);
        assert_eq!(series.items[0].value, EnumCellValue::Number(1.0));
        assert_eq!(
            series.name_element.as_ref().unwrap().value,
            EnumCellValue::String("score".to_string())
        );
    }

    #[test]
    fn test_set_prop_each_rejects_length_mismatch() {
        let mut series = series_of(&["a", "b"], &SpecSeriesOptions::default());
        let result = series.set_prop_each(&[EnumElementProp::Height(2)]);
        assert!(matches!(result, Err(LayoutError::Configuration(_))));
    }

    #[test]
    fn test_set_prop_applies_to_every_member() {
        let mut series = series_of(&["a", "b"], &SpecSeriesOptions::default());
        series.set_prop(&EnumElementProp::Height(3)).unwrap();
        assert!(series.items.iter().all(|elem| elem.height == 3));
        assert_eq!(series.extent_height(), 6);
    }

    #[test]
    fn test_draw_advances_along_the_layout_axis() {
        let series = series_of(
            &["a", "b", "c"],
            &SpecSeriesOptions {
                horizontal: true,
                ..Default::default()
            },
        );
        let mut ws = Worksheet::new();
        series
            .draw(0, 0, &mut ws, "", &SpecDrawOptions::default())
            .unwrap();
    }

    #[test]
    fn test_auto_sizing_with_missing_member_is_a_silent_no_op() {
        let series = Series::new(
            vec![
                EnumSeriesItem::Value(EnumCellValue::from("abc")),
                EnumSeriesItem::Value(EnumCellValue::None),
            ],
            None,
            &SpecSeriesOptions {
                column_sizing: EnumColumnSizing::Auto,
                ..Default::default()
            },
        )
        .unwrap();

        let mut ws = Worksheet::new();
        series
            .draw(0, 0, &mut ws, "", &SpecDrawOptions::default())
            .unwrap();
    }
}
