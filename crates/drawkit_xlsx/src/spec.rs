//! Shared layout specification models.

use std::collections::BTreeMap;

use rust_xlsxwriter::{ColNum, Format, FormatAlign, FormatBorder, RowNum, Worksheet};
use serde::Deserialize;

use crate::conf::N_PADDING_DEFAULT;
use crate::error::LayoutError;

////////////////////////////////////////////////////////////////////////////////
// #region CellStyleSpecification

/// Cell style specification merged shallowly and converted to a backend format.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct SpecCellStyle {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Top border override.
    pub top: Option<i64>,
    /// Bottom border override.
    pub bottom: Option<i64>,
    /// Left border override.
    pub left: Option<i64>,
    /// Right border override.
    pub right: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellStyle {
    /// Return a new style by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellStyle) -> SpecCellStyle {
        self.merge(&patch)
    }

    /// Merge two styles with right-side non-`None` overwrite semantics.
    ///
    /// This is the one style-merge rule used everywhere in the crate: the
    /// later mapping's keys win, untouched keys pass through.
    pub fn merge(&self, other: &SpecCellStyle) -> SpecCellStyle {
        SpecCellStyle {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            left: other.left.or(self.left),
            right: other.right.or(self.right),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }

    /// Convert the style into a backend format handle.
    ///
    /// `rust_xlsxwriter` registers the format with the workbook implicitly
    /// when the handle is passed to a write call, so this is the whole of the
    /// "register style" step.
    pub fn to_format(&self) -> Format {
        let mut format = Format::new();

        if let Some(val) = &self.font_name {
            format = format.set_font_name(val.clone());
        }
        if let Some(val) = self.font_size {
            format = format.set_font_size(val as f64);
        }
        if self.bold.unwrap_or(false) {
            format = format.set_bold();
        }
        if self.italic.unwrap_or(false) {
            format = format.set_italic();
        }

        if let Some(val) = &self.align
            && let Some(align) = derive_format_align(val)
        {
            format = format.set_align(align);
        }
        if let Some(val) = &self.valign
            && let Some(align) = derive_format_align(val)
        {
            format = format.set_align(align);
        }

        if let Some(val) = &self.num_format {
            format = format.set_num_format(val.clone());
        }
        if let Some(val) = &self.bg_color {
            format = format.set_background_color(val.as_str());
        }
        if let Some(val) = &self.font_color {
            format = format.set_font_color(val.as_str());
        }

        if let Some(val) = self.border {
            format = format.set_border(derive_format_border(val));
        }
        if let Some(val) = self.top {
            format = format.set_border_top(derive_format_border(val));
        }
        if let Some(val) = self.bottom {
            format = format.set_border_bottom(derive_format_border(val));
        }
        if let Some(val) = self.left {
            format = format.set_border_left(derive_format_border(val));
        }
        if let Some(val) = self.right {
            format = format.set_border_right(derive_format_border(val));
        }

        if self.text_wrap.unwrap_or(false) {
            format = format.set_text_wrap();
        }

        format
    }
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        0 => FormatBorder::None,
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        8 => FormatBorder::MediumDashed,
        9 => FormatBorder::DashDot,
        10 => FormatBorder::MediumDashDot,
        11 => FormatBorder::DashDotDot,
        12 => FormatBorder::MediumDashDotDot,
        13 => FormatBorder::SlantDashDot,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "fill" => Some(FormatAlign::Fill),
        "justify" => Some(FormatAlign::Justify),
        "center_across" => Some(FormatAlign::CenterAcross),
        "distributed" => Some(FormatAlign::Distributed),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        "vjustify" | "vertical_justify" => Some(FormatAlign::VerticalJustify),
        "vdistributed" | "vertical_distributed" => Some(FormatAlign::VerticalDistributed),
        _ => None,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValueSpecification

/// One fragment of a rich-text cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumRichSpan {
    /// Literal text fragment.
    Text(String),
    /// Style patch applied (merged over the element's base style) to the
    /// text fragment that follows it.
    StylePatch(SpecCellStyle),
}

/// Cell value rendered by an element.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing value; rendered as the drawer's `na_rep` string.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Bool(bool),
    /// Rich-text value: style patches interleaved with text fragments.
    Rich(Vec<EnumRichSpan>),
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        EnumCellValue::String(value.to_string())
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        EnumCellValue::Number(value)
    }
}

/// Backend write primitive selected by an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumWriteOp {
    /// Generic write dispatched on the value kind (default).
    #[default]
    Write,
    /// Force text write of the stringified value.
    Text,
    /// Numeric write; the value must be a number.
    Number,
    /// Boolean write; the value must be a boolean.
    Boolean,
    /// Formula write; the value must be a formula string.
    Formula,
    /// Rich-text write for `EnumCellValue::Rich` values.
    RichText,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SizingAndEdgeSpecification

/// Column sizing behavior applied after an element or series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EnumColumnSizing {
    /// Leave column widths untouched (default).
    #[default]
    None,
    /// Total width over the spanned columns; must be `> 0`.
    Fixed(f64),
    /// Infer width from the value's text length plus padding.
    Auto,
}

/// Extra styling for a boundary element of a series or matrix.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumEdgeStyle {
    /// No boundary styling (default).
    #[default]
    None,
    /// Border style value applied to the edge-facing side.
    Border(i64),
    /// Arbitrary style patch merged onto the boundary cell style.
    Patch(SpecCellStyle),
}

/// Side of a cell an edge style is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumEdgeSide {
    /// Top border side.
    Top,
    /// Bottom border side.
    Bottom,
    /// Left border side.
    Left,
    /// Right border side.
    Right,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DrawOptions

/// Cell note (comment) parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct SpecNoteOptions {
    /// Note author shown in the note header.
    pub author: Option<String>,
    /// Note box width in pixels.
    pub width: Option<u32>,
    /// Note box height in pixels.
    pub height: Option<u32>,
}

/// Per-call draw overrides, merged over an element's stored write args.
///
/// Built fresh for every call; never shared between draws.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecDrawOptions {
    /// Style patch merged over the element style at draw time.
    pub style_patch: Option<SpecCellStyle>,
}

impl SpecDrawOptions {
    /// Overlay per-call overrides onto stored write args; overrides win.
    pub fn merged_over(&self, base: &SpecDrawOptions) -> SpecDrawOptions {
        let style_patch = match (&base.style_patch, &self.style_patch) {
            (Some(stored), Some(call)) => Some(stored.merge(call)),
            (Some(stored), None) => Some(stored.clone()),
            (None, call) => call.clone(),
        };
        SpecDrawOptions { style_patch }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ConstructorOptions

/// Element constructor options.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecElementOptions {
    /// Height in grid cells; `>= 1`.
    pub height: u32,
    /// Width in grid cells; `>= 1`.
    pub width: ColNum,
    /// Base style.
    pub style: SpecCellStyle,
    /// Optional note text.
    pub note: Option<String>,
    /// Note parameters.
    pub note_options: SpecNoteOptions,
    /// Write primitive selector.
    pub write_op: EnumWriteOp,
    /// Stored write args merged with per-call overrides.
    pub write_args: SpecDrawOptions,
    /// Column sizing behavior.
    pub column_sizing: EnumColumnSizing,
    /// Padding per side for auto sizing; `>= 0`.
    pub padding: f64,
}

impl Default for SpecElementOptions {
    fn default() -> Self {
        Self {
            height: 1,
            width: 1,
            style: SpecCellStyle::default(),
            note: None,
            note_options: SpecNoteOptions::default(),
            write_op: EnumWriteOp::Write,
            write_args: SpecDrawOptions::default(),
            column_sizing: EnumColumnSizing::None,
            padding: N_PADDING_DEFAULT,
        }
    }
}

/// Series constructor options.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSeriesOptions {
    /// Lay members out horizontally instead of vertically.
    pub horizontal: bool,
    /// Shared member height.
    pub height: u32,
    /// Shared member width.
    pub width: ColNum,
    /// Base style applied to every wrapped member.
    pub style: SpecCellStyle,
    /// Extra styling for the first member.
    pub first: EnumEdgeStyle,
    /// Extra styling for the last member.
    pub last: EnumEdgeStyle,
    /// Write primitive for wrapped members.
    pub write_op: EnumWriteOp,
    /// Stored write args for wrapped members.
    pub write_args: SpecDrawOptions,
    /// Series-level column/row sizing applied after drawing.
    pub column_sizing: EnumColumnSizing,
    /// Padding per side for auto sizing.
    pub padding: f64,
    /// Style patch for the leading name element.
    pub name_style: SpecCellStyle,
}

impl Default for SpecSeriesOptions {
    fn default() -> Self {
        Self {
            horizontal: false,
            height: 1,
            width: 1,
            style: SpecCellStyle::default(),
            first: EnumEdgeStyle::None,
            last: EnumEdgeStyle::None,
            write_op: EnumWriteOp::Write,
            write_args: SpecDrawOptions::default(),
            column_sizing: EnumColumnSizing::None,
            padding: N_PADDING_DEFAULT,
            name_style: SpecCellStyle::default(),
        }
    }
}

/// Matrix constructor options.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecMatrixOptions {
    /// Shared cell height.
    pub height: u32,
    /// Shared cell width.
    pub width: ColNum,
    /// Base style applied to every wrapped cell.
    pub style: SpecCellStyle,
    /// Extra styling for the top row.
    pub top: EnumEdgeStyle,
    /// Extra styling for the bottom row.
    pub bottom: EnumEdgeStyle,
    /// Extra styling for the leftmost column.
    pub left: EnumEdgeStyle,
    /// Extra styling for the rightmost column.
    pub right: EnumEdgeStyle,
    /// Write primitive for wrapped cells.
    pub write_op: EnumWriteOp,
    /// Stored write args for wrapped cells.
    pub write_args: SpecDrawOptions,
    /// Style patch for column name headers.
    pub name_style: SpecCellStyle,
    /// Per-column overrides, keyed by column name.
    pub col_options: BTreeMap<String, SpecMatrixColumnOptions>,
}

impl Default for SpecMatrixOptions {
    fn default() -> Self {
        Self {
            height: 1,
            width: 1,
            style: SpecCellStyle::default(),
            top: EnumEdgeStyle::None,
            bottom: EnumEdgeStyle::None,
            left: EnumEdgeStyle::None,
            right: EnumEdgeStyle::None,
            write_op: EnumWriteOp::Write,
            write_args: SpecDrawOptions::default(),
            name_style: SpecCellStyle::default(),
            col_options: BTreeMap::new(),
        }
    }
}

/// Per-column overrides of a matrix, applied when the column is drawn.
///
/// Cells are wrapped at construction time, so only draw-time concerns are
/// overridable here.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecMatrixColumnOptions {
    /// Style patch merged onto every cell of the column.
    pub style: SpecCellStyle,
    /// Style patch merged over the matrix-level name style.
    pub name_style: SpecCellStyle,
    /// Extra styling for the column's first cell.
    pub first: EnumEdgeStyle,
    /// Extra styling for the column's last cell.
    pub last: EnumEdgeStyle,
    /// Column sizing applied after the column is drawn.
    pub column_sizing: EnumColumnSizing,
    /// Padding per side for auto sizing.
    pub padding: f64,
}

impl Default for SpecMatrixColumnOptions {
    fn default() -> Self {
        Self {
            style: SpecCellStyle::default(),
            name_style: SpecCellStyle::default(),
            first: EnumEdgeStyle::None,
            last: EnumEdgeStyle::None,
            column_sizing: EnumColumnSizing::None,
            padding: N_PADDING_DEFAULT,
        }
    }
}

/// Dictionary constructor options.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecDictionaryOptions {
    /// Horizontal spacing between the key column and the value column.
    pub hspace: ColNum,
    /// Vertical spacing appended after each entry.
    pub vspace: u32,
    /// Base style for key elements.
    pub keys_style: SpecCellStyle,
    /// Base style for value elements.
    pub values_style: SpecCellStyle,
    /// Context mapping visible to deferred expressions.
    pub context: BTreeMap<String, EnumCellValue>,
}

impl Default for SpecDictionaryOptions {
    fn default() -> Self {
        Self {
            hspace: 1,
            vspace: 0,
            keys_style: SpecCellStyle::default(),
            values_style: SpecCellStyle::default(),
            context: BTreeMap::new(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructureFileSpecification

/// Scalar value as read from a structure-config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumFieldScalar {
    /// JSON null; rendered as a missing value.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Numeric scalar.
    Number(f64),
    /// Text scalar; may carry the deferred-expression marker.
    Text(String),
}

impl EnumFieldScalar {
    /// Convert the config scalar into a cell value.
    pub fn to_cell_value(&self) -> EnumCellValue {
        match self {
            EnumFieldScalar::Null => EnumCellValue::None,
            EnumFieldScalar::Bool(val) => EnumCellValue::Bool(*val),
            EnumFieldScalar::Number(val) => EnumCellValue::Number(*val),
            EnumFieldScalar::Text(val) => EnumCellValue::String(val.clone()),
        }
    }
}

/// Scalar-or-list value of a dictionary field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumFieldValue {
    /// Multi-valued field; members are stacked vertically at draw time.
    List(Vec<EnumFieldScalar>),
    /// Single-valued field.
    Scalar(EnumFieldScalar),
}

/// Key or value field of a dictionary entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpecFieldSpec {
    /// Field value (scalar, or list of scalars for value fields).
    pub value: EnumFieldValue,
    /// Style patch merged over the dictionary-level base style.
    #[serde(default)]
    pub style: SpecCellStyle,
    /// Element height; defaults to 1.
    #[serde(default)]
    pub height: Option<u32>,
    /// Element width; defaults to 1.
    #[serde(default)]
    pub width: Option<ColNum>,
    /// Optional note text attached to the element.
    #[serde(default)]
    pub note: Option<String>,
}

/// One key/value entry of a dictionary structure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpecDictEntry {
    /// Key field spec.
    pub key: SpecFieldSpec,
    /// Value field spec.
    pub value: SpecFieldSpec,
    /// Per-entry horizontal spacing override.
    #[serde(default)]
    pub hspace: Option<ColNum>,
    /// Per-entry vertical spacing override.
    #[serde(default)]
    pub vspace: Option<u32>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region BulkPropertySpecification

/// Closed set of element attributes assignable in bulk over a container.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumElementProp {
    /// Replace element height; `>= 1`.
    Height(u32),
    /// Replace element width; `>= 1`.
    Width(ColNum),
    /// Replace the whole element style.
    Style(SpecCellStyle),
    /// Replace column sizing behavior.
    ColumnSizing(EnumColumnSizing),
    /// Replace auto-sizing padding; `>= 0`.
    Padding(f64),
    /// Replace the note text.
    Note(Option<String>),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DrawableContract

/// Anything the drawer can place on a worksheet.
///
/// The variant set is closed: elements, series, matrices and dictionaries.
/// Extents are queried before drawing so the drawer can record them into its
/// bounded history.
pub trait Drawable {
    /// Total height in grid cells (name/header elements excluded).
    fn extent_height(&self) -> u32;

    /// Total width in grid cells (name/header elements excluded).
    fn extent_width(&self) -> ColNum;

    /// Render at `(x, y)` on `ws`, using `na_rep` for missing values.
    fn draw(
        &self,
        x: RowNum,
        y: ColNum,
        ws: &mut Worksheet,
        na_rep: &str,
        opts: &SpecDrawOptions,
    ) -> Result<(), LayoutError>;
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
