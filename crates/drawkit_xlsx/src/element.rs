//! Atomic report element: one value drawn at one grid position.

use rust_xlsxwriter::{ColNum, Format, Formula, Note, RowNum, Worksheet};

use crate::error::LayoutError;
use crate::spec::{
    Drawable, EnumCellValue, EnumColumnSizing, EnumRichSpan, EnumWriteOp, SpecCellStyle,
    SpecDrawOptions, SpecElementOptions, SpecFieldSpec, SpecNoteOptions,
};
use crate::util::{coords_to_xl, derive_value_text, derive_value_text_len, validate_extent};

/// Atomic drawable unit.
///
/// If `height` or `width` is greater than 1, the covered cells are merged
/// (counting from the upper-left corner) before the value is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Value written into the cell.
    pub value: EnumCellValue,
    /// Height in grid cells; `>= 1`.
    pub height: u32,
    /// Width in grid cells; `>= 1`.
    pub width: ColNum,
    /// Style definition.
    pub style: SpecCellStyle,
    /// Optional note text attached at the upper-left corner.
    pub note: Option<String>,
    /// Note parameters.
    pub note_options: SpecNoteOptions,
    /// Backend write primitive selector.
    pub write_op: EnumWriteOp,
    /// Stored write args; per-call overrides win over these.
    pub write_args: SpecDrawOptions,
    /// Column sizing applied after the value is written.
    pub column_sizing: EnumColumnSizing,
    /// Padding per side used by auto sizing; `>= 0`.
    pub padding: f64,
}

impl Element {
    /// Create an element, validating geometry and sizing options.
    pub fn new(value: EnumCellValue, options: SpecElementOptions) -> Result<Self, LayoutError> {
        validate_extent("height", u64::from(options.height))?;
        validate_extent("width", u64::from(options.width))?;
        validate_sizing(&options.column_sizing, options.padding)?;

        Ok(Self {
            value,
            height: options.height,
            width: options.width,
            style: options.style,
            note: options.note,
            note_options: options.note_options,
            write_op: options.write_op,
            write_args: options.write_args,
            column_sizing: options.column_sizing,
            padding: options.padding,
        })
    }

    /// Create a 1x1 element with default options.
    pub fn from_value(value: EnumCellValue) -> Self {
        Self {
            value,
            height: 1,
            width: 1,
            style: SpecCellStyle::default(),
            note: None,
            note_options: SpecNoteOptions::default(),
            write_op: EnumWriteOp::Write,
            write_args: SpecDrawOptions::default(),
            column_sizing: EnumColumnSizing::None,
            padding: crate::conf::N_PADDING_DEFAULT,
        }
    }

    /// Build an element from a structure-file field spec with a resolved value.
    ///
    /// `base_style` is the container-level default; the field's own style
    /// patch wins on conflicting keys.
    pub fn from_field_spec(
        spec: &SpecFieldSpec,
        value: EnumCellValue,
        base_style: &SpecCellStyle,
    ) -> Result<Self, LayoutError> {
        Element::new(
            value,
            SpecElementOptions {
                height: spec.height.unwrap_or(1),
                width: spec.width.unwrap_or(1),
                style: base_style.merge(&spec.style),
                note: spec.note.clone(),
                ..Default::default()
            },
        )
    }

    /// Upper-left corner address in A1 notation.
    pub fn xl_upleft(&self, x: RowNum, y: ColNum) -> String {
        coords_to_xl(x, y)
    }

    /// Lower-right corner address in A1 notation.
    pub fn xl_loright(&self, x: RowNum, y: ColNum) -> String {
        coords_to_xl(x + self.height - 1, y + self.width - 1)
    }

    /// Bounding range covered by the element in A1 notation.
    pub fn xl_range(&self, x: RowNum, y: ColNum) -> String {
        format!("{}:{}", self.xl_upleft(x, y), self.xl_loright(x, y))
    }

    /// Text length of the value; `None` when unmeasurable.
    pub fn value_text_len(&self) -> Option<usize> {
        derive_value_text_len(&self.value)
    }

    fn resolved_style(&self, opts: &SpecDrawOptions) -> SpecCellStyle {
        let args = opts.merged_over(&self.write_args);
        match &args.style_patch {
            Some(patch) => self.style.merge(patch),
            None => self.style.clone(),
        }
    }

    fn write_value(
        &self,
        x: RowNum,
        y: ColNum,
        ws: &mut Worksheet,
        na_rep: &str,
        style: &SpecCellStyle,
        format: &Format,
    ) -> Result<(), LayoutError> {
        // Rich-text writes fall back to the generic path for plain values.
        match (&self.write_op, &self.value) {
            (EnumWriteOp::Write | EnumWriteOp::RichText, EnumCellValue::Rich(spans)) => {
                self.write_rich(x, y, ws, spans, style)?;
            }
            (EnumWriteOp::Write | EnumWriteOp::RichText, EnumCellValue::None) => {
                write_missing(ws, x, y, na_rep, format)?;
            }
            (EnumWriteOp::Write | EnumWriteOp::RichText, EnumCellValue::String(val)) => {
                ws.write_string_with_format(x, y, val, format)?;
            }
            (EnumWriteOp::Write | EnumWriteOp::RichText, EnumCellValue::Number(val)) => {
                ws.write_number_with_format(x, y, *val, format)?;
            }
            (EnumWriteOp::Write | EnumWriteOp::RichText, EnumCellValue::Bool(val)) => {
                ws.write_boolean_with_format(x, y, *val, format)?;
            }
            (EnumWriteOp::Text, value) => {
                ws.write_string_with_format(x, y, derive_value_text(value, na_rep), format)?;
            }
            (EnumWriteOp::Number, EnumCellValue::Number(val)) => {
                ws.write_number_with_format(x, y, *val, format)?;
            }
            (EnumWriteOp::Boolean, EnumCellValue::Bool(val)) => {
                ws.write_boolean_with_format(x, y, *val, format)?;
            }
            (EnumWriteOp::Formula, EnumCellValue::String(val)) => {
                ws.write_formula_with_format(x, y, Formula::new(val.as_str()), format)?;
            }
            (op, value) => {
                return Err(LayoutError::Configuration(format!(
                    "write op {op:?} is not applicable to value {value:?}."
                )));
            }
        }
        Ok(())
    }

    fn write_rich(
        &self,
        x: RowNum,
        y: ColNum,
        ws: &mut Worksheet,
        spans: &[EnumRichSpan],
        style: &SpecCellStyle,
    ) -> Result<(), LayoutError> {
        let fmt_base = style.to_format();
        let mut fmt_pending = fmt_base.clone();
        let mut l_fragments: Vec<(Format, String)> = Vec::new();

        for span in spans {
            match span {
                EnumRichSpan::StylePatch(patch) => {
                    fmt_pending = style.merge(patch).to_format();
                }
                EnumRichSpan::Text(text) => {
                    l_fragments.push((fmt_pending.clone(), text.clone()));
                    fmt_pending = fmt_base.clone();
                }
            }
        }

        if l_fragments.is_empty() {
            return Err(LayoutError::Configuration(
                "rich-text value carries no text fragments.".to_string(),
            ));
        }

        let l_refs: Vec<(&Format, &str)> = l_fragments
            .iter()
            .map(|(fmt, text)| (fmt, text.as_str()))
            .collect();
        ws.write_rich_string(x, y, &l_refs)?;
        Ok(())
    }

    fn apply_column_sizing(&self, y: ColNum, ws: &mut Worksheet) -> Result<(), LayoutError> {
        let n_width_total = match self.column_sizing {
            EnumColumnSizing::None => return Ok(()),
            EnumColumnSizing::Fixed(val) => val,
            EnumColumnSizing::Auto => match self.value_text_len() {
                Some(n_len) => (n_len as f64 + self.padding * 2.0) / f64::from(self.width),
                None => {
                    log::warn!("auto column sizing skipped: value has no text length");
                    return Ok(());
                }
            },
        };

        let n_width_per_col = n_width_total / f64::from(self.width);
        for n_idx_col in 0..self.width {
            ws.set_column_width(y + n_idx_col, n_width_per_col)?;
        }
        Ok(())
    }
}

impl Drawable for Element {
    fn extent_height(&self) -> u32 {
        self.height
    }

    fn extent_width(&self) -> ColNum {
        self.width
    }

    fn draw(
        &self,
        x: RowNum,
        y: ColNum,
        ws: &mut Worksheet,
        na_rep: &str,
        opts: &SpecDrawOptions,
    ) -> Result<(), LayoutError> {
        let style = self.resolved_style(opts);
        let format = style.to_format();

        // Merge first, then overwrite the anchor cell with the real content.
        if self.height > 1 || self.width > 1 {
            ws.merge_range(x, y, x + self.height - 1, y + self.width - 1, "", &format)?;
        }

        self.write_value(x, y, ws, na_rep, &style, &format)?;

        if let Some(text) = &self.note {
            let mut note = Note::new(text.clone());
            if let Some(author) = &self.note_options.author {
                note = note.set_author(author.clone());
            }
            if let Some(val) = self.note_options.width {
                note = note.set_width(val);
            }
            if let Some(val) = self.note_options.height {
                note = note.set_height(val);
            }
            ws.insert_note(x, y, &note)?;
        }

        self.apply_column_sizing(y, ws)?;
        Ok(())
    }
}

/// Validate sizing configuration shared by elements and series.
pub(crate) fn validate_sizing(
    sizing: &EnumColumnSizing,
    padding: f64,
) -> Result<(), LayoutError> {
    if let EnumColumnSizing::Fixed(val) = sizing
        && *val <= 0.0
    {
        return Err(LayoutError::Configuration(
            "fixed column width must be > 0.".to_string(),
        ));
    }
    if padding < 0.0 {
        return Err(LayoutError::Configuration(
            "padding must be >= 0.".to_string(),
        ));
    }
    Ok(())
}

fn write_missing(
    ws: &mut Worksheet,
    x: RowNum,
    y: ColNum,
    na_rep: &str,
    format: &Format,
) -> Result<(), LayoutError> {
    if na_rep.is_empty() {
        ws.write_blank(x, y, format)?;
    } else {
        ws.write_string_with_format(x, y, na_rep, format)?;
    }
    Ok(())
}
