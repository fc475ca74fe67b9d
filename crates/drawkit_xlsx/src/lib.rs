//! `drawkit_xlsx` v1:
//! Cursor-based report layout kernel over a worksheet grid.
//!
//! Architecture:
//! - `conf`       : constants and default presets
//! - `spec`       : specs/models/options and the drawable contract
//! - `util`       : pure helper functions
//! - `error`      : error taxonomy
//! - `eval`       : deferred-expression evaluation
//! - `element`    : atomic drawable unit
//! - `series`     : one-dimensional element run
//! - `matrix`     : two-dimensional element grid
//! - `dictionary` : key/value section with structure-config loading
//! - `drawer`     : stateful cursor with bounded draw history
pub mod conf;
pub mod dictionary;
pub mod drawer;
pub mod element;
pub mod error;
pub mod eval;
pub mod matrix;
pub mod series;
pub mod spec;
pub mod util;

pub use conf::{
    EVAL_MARKER_PREFIX, N_HISTORY_CAPACITY_DEFAULT, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    N_PADDING_DEFAULT, derive_default_layout_styles,
};
pub use dictionary::{Dictionary, load_structure};
pub use drawer::Drawer;
pub use element::Element;
pub use error::LayoutError;
pub use eval::{SpecEvalResolver, evaluate_expression, resolve_value};
pub use matrix::{Matrix, SpecMatrixColumn};
pub use series::{EnumSeriesItem, Series};
pub use spec::{
    Drawable, EnumCellValue, EnumColumnSizing, EnumEdgeSide, EnumEdgeStyle, EnumElementProp,
    EnumFieldScalar, EnumFieldValue, EnumRichSpan, EnumWriteOp, SpecCellStyle, SpecDictEntry,
    SpecDictionaryOptions, SpecDrawOptions, SpecElementOptions, SpecFieldSpec,
    SpecMatrixColumnOptions, SpecMatrixOptions, SpecNoteOptions, SpecSeriesOptions,
};
pub use util::{
    apply_edge_style, convert_any_value, coords_to_xl, derive_column_letters, derive_row_number,
    derive_value_text, derive_value_text_len, xl_to_coords,
};
