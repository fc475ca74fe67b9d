//! Layout constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::SpecCellStyle;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: u32 = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: u16 = 16_384;

/// Default capacity of the drawer's bounded extent history.
pub const N_HISTORY_CAPACITY_DEFAULT: usize = 32;

/// Prefix marking a string value as a deferred expression.
pub const EVAL_MARKER_PREFIX: &str = "@eval@";

/// Default padding (per side) used by auto column sizing.
pub const N_PADDING_DEFAULT: f64 = 2.0;

/// Build default named style presets for report layouts.
pub fn derive_default_layout_styles() -> BTreeMap<String, SpecCellStyle> {
    let cfg_base_style = SpecCellStyle {
        font_name: Some("Times New Roman".to_string()),
        font_size: Some(11),
        align: Some("left".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };

    let mut dict_styles = BTreeMap::new();
    dict_styles.insert("text".to_string(), cfg_base_style.clone());
    dict_styles.insert(
        "header".to_string(),
        cfg_base_style.with_(SpecCellStyle {
            bold: Some(true),
            align: Some("center".to_string()),
            bottom: Some(1),
            ..Default::default()
        }),
    );
    dict_styles.insert(
        "key".to_string(),
        cfg_base_style.with_(SpecCellStyle {
            bold: Some(true),
            ..Default::default()
        }),
    );
    dict_styles.insert(
        "value".to_string(),
        cfg_base_style.with_(SpecCellStyle {
            align: Some("right".to_string()),
            ..Default::default()
        }),
    );

    dict_styles
}
