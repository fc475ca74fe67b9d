//! Key/value report section loaded from code or from a structure-config file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_xlsxwriter::{ColNum, RowNum, Worksheet};

use crate::element::Element;
use crate::error::LayoutError;
use crate::eval::{self, SpecEvalResolver};
use crate::spec::{
    Drawable, EnumCellValue, EnumFieldValue, SpecCellStyle, SpecDictEntry, SpecDictionaryOptions,
    SpecDrawOptions, SpecFieldSpec,
};

/// Two-column key/value layout with per-entry spacing.
///
/// Keys form the left column, values the right one, separated by `hspace`
/// blank columns. A list-valued entry stacks its members vertically next to
/// the key. String values carrying the deferred-expression marker are
/// resolved against `context` at draw time.
#[derive(Debug, Clone)]
pub struct Dictionary {
    /// Entries in draw order.
    pub entries: Vec<SpecDictEntry>,
    /// Default horizontal spacing between key and value columns.
    pub hspace: ColNum,
    /// Default vertical spacing appended after each entry.
    pub vspace: u32,
    /// Base style for key elements.
    pub keys_style: SpecCellStyle,
    /// Base style for value elements.
    pub values_style: SpecCellStyle,
    /// Context mapping visible to deferred expressions.
    pub context: BTreeMap<String, EnumCellValue>,
    /// Value resolver applied to every scalar before drawing.
    pub resolver: SpecEvalResolver,
}

impl Dictionary {
    /// Create a dictionary from in-memory entries.
    pub fn new(entries: Vec<SpecDictEntry>, options: SpecDictionaryOptions) -> Self {
        Self {
            entries,
            hspace: options.hspace,
            vspace: options.vspace,
            keys_style: options.keys_style,
            values_style: options.values_style,
            context: options.context,
            resolver: eval::resolve_value,
        }
    }

    /// Create a dictionary from a JSON structure-config file.
    pub fn from_structure_file(
        path: impl AsRef<Path>,
        options: SpecDictionaryOptions,
    ) -> Result<Self, LayoutError> {
        let l_entries = load_structure(path)?;
        Ok(Self::new(l_entries, options))
    }

    fn entry_hspace(&self, entry: &SpecDictEntry) -> ColNum {
        entry.hspace.unwrap_or(self.hspace)
    }

    fn entry_vspace(&self, entry: &SpecDictEntry) -> u32 {
        entry.vspace.unwrap_or(self.vspace)
    }

    fn field_height(spec: &SpecFieldSpec) -> u32 {
        let n_height_each = spec.height.unwrap_or(1);
        match &spec.value {
            EnumFieldValue::Scalar(_) => n_height_each,
            EnumFieldValue::List(members) => n_height_each * members.len() as u32,
        }
    }

    fn field_width(spec: &SpecFieldSpec) -> ColNum {
        spec.width.unwrap_or(1)
    }

    fn entry_height(&self, entry: &SpecDictEntry) -> u32 {
        Self::field_height(&entry.key).max(Self::field_height(&entry.value))
    }

    // The next entry follows the value column only; a key taller than its
    // values overlaps the rows of the entry below.
    fn entry_advance(&self, entry: &SpecDictEntry) -> u32 {
        Self::field_height(&entry.value) + self.entry_vspace(entry)
    }

    fn resolve_scalar(
        &self,
        value: &EnumCellValue,
    ) -> Result<EnumCellValue, LayoutError> {
        (self.resolver)(value, &self.context)
    }

    fn draw_field_member(
        &self,
        spec: &SpecFieldSpec,
        value: &EnumCellValue,
        base_style: &SpecCellStyle,
        x: RowNum,
        y: ColNum,
        ws: &mut Worksheet,
        na_rep: &str,
        opts: &SpecDrawOptions,
    ) -> Result<u32, LayoutError> {
        let resolved = self.resolve_scalar(value)?;
        let elem = Element::from_field_spec(spec, resolved, base_style)?;
        elem.draw(x, y, ws, na_rep, opts)?;
        Ok(elem.height)
    }
}

impl Drawable for Dictionary {
    fn extent_height(&self) -> u32 {
        self.entries
            .iter()
            .map(|entry| self.entry_height(entry) + self.entry_vspace(entry))
            .sum()
    }

    fn extent_width(&self) -> ColNum {
        self.entries
            .iter()
            .map(|entry| {
                Self::field_width(&entry.key)
                    + self.entry_hspace(entry)
                    + Self::field_width(&entry.value)
            })
            .max()
            .unwrap_or(0)
    }

    fn draw(
        &self,
        x: RowNum,
        y: ColNum,
        ws: &mut Worksheet,
        na_rep: &str,
        opts: &SpecDrawOptions,
    ) -> Result<(), LayoutError> {
        let mut n_row = x;

        for entry in &self.entries {
            let n_col_values = y + Self::field_width(&entry.key) + self.entry_hspace(entry);

            match &entry.key.value {
                EnumFieldValue::Scalar(scalar) => {
                    self.draw_field_member(
                        &entry.key,
                        &scalar.to_cell_value(),
                        &self.keys_style,
                        n_row,
                        y,
                        ws,
                        na_rep,
                        opts,
                    )?;
                }
                EnumFieldValue::List(_) => {
                    return Err(LayoutError::Configuration(
                        "dictionary keys must be scalar values.".to_string(),
                    ));
                }
            }

            match &entry.value.value {
                EnumFieldValue::Scalar(scalar) => {
                    self.draw_field_member(
                        &entry.value,
                        &scalar.to_cell_value(),
                        &self.values_style,
                        n_row,
                        n_col_values,
                        ws,
                        na_rep,
                        opts,
                    )?;
                }
                EnumFieldValue::List(members) => {
                    let mut n_row_member = n_row;
                    for member in members {
                        let n_height = self.draw_field_member(
                            &entry.value,
                            &member.to_cell_value(),
                            &self.values_style,
                            n_row_member,
                            n_col_values,
                            ws,
                            na_rep,
                            opts,
                        )?;
                        n_row_member += n_height;
                    }
                }
            }

            n_row += self.entry_advance(entry);
        }
        Ok(())
    }
}

/// Load dictionary entries from a JSON structure-config file.
///
/// Read and parse failures both surface as `ConfigLoad`; no partial result
/// is returned.
pub fn load_structure(path: impl AsRef<Path>) -> Result<Vec<SpecDictEntry>, LayoutError> {
    let path = path.as_ref();
    let c_text = fs::read_to_string(path).map_err(|err| LayoutError::ConfigLoad {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    serde_json::from_str(&c_text).map_err(|err| LayoutError::ConfigLoad {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{EnumFieldScalar, SpecFieldSpec};
    use std::io::Write as _;

    fn scalar_field(value: EnumFieldScalar) -> SpecFieldSpec {
        SpecFieldSpec {
            value: EnumFieldValue::Scalar(value),
            style: SpecCellStyle::default(),
            height: None,
            width: None,
            note: None,
        }
    }

    fn entry(key: &str, value: EnumFieldScalar) -> SpecDictEntry {
        SpecDictEntry {
            key: scalar_field(EnumFieldScalar::Text(key.to_string())),
            value: scalar_field(value),
            hspace: None,
            vspace: None,
        }
    }

    #[test]
    fn test_extents_cover_keys_spacing_and_values() {
        let dict = Dictionary::new(
            vec![
                entry("a", EnumFieldScalar::Number(1.0)),
                entry("b", EnumFieldScalar::Number(2.0)),
            ],
            SpecDictionaryOptions {
                hspace: 2,
                vspace: 1,
                ..Default::default()
            },
        );
        assert_eq!(dict.extent_width(), 4);
        assert_eq!(dict.extent_height(), 4);
    }

    #[test]
    fn test_list_values_stack_vertically() {
        let mut item = entry("a", EnumFieldScalar::Number(1.0));
        item.value.value = EnumFieldValue::List(vec![
            EnumFieldScalar::Number(1.0),
            EnumFieldScalar::Number(2.0),
            EnumFieldScalar::Number(3.0),
        ]);

        let dict = Dictionary::new(vec![item], SpecDictionaryOptions::default());
        assert_eq!(dict.extent_height(), 3);

        let mut ws = Worksheet::new();
        dict.draw(0, 0, &mut ws, "", &SpecDrawOptions::default())
            .unwrap();
    }

    #[test]
    fn test_entries_advance_by_value_heights_only() {
        let mut item = entry("tall key", EnumFieldScalar::Number(1.0));
        item.key.height = Some(3);
        let dict = Dictionary::new(
            vec![item, entry("b", EnumFieldScalar::Number(2.0))],
            SpecDictionaryOptions::default(),
        );

        assert_eq!(dict.entry_advance(&dict.entries[0]), 1);
        // The bounding box still covers the tall key.
        assert_eq!(dict.extent_height(), 4);
    }

    #[test]
    fn test_vspace_extends_the_entry_advance() {
        let mut item = entry("a", EnumFieldScalar::Number(1.0));
        item.vspace = Some(2);
        let dict = Dictionary::new(vec![item], SpecDictionaryOptions::default());
        assert_eq!(dict.entry_advance(&dict.entries[0]), 3);
    }

    #[test]
    fn test_deferred_expression_is_resolved_at_draw_time() {
        let dict = Dictionary::new(
            vec![entry("sum", EnumFieldScalar::Text("@eval@1+1".to_string()))],
            SpecDictionaryOptions::default(),
        );

        let resolved = dict
            .resolve_scalar(&EnumCellValue::String("@eval@1+1".to_string()))
            .unwrap();
        assert_eq!(resolved, EnumCellValue::Number(2.0));

        let mut ws = Worksheet::new();
        dict.draw(0, 0, &mut ws, "", &SpecDrawOptions::default())
            .unwrap();
    }

    #[test]
    fn test_context_names_are_visible_to_expressions() {
        let mut context = BTreeMap::new();
        context.insert("base".to_string(), EnumCellValue::Number(10.0));
        let dict = Dictionary::new(
            Vec::new(),
            SpecDictionaryOptions {
                context,
                ..Default::default()
            },
        );

        let resolved = dict
            .resolve_scalar(&EnumCellValue::String("@eval@base * 2".to_string()))
            .unwrap();
        assert_eq!(resolved, EnumCellValue::Number(20.0));
    }

    #[test]
    fn test_structure_file_round_trip() {
        let c_json = r#"[
            {
                "key": { "value": "name", "style": { "bold": true } },
                "value": { "value": "report" }
            },
            {
                "key": { "value": "totals" },
                "value": { "value": [1, 2, 3] },
                "vspace": 1
            }
        ]"#;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(c_json.as_bytes()).unwrap();

        let dict =
            Dictionary::from_structure_file(file.path(), SpecDictionaryOptions::default()).unwrap();
        assert_eq!(dict.entries.len(), 2);
        assert_eq!(dict.entries[0].key.style.bold, Some(true));
        assert!(matches!(
            dict.entries[1].value.value,
            EnumFieldValue::List(ref members) if members.len() == 3
        ));
        assert_eq!(dict.extent_height(), 5);
    }

    #[test]
    fn test_missing_structure_file_is_a_config_load_error() {
        let result = Dictionary::from_structure_file(
            "/nonexistent/structure.json",
            SpecDictionaryOptions::default(),
        );
        assert!(matches!(result, Err(LayoutError::ConfigLoad { .. })));
    }
}
