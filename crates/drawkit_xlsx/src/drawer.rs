//! Stateful cursor that places drawables on a worksheet.

use std::collections::{BTreeMap, VecDeque};

use rust_xlsxwriter::{ColNum, RowNum, Worksheet};

use crate::conf::{N_HISTORY_CAPACITY_DEFAULT, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::error::LayoutError;
use crate::spec::{Drawable, SpecDrawOptions};
use crate::util::{coords_to_xl, derive_column_letters, derive_row_number, xl_to_coords};

/// Cursor over a worksheet grid with a bounded draw history.
///
/// Drawing never moves the cursor; movement is explicit, either absolute
/// (`reset`, checkpoints) or relative to the recorded extents of past draws
/// (`move_horizontal`, `move_vertical`). History holds the extents of the
/// most recent draws, newest first, capped at `capacity`.
pub struct Drawer<'a> {
    ws: &'a mut Worksheet,
    x: RowNum,
    y: ColNum,
    na_rep: String,
    history: VecDeque<(u32, ColNum)>,
    capacity: usize,
    checkpoints: BTreeMap<String, (RowNum, ColNum)>,
}

impl<'a> Drawer<'a> {
    /// Create a drawer positioned at `(x, y)` with the default history depth.
    pub fn new(ws: &'a mut Worksheet, x: RowNum, y: ColNum, na_rep: impl Into<String>) -> Self {
        Self::with_capacity(ws, x, y, na_rep, N_HISTORY_CAPACITY_DEFAULT)
    }

    /// Create a drawer with an explicit history capacity.
    pub fn with_capacity(
        ws: &'a mut Worksheet,
        x: RowNum,
        y: ColNum,
        na_rep: impl Into<String>,
        capacity: usize,
    ) -> Self {
        Self {
            ws,
            x,
            y,
            na_rep: na_rep.into(),
            history: VecDeque::with_capacity(capacity),
            capacity,
            checkpoints: BTreeMap::new(),
        }
    }

    /// Current row (zero-based).
    pub fn x(&self) -> RowNum {
        self.x
    }

    /// Current column (zero-based).
    pub fn y(&self) -> ColNum {
        self.y
    }

    /// Representation written for missing values.
    pub fn na_rep(&self) -> &str {
        &self.na_rep
    }

    /// Number of draws currently recorded.
    pub fn history_depth(&self) -> usize {
        self.history.len()
    }

    ////////////////////////////////////////////////////////////////////////////
    // #region Drawing

    /// Draw at the current position with default options.
    ///
    /// The cursor stays put; the drawable's extents are pushed onto the
    /// history.
    pub fn draw(&mut self, drawable: &impl Drawable) -> Result<(), LayoutError> {
        self.draw_with(drawable, &SpecDrawOptions::default())
    }

    /// Draw at the current position with per-call overrides.
    pub fn draw_with(
        &mut self,
        drawable: &impl Drawable,
        opts: &SpecDrawOptions,
    ) -> Result<(), LayoutError> {
        drawable.draw(self.x, self.y, self.ws, &self.na_rep, opts)?;

        self.history
            .push_front((drawable.extent_height(), drawable.extent_width()));
        self.history.truncate(self.capacity);

        log::debug!(
            "drew {}x{} at {}",
            drawable.extent_height(),
            drawable.extent_width(),
            self.xl_position(0, 0)
        );
        Ok(())
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region History

    /// Height of the `n`-th most recent draw (0 = latest).
    pub fn height(&self, n: usize) -> Result<u32, LayoutError> {
        self.history
            .get(n)
            .map(|(height, _)| *height)
            .ok_or(LayoutError::HistoryUnderflow {
                requested: n,
                depth: self.history.len(),
            })
    }

    /// Width of the `n`-th most recent draw (0 = latest).
    pub fn width(&self, n: usize) -> Result<ColNum, LayoutError> {
        self.history
            .get(n)
            .map(|(_, width)| *width)
            .ok_or(LayoutError::HistoryUnderflow {
                requested: n,
                depth: self.history.len(),
            })
    }

    /// Move right by the width of a recorded draw.
    ///
    /// `back` selects the draw before the latest; the cursor always moves
    /// forward (rightward).
    pub fn move_horizontal(&mut self, back: bool) -> Result<(), LayoutError> {
        let n_width = self.width(usize::from(back))?;
        self.move_by(0, i64::from(n_width))
    }

    /// Move down by the height of a recorded draw.
    ///
    /// `back` selects the draw before the latest; the cursor always moves
    /// forward (downward).
    pub fn move_vertical(&mut self, back: bool) -> Result<(), LayoutError> {
        let n_height = self.height(usize::from(back))?;
        self.move_by(i64::from(n_height), 0)
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Movement

    /// Move the cursor by a signed offset, bounded by the worksheet grid.
    pub fn move_by(&mut self, dx: i64, dy: i64) -> Result<(), LayoutError> {
        let n_row = i64::from(self.x) + dx;
        let n_col = i64::from(self.y) + dy;

        if n_row < 0 || n_row >= i64::from(N_NROWS_EXCEL_MAX) {
            return Err(LayoutError::Configuration(format!(
                "row {n_row} is outside the worksheet grid."
            )));
        }
        if n_col < 0 || n_col >= i64::from(N_NCOLS_EXCEL_MAX) {
            return Err(LayoutError::Configuration(format!(
                "column {n_col} is outside the worksheet grid."
            )));
        }

        self.x = n_row as RowNum;
        self.y = n_col as ColNum;
        Ok(())
    }

    /// Record the current position under `name`, overwriting any previous one.
    pub fn add_checkpoint(&mut self, name: impl Into<String>) {
        let c_name = name.into();
        log::debug!("checkpoint {c_name:?} at {}", self.xl_position(0, 0));
        self.checkpoints.insert(c_name, (self.x, self.y));
    }

    /// Reposition the cursor.
    ///
    /// A checkpoint restores both coordinates first; explicit `x`/`y` then
    /// override per dimension. With no argument at all the cursor returns
    /// to the origin.
    pub fn reset(
        &mut self,
        x: Option<RowNum>,
        y: Option<ColNum>,
        checkpoint: Option<&str>,
    ) -> Result<(), LayoutError> {
        let (mut n_row, mut n_col) = (0, 0);

        if let Some(name) = checkpoint {
            (n_row, n_col) = *self
                .checkpoints
                .get(name)
                .ok_or_else(|| LayoutError::UnknownCheckpoint(name.to_string()))?;
        }
        if let Some(val) = x {
            n_row = val;
        }
        if let Some(val) = y {
            n_col = val;
        }

        if n_row >= N_NROWS_EXCEL_MAX || n_col >= N_NCOLS_EXCEL_MAX {
            return Err(LayoutError::Configuration(format!(
                "position ({n_row}, {n_col}) is outside the worksheet grid."
            )));
        }

        self.x = n_row;
        self.y = n_col;
        log::debug!("reset to {}", self.xl_position(0, 0));
        Ok(())
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region AddressNotation

    /// Position offset by `(dx, dy)` from the cursor, in A1 notation.
    pub fn xl_position(&self, dx: RowNum, dy: ColNum) -> String {
        coords_to_xl(self.x + dx, self.y + dy)
    }

    /// Column letters `dy` columns right of the cursor.
    pub fn xl_column(&self, dy: ColNum) -> String {
        derive_column_letters(self.y + dy)
    }

    /// Row number `dx` rows below the cursor.
    pub fn xl_row(&self, dx: RowNum) -> String {
        derive_row_number(self.x + dx)
    }

    /// Reposition the cursor from an A1-notation address.
    pub fn set_position_from_xl(&mut self, addr: &str) -> Result<(), LayoutError> {
        let (n_row, n_col) = xl_to_coords(addr)?;
        self.x = n_row;
        self.y = n_col;
        Ok(())
    }

    /// Bounding range of the latest draw in A1 notation.
    ///
    /// Valid while the cursor still sits where that draw happened, since
    /// drawing never moves it.
    pub fn xl_last_range(&self) -> Result<String, LayoutError> {
        let n_height = self.height(0)?;
        let n_width = self.width(0)?;
        Ok(format!(
            "{}:{}",
            coords_to_xl(self.x, self.y),
            coords_to_xl(self.x + n_height - 1, self.y + n_width - 1)
        ))
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::spec::EnumCellValue;

    fn element_with_extents(height: u32, width: ColNum) -> Element {
        let mut elem = Element::from_value(EnumCellValue::from("v"));
        elem.height = height;
        elem.width = width;
        elem
    }

    #[test]
    fn test_draw_records_extents_and_keeps_the_cursor() {
        let mut ws = Worksheet::new();
        let mut drawer = Drawer::new(&mut ws, 2, 3, "");

        drawer.draw(&element_with_extents(2, 4)).unwrap();
        assert_eq!((drawer.x(), drawer.y()), (2, 3));
        assert_eq!(drawer.height(0).unwrap(), 2);
        assert_eq!(drawer.width(0).unwrap(), 4);
    }

    #[test]
    fn test_history_is_newest_first_and_bounded() {
        let mut ws = Worksheet::new();
        let mut drawer = Drawer::with_capacity(&mut ws, 0, 0, "", 2);

        drawer.draw(&element_with_extents(1, 1)).unwrap();
        drawer.move_vertical(false).unwrap();
        drawer.draw(&element_with_extents(2, 2)).unwrap();
        drawer.move_vertical(false).unwrap();
        drawer.draw(&element_with_extents(3, 3)).unwrap();

        assert_eq!(drawer.history_depth(), 2);
        assert_eq!(drawer.height(0).unwrap(), 3);
        assert_eq!(drawer.height(1).unwrap(), 2);
        assert!(matches!(
            drawer.height(2),
            Err(LayoutError::HistoryUnderflow {
                requested: 2,
                depth: 2
            })
        ));
    }

    #[test]
    fn test_history_underflow_on_empty_drawer() {
        let mut ws = Worksheet::new();
        let drawer = Drawer::new(&mut ws, 0, 0, "");
        assert!(matches!(
            drawer.width(0),
            Err(LayoutError::HistoryUnderflow { .. })
        ));
    }

    #[test]
    fn test_move_horizontal_steps_by_recorded_width() {
        let mut ws = Worksheet::new();
        let mut drawer = Drawer::new(&mut ws, 0, 0, "");

        drawer.draw(&element_with_extents(1, 3)).unwrap();
        drawer.move_horizontal(false).unwrap();
        assert_eq!(drawer.y(), 3);

        drawer.draw(&element_with_extents(2, 5)).unwrap();
        drawer.move_horizontal(true).unwrap();
        assert_eq!(drawer.y(), 6);
    }

    #[test]
    fn test_move_vertical_steps_by_recorded_height() {
        let mut ws = Worksheet::new();
        let mut drawer = Drawer::new(&mut ws, 0, 0, "");

        drawer.draw(&element_with_extents(4, 1)).unwrap();
        drawer.move_vertical(false).unwrap();
        assert_eq!(drawer.x(), 4);
    }

    #[test]
    fn test_move_by_rejects_positions_outside_the_grid() {
        let mut ws = Worksheet::new();
        let mut drawer = Drawer::new(&mut ws, 0, 0, "");

        assert!(drawer.move_by(-1, 0).is_err());
        assert!(drawer.move_by(0, -1).is_err());
        assert!(drawer.move_by(i64::from(N_NROWS_EXCEL_MAX), 0).is_err());
        assert!(drawer.move_by(0, i64::from(N_NCOLS_EXCEL_MAX)).is_err());
        assert_eq!((drawer.x(), drawer.y()), (0, 0));
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let mut ws = Worksheet::new();
        let mut drawer = Drawer::new(&mut ws, 3, 4, "");

        drawer.add_checkpoint("anchor");
        drawer.move_by(10, 10).unwrap();
        drawer.reset(None, None, Some("anchor")).unwrap();
        assert_eq!((drawer.x(), drawer.y()), (3, 4));
    }

    #[test]
    fn test_reset_explicit_coordinates_override_checkpoint() {
        let mut ws = Worksheet::new();
        let mut drawer = Drawer::new(&mut ws, 3, 4, "");

        drawer.add_checkpoint("anchor");
        drawer.move_by(5, 5).unwrap();
        drawer.reset(Some(7), None, Some("anchor")).unwrap();
        assert_eq!((drawer.x(), drawer.y()), (7, 4));

        drawer.reset(None, None, None).unwrap();
        assert_eq!((drawer.x(), drawer.y()), (0, 0));
    }

    #[test]
    fn test_reset_unknown_checkpoint_is_an_error() {
        let mut ws = Worksheet::new();
        let mut drawer = Drawer::new(&mut ws, 0, 0, "");
        assert!(matches!(
            drawer.reset(None, None, Some("missing")),
            Err(LayoutError::UnknownCheckpoint(_))
        ));
    }

    #[test]
    fn test_xl_position_round_trip() {
        let mut ws = Worksheet::new();
        let mut drawer = Drawer::new(&mut ws, 9, 2, "");

        assert_eq!(drawer.xl_position(0, 0), "C10");
        assert_eq!(drawer.xl_column(0), "C");
        assert_eq!(drawer.xl_row(0), "10");

        drawer.set_position_from_xl("$B$7").unwrap();
        assert_eq!((drawer.x(), drawer.y()), (6, 1));
    }

    #[test]
    fn test_address_helpers_apply_offsets() {
        let mut ws = Worksheet::new();
        let drawer = Drawer::new(&mut ws, 9, 2, "");

        assert_eq!(drawer.xl_position(2, 1), "D12");
        assert_eq!(drawer.xl_column(2), "E");
        assert_eq!(drawer.xl_row(5), "15");
    }

    #[test]
    fn test_xl_last_range_spans_the_latest_draw() {
        let mut ws = Worksheet::new();
        let mut drawer = Drawer::new(&mut ws, 1, 1, "");

        assert!(drawer.xl_last_range().is_err());
        drawer.draw(&element_with_extents(2, 3)).unwrap();
        assert_eq!(drawer.xl_last_range().unwrap(), "B2:D3");
    }
}
