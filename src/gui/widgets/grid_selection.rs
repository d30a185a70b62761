//! Spreadsheet-style cell selection.
//!
//! A selection is an anchor cell plus a focus cell; the selected area is the
//! rectangle they span, whichever corner each one sits in.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Inclusive on all four sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

impl CellRect {
    pub fn spanning(a: CellPos, b: CellPos) -> Self {
        Self {
            top: a.row.min(b.row),
            left: a.col.min(b.col),
            bottom: a.row.max(b.row),
            right: a.col.max(b.col),
        }
    }

    pub fn contains(&self, cell: CellPos) -> bool {
        (self.top..=self.bottom).contains(&cell.row) && (self.left..=self.right).contains(&cell.col)
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<usize> {
        self.top..=self.bottom
    }

    pub fn cell_count(&self) -> usize {
        (self.bottom - self.top + 1) * (self.right - self.left + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSelection {
    anchor: CellPos,
    focus: CellPos,
}

impl GridSelection {
    pub fn single(cell: CellPos) -> Self {
        Self {
            anchor: cell,
            focus: cell,
        }
    }

    pub fn anchor(&self) -> CellPos {
        self.anchor
    }

    pub fn focus(&self) -> CellPos {
        self.focus
    }

    pub fn rect(&self) -> CellRect {
        CellRect::spanning(self.anchor, self.focus)
    }

    pub fn contains(&self, cell: CellPos) -> bool {
        self.rect().contains(cell)
    }

    /// Move the focus, keeping the anchor (shift-click).
    pub fn extend_to(&mut self, cell: CellPos) {
        self.focus = cell;
    }

    /// Arrow-key movement inside a `rows` x `cols` grid. With `extend` only
    /// the focus moves; otherwise the selection collapses onto the new cell.
    pub fn step(&mut self, direction: Direction, extend: bool, rows: usize, cols: usize) {
        if rows == 0 || cols == 0 {
            return;
        }
        let mut next = self.focus;
        match direction {
            Direction::Up => next.row = next.row.saturating_sub(1),
            Direction::Down => next.row = (next.row + 1).min(rows - 1),
            Direction::Left => next.col = next.col.saturating_sub(1),
            Direction::Right => next.col = (next.col + 1).min(cols - 1),
        }
        self.focus = next;
        if !extend {
            self.anchor = next;
        }
    }

    /// Pull both corners back inside the grid after rows were removed.
    /// Returns `None` when the grid is empty.
    pub fn clamped(self, rows: usize, cols: usize) -> Option<Self> {
        if rows == 0 || cols == 0 {
            return None;
        }
        let clamp = |cell: CellPos| CellPos::new(cell.row.min(rows - 1), cell.col.min(cols - 1));
        Some(Self {
            anchor: clamp(self.anchor),
            focus: clamp(self.focus),
        })
    }
}
