//! Rectangular areas, including full-row and full-column bands
//!
//! An [`Area`] is one rectangle of a reference: `A1`, `A1:B3`, the
//! full-column band `C:D` or the full-row band `2:3`. Areas are the unit the
//! structural-edit operations work on: inserting or deleting rows/columns
//! shifts or collapses each area independently.

use crate::cell::CellAddress;
use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// One rectangular area of a reference
///
/// Either dimension may be unbounded: a full-column band (`C:D`) has no row
/// span, a full-row band (`2:3`) has no column span. Bounded dimensions are
/// normalized so `from <= to`. Absolute (`$`) markers are kept per
/// coordinate and re-emitted exactly where they were.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Area {
    /// Row span with per-endpoint absolute flags; `None` for full-column bands
    rows: Option<Span<u32>>,
    /// Column span with per-endpoint absolute flags; `None` for full-row bands
    cols: Option<Span<u16>>,
}

/// A bounded span in one dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Span<T> {
    from: T,
    to: T,
    from_abs: bool,
    to_abs: bool,
}

impl<T: Ord + Copy> Span<T> {
    fn new(from: T, to: T, from_abs: bool, to_abs: bool) -> Self {
        if from <= to {
            Span {
                from,
                to,
                from_abs,
                to_abs,
            }
        } else {
            Span {
                from: to,
                to: from,
                from_abs: to_abs,
                to_abs: from_abs,
            }
        }
    }
}

impl Area {
    /// Create a single-cell area
    pub fn cell(addr: CellAddress) -> Self {
        Area {
            rows: Some(Span::new(
                addr.row,
                addr.row,
                addr.row_absolute,
                addr.row_absolute,
            )),
            cols: Some(Span::new(
                addr.col,
                addr.col,
                addr.col_absolute,
                addr.col_absolute,
            )),
        }
    }

    /// Create a bounded rectangular area (endpoints normalized, relative markers)
    pub fn bounded(from_row: u32, from_col: u16, to_row: u32, to_col: u16) -> Result<Self> {
        let from = CellAddress::new(from_row, from_col)?;
        let to = CellAddress::new(to_row, to_col)?;
        Ok(Area {
            rows: Some(Span::new(from.row, to.row, false, false)),
            cols: Some(Span::new(from.col, to.col, false, false)),
        })
    }

    /// Create a full-column band (e.g. `C:D`)
    pub fn full_columns(from_col: u16, to_col: u16) -> Result<Self> {
        if from_col == 0 || from_col > MAX_COLS {
            return Err(Error::ColumnOutOfBounds(from_col, MAX_COLS));
        }
        if to_col == 0 || to_col > MAX_COLS {
            return Err(Error::ColumnOutOfBounds(to_col, MAX_COLS));
        }
        Ok(Area {
            rows: None,
            cols: Some(Span::new(from_col, to_col, false, false)),
        })
    }

    /// Create a full-row band (e.g. `2:3`)
    pub fn full_rows(from_row: u32, to_row: u32) -> Result<Self> {
        if from_row == 0 || from_row > MAX_ROWS {
            return Err(Error::RowOutOfBounds(from_row, MAX_ROWS));
        }
        if to_row == 0 || to_row > MAX_ROWS {
            return Err(Error::RowOutOfBounds(to_row, MAX_ROWS));
        }
        Ok(Area {
            rows: Some(Span::new(from_row, to_row, false, false)),
            cols: None,
        })
    }

    /// Parse an area from `A1`, `A1:B3`, `C:D` or `2:3` notation
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidArea("empty area".into()));
        }

        match s.find(':') {
            None => {
                // A lone endpoint must be a full cell; bare `C` or `5` would be
                // ambiguous with identifiers and number literals.
                Ok(Area::cell(CellAddress::parse(s)?))
            }
            Some(pos) => {
                let (left, right) = (&s[..pos], &s[pos + 1..]);
                if right.contains(':') {
                    return Err(Error::InvalidArea(format!("too many ':' in '{}'", s)));
                }
                let from = Endpoint::parse(left)?;
                let to = Endpoint::parse(right)?;
                match (from, to) {
                    (Endpoint::Cell(a), Endpoint::Cell(b)) => Ok(Area {
                        rows: Some(Span::new(a.row, b.row, a.row_absolute, b.row_absolute)),
                        cols: Some(Span::new(a.col, b.col, a.col_absolute, b.col_absolute)),
                    }),
                    (Endpoint::Column(c1, a1), Endpoint::Column(c2, a2)) => Ok(Area {
                        rows: None,
                        cols: Some(Span::new(c1, c2, a1, a2)),
                    }),
                    (Endpoint::Row(r1, a1), Endpoint::Row(r2, a2)) => Ok(Area {
                        rows: Some(Span::new(r1, r2, a1, a2)),
                        cols: None,
                    }),
                    _ => Err(Error::InvalidArea(format!(
                        "mismatched range endpoints in '{}'",
                        s
                    ))),
                }
            }
        }
    }

    /// First row of the area (1 for full-column bands)
    pub fn from_row(&self) -> u32 {
        self.rows.map(|s| s.from).unwrap_or(1)
    }

    /// Last row of the area (the sheet extent for full-column bands)
    pub fn to_row(&self) -> u32 {
        self.rows.map(|s| s.to).unwrap_or(MAX_ROWS)
    }

    /// First column of the area (1 for full-row bands)
    pub fn from_col(&self) -> u16 {
        self.cols.map(|s| s.from).unwrap_or(1)
    }

    /// Last column of the area (the sheet extent for full-row bands)
    pub fn to_col(&self) -> u16 {
        self.cols.map(|s| s.to).unwrap_or(MAX_COLS)
    }

    /// Whether the area has no row bound (`C:D` style)
    pub fn is_full_column(&self) -> bool {
        self.rows.is_none()
    }

    /// Whether the area has no column bound (`2:3` style)
    pub fn is_full_row(&self) -> bool {
        self.cols.is_none()
    }

    /// Whether the area is exactly one cell
    pub fn is_single_cell(&self) -> bool {
        matches!((self.rows, self.cols), (Some(r), Some(c)) if r.from == r.to && c.from == c.to)
    }

    /// Number of rows spanned
    pub fn row_count(&self) -> u32 {
        self.to_row() - self.from_row() + 1
    }

    /// Number of columns spanned
    pub fn col_count(&self) -> u16 {
        self.to_col() - self.from_col() + 1
    }

    /// Check whether a position lies within the area
    pub fn contains(&self, row: u32, col: u16) -> bool {
        row >= self.from_row() && row <= self.to_row() && col >= self.from_col() && col <= self.to_col()
    }

    // === Structural edits ===

    /// Shift for a row insertion: every row coordinate >= `pos` moves down by
    /// `count`. Full-column bands are unaffected.
    pub fn add_row(&self, pos: u32, count: u32) -> Area {
        let count = count.min(MAX_ROWS);
        let rows = self.rows.map(|s| Span {
            from: shift_up(s.from, pos, count, MAX_ROWS),
            to: shift_up(s.to, pos, count, MAX_ROWS),
            ..s
        });
        Area { rows, ..*self }
    }

    /// Shift for a column insertion: every column coordinate >= `pos` moves
    /// right by `count`. Full-row bands are unaffected.
    pub fn add_column(&self, pos: u16, count: u16) -> Area {
        let count = count.min(MAX_COLS);
        let cols = self.cols.map(|s| Span {
            from: shift_up(s.from, pos, count, MAX_COLS),
            to: shift_up(s.to, pos, count, MAX_COLS),
            ..s
        });
        Area { cols, ..*self }
    }

    /// Shift for a row deletion of `[pos, pos + count)`
    ///
    /// Coordinates past the band move up by `count`; coordinates inside it
    /// collapse onto the band edge. Returns `None` when the whole row span
    /// falls inside the deleted band (the reference is eliminated).
    pub fn delete_row(&self, pos: u32, count: u32) -> Option<Area> {
        let count = count.min(MAX_ROWS);
        let rows = match self.rows {
            None => None,
            Some(s) => {
                let from = shift_down_from(s.from, pos, count);
                let to = shift_down_to(s.to, pos, count)?;
                if to < from {
                    return None;
                }
                Some(Span { from, to, ..s })
            }
        };
        Some(Area { rows, ..*self })
    }

    /// Shift for a column deletion of `[pos, pos + count)`; see [`Area::delete_row`]
    pub fn delete_column(&self, pos: u16, count: u16) -> Option<Area> {
        let count = count.min(MAX_COLS);
        let cols = match self.cols {
            None => None,
            Some(s) => {
                let from = shift_down_from(s.from, pos, count);
                let to = shift_down_to(s.to, pos, count)?;
                if to < from {
                    return None;
                }
                Some(Span { from, to, ..s })
            }
        };
        Some(Area { cols, ..*self })
    }

    /// Translate for a copy by a row/column delta
    ///
    /// Relative coordinates shift by the delta; absolute coordinates stay
    /// put. Returns `None` when a shifted coordinate leaves the sheet.
    pub fn translate(&self, row_delta: i64, col_delta: i64) -> Option<Area> {
        let rows = match self.rows {
            None => None,
            // Span::new renormalizes: a mixed $-pair can invert under a shift
            Some(s) => Some(Span::new(
                translate_coord(s.from as i64, s.from_abs, row_delta, MAX_ROWS as i64)? as u32,
                translate_coord(s.to as i64, s.to_abs, row_delta, MAX_ROWS as i64)? as u32,
                s.from_abs,
                s.to_abs,
            )),
        };
        let cols = match self.cols {
            None => None,
            Some(s) => Some(Span::new(
                translate_coord(s.from as i64, s.from_abs, col_delta, MAX_COLS as i64)? as u16,
                translate_coord(s.to as i64, s.to_abs, col_delta, MAX_COLS as i64)? as u16,
                s.from_abs,
                s.to_abs,
            )),
        };
        Some(Area { rows, cols })
    }

    fn fmt_endpoint(&self, f: &mut fmt::Formatter<'_>, first: bool) -> fmt::Result {
        if let Some(c) = self.cols {
            let (col, abs) = if first { (c.from, c.from_abs) } else { (c.to, c.to_abs) };
            if abs {
                write!(f, "$")?;
            }
            write!(f, "{}", CellAddress::column_to_letters(col))?;
        }
        if let Some(r) = self.rows {
            let (row, abs) = if first { (r.from, r.from_abs) } else { (r.to, r.to_abs) };
            if abs {
                write!(f, "$")?;
            }
            write!(f, "{}", row)?;
        }
        Ok(())
    }
}

/// Shift a coordinate up for an insertion, clamped to the sheet extent
fn shift_up<T>(coord: T, pos: T, count: T, max: T) -> T
where
    T: Copy + Ord + std::ops::Add<Output = T>,
{
    if coord >= pos {
        let shifted = coord + count;
        if shifted > max {
            max
        } else {
            shifted
        }
    } else {
        coord
    }
}

/// Shift the leading coordinate of a span for a deletion
fn shift_down_from<T>(coord: T, pos: T, count: T) -> T
where
    T: Copy + Ord + std::ops::Add<Output = T> + std::ops::Sub<Output = T>,
{
    if coord < pos {
        coord
    } else if coord >= pos + count {
        coord - count
    } else {
        pos
    }
}

/// Shift the trailing coordinate of a span for a deletion
///
/// Returns `None` when the coordinate collapses past the band start, which
/// can only happen when the span begins inside the band too.
fn shift_down_to<T>(coord: T, pos: T, count: T) -> Option<T>
where
    T: Copy + Ord + std::ops::Add<Output = T> + std::ops::Sub<Output = T> + From<u8>,
{
    if coord < pos {
        Some(coord)
    } else if coord >= pos + count {
        Some(coord - count)
    } else if pos > T::from(1u8) {
        Some(pos - T::from(1u8))
    } else {
        None
    }
}

/// Translate one coordinate for a copy
fn translate_coord(coord: i64, absolute: bool, delta: i64, max: i64) -> Option<i64> {
    if absolute {
        return Some(coord);
    }
    let shifted = coord + delta;
    if shifted < 1 || shifted > max {
        None
    } else {
        Some(shifted)
    }
}

/// One side of a `:`-separated area
enum Endpoint {
    Cell(CellAddress),
    Column(u16, bool),
    Row(u32, bool),
}

impl Endpoint {
    fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let body = s.strip_prefix('$').unwrap_or(s);
        let abs = body.len() != s.len();

        if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) {
            let row: u32 = body
                .parse()
                .map_err(|_| Error::InvalidArea(format!("invalid row '{}'", s)))?;
            if row == 0 || row > MAX_ROWS {
                return Err(Error::RowOutOfBounds(row, MAX_ROWS));
            }
            return Ok(Endpoint::Row(row, abs));
        }
        if !body.is_empty() && body.bytes().all(|b| b.is_ascii_alphabetic()) {
            let col = CellAddress::letters_to_column(body)?;
            return Ok(Endpoint::Column(col, abs));
        }
        Ok(Endpoint::Cell(CellAddress::parse(s)?))
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Emit the colon form for single cells only when the two endpoints
        // carry different markers (e.g. A1:$A$1).
        if let (Some(r), Some(c)) = (self.rows, self.cols) {
            if r.from == r.to
                && c.from == c.to
                && r.from_abs == r.to_abs
                && c.from_abs == c.to_abs
            {
                return self.fmt_endpoint(f, true);
            }
        }
        self.fmt_endpoint(f, true)?;
        write!(f, ":")?;
        self.fmt_endpoint(f, false)
    }
}

impl FromStr for Area {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
