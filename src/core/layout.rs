//! Board Layout
//!
//! Maps a logical `cols x rows` grid onto pixel geometry for a viewport.
//! Cards are square and sized by whichever dimension binds first.

use serde::{Serialize, Deserialize};

/// Default spacing between cards and around the grid (pixels).
pub const DEFAULT_GAP: f64 = 16.0;

/// Default outer margin around the board (pixels).
pub const DEFAULT_MARGIN: f64 = 16.0;

/// Viewport size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
}

impl Viewport {
    /// Create a viewport.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Spacing options for the layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Gap between neighbouring cards, and between the grid and its margin
    pub gap: f64,
    /// Outer margin around the board
    pub margin: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            margin: DEFAULT_MARGIN,
        }
    }
}

/// A slot center in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

/// Computed geometry for one viewport.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardLayout {
    /// Grid columns
    pub cols: u32,
    /// Grid rows
    pub rows: u32,
    /// Gap used
    pub gap: f64,
    /// Margin used
    pub margin: f64,
    /// Side length of every card (floored, may be non-positive)
    pub card_side: f64,
    /// Row-major slot centers
    pub positions: Vec<Point>,
}

impl BoardLayout {
    /// Center of the slot at `index`, if it is on the grid.
    pub fn position(&self, index: usize) -> Option<Point> {
        self.positions.get(index).copied()
    }

    /// Number of slots on the grid.
    pub fn slot_count(&self) -> usize {
        self.positions.len()
    }
}

/// Compute the layout for a viewport and grid.
///
/// Degenerate viewports produce a non-positive `card_side`; that is
/// returned as-is, the caller owns sane bounds.
pub fn compute_layout(
    viewport_w: f64,
    viewport_h: f64,
    cols: u32,
    rows: u32,
    gap: f64,
    margin: f64,
) -> BoardLayout {
    let cols_f = cols as f64;
    let rows_f = rows as f64;

    let usable_w = viewport_w - 2.0 * margin - gap * (cols_f + 1.0);
    let usable_h = viewport_h - 2.0 * margin - gap * (rows_f + 1.0);
    let card_side = (usable_w / cols_f).min(usable_h / rows_f).floor();

    let total = cols as usize * rows as usize;
    let positions = (0..total)
        .map(|index| {
            let col = (index % cols as usize) as f64;
            let row = (index / cols as usize) as f64;
            Point {
                x: margin + gap + col * (card_side + gap) + card_side / 2.0,
                y: margin + gap + row * (card_side + gap) + card_side / 2.0,
            }
        })
        .collect();

    BoardLayout {
        cols,
        rows,
        gap,
        margin,
        card_side,
        positions,
    }
}

/// Compute the layout for a viewport using the given spacing options.
pub fn layout_for(viewport: Viewport, cols: u32, rows: u32, options: LayoutOptions) -> BoardLayout {
    compute_layout(viewport.width, viewport.height, cols, rows, options.gap, options.margin)
}
