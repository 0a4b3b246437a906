//! Core game engine for the Former puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Brick`: The four brick colors that can occupy a cell.
//! - `Board`: The 7x9 grid stored as four bitplanes, one per color, with the
//!   group finding, group removal and gravity mechanics.
//! - `Click` / `ClickGroup`: A tapped cell, and a connected group reported by a
//!   scan of the board.
//!
//! Cells are addressed either by `(x, y)` coordinates or by the linear position
//! `y * WIDTH + x`; row 0 is the top of the board and gravity pulls towards row
//! `HEIGHT - 1`. Unlike PopStar there is no column shifting: an emptied column
//! stays empty.
use crate::error::{FormerError, FormerResult};
use rand::Rng;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Number of columns on the board.
pub const WIDTH: usize = 7;
/// Number of rows on the board.
pub const HEIGHT: usize = 9;
/// Number of cells, and of meaningful bits in each bitplane.
pub const CELLS: usize = WIDTH * HEIGHT;

const FULL_MASK: u64 = (1 << CELLS) - 1;
const FIRST_COLUMN: u64 = column_mask(0);
const LAST_COLUMN: u64 = column_mask(WIDTH - 1);

const fn column_mask(x: usize) -> u64 {
    let mut mask = 0;
    let mut y = 0;
    while y < HEIGHT {
        mask |= 1 << (y * WIDTH + x);
        y += 1;
    }
    mask
}

/// Represents the color of a brick on the game board.
///
/// The discriminant doubles as the index of the color's bitplane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Brick {
    Orange = 0,
    Green = 1,
    Pink = 2,
    Blue = 3,
}

impl Brick {
    /// Every color, in bitplane order.
    pub const ALL: [Brick; 4] = [Brick::Orange, Brick::Green, Brick::Pink, Brick::Blue];

    /// Index of this color's bitplane.
    pub fn plane(self) -> usize {
        self as usize
    }

    /// Converts the brick to its character representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use former_solver::engine::Brick;
    /// assert_eq!(Brick::Orange.to_char(), 'O');
    /// assert_eq!(Brick::Blue.to_char(), 'B');
    /// ```
    pub fn to_char(self) -> char {
        match self {
            Brick::Orange => 'O',
            Brick::Green => 'G',
            Brick::Pink => 'P',
            Brick::Blue => 'B',
        }
    }

    /// Parses the character produced by [`Brick::to_char`].
    pub fn from_char(ch: char) -> Option<Brick> {
        match ch {
            'O' => Some(Brick::Orange),
            'G' => Some(Brick::Green),
            'P' => Some(Brick::Pink),
            'B' => Some(Brick::Blue),
            _ => None,
        }
    }

    /// Returns the ANSI background color code for terminal output.
    fn to_ansi_color_code(self) -> &'static str {
        match self {
            Brick::Orange => "43",
            Brick::Green => "42",
            Brick::Blue => "44",
            Brick::Pink => "45",
        }
    }
}

/// A tapped cell, as reported to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Click {
    pub x: usize,
    pub y: usize,
}

impl Click {
    /// Converts a linear position into coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use former_solver::engine::Click;
    /// assert_eq!(Click::from_pos(9), Click { x: 2, y: 1 });
    /// assert_eq!(Click::from_pos(9).pos(), 9);
    /// ```
    pub fn from_pos(pos: usize) -> Self {
        Click {
            x: pos % WIDTH,
            y: pos / WIDTH,
        }
    }

    /// Linear position `y * WIDTH + x` of this click.
    pub fn pos(&self) -> usize {
        self.y * WIDTH + self.x
    }
}

impl fmt::Display for Click {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x:{}, y:{})", self.x, self.y)
    }
}

/// One connected group found by [`Board::click_groups`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClickGroup {
    /// Representative position: the first cell of the group in row-major order.
    pub pos: usize,
    /// Color shared by every brick of the group.
    pub brick: Brick,
    /// Number of bricks in the group.
    pub size: usize,
}

impl ClickGroup {
    /// The representative position as coordinates.
    pub fn click(&self) -> Click {
        Click::from_pos(self.pos)
    }
}

/// Represents the game board as four bitplanes.
///
/// Bit `y * WIDTH + x` of plane `c` is set when the cell at `(x, y)` holds a
/// brick of color `c`. At most one plane has a given bit set; a bit clear in all
/// four planes is an empty cell. The whole state is 32 bytes, so the board is
/// `Copy` and the search duplicates it freely instead of undoing moves.
///
/// Equality compares the full plane contents. `Hash` feeds only the 32-bit
/// [`Board::fingerprint`], so hashed collections resolve fingerprint collisions
/// through `Eq`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Board {
    planes: [u64; 4],
}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.fingerprint());
    }
}

impl Board {
    /// Creates a new board with every cell empty.
    ///
    /// # Examples
    /// ```
    /// use former_solver::engine::Board;
    /// let board = Board::new_empty();
    /// assert!(board.is_empty());
    /// assert_eq!(board.brick_at(0).unwrap(), None);
    /// ```
    pub fn new_empty() -> Self {
        Board::default()
    }

    /// Creates a board from raw bitplanes, indexed by [`Brick::plane`].
    ///
    /// # Returns
    /// * `Ok(Board)` when the planes only use the 63 grid bits and no two planes
    ///   share a bit.
    /// * `Err(FormerError::InvalidShape)` otherwise.
    pub fn from_planes(planes: [u64; 4]) -> FormerResult<Self> {
        let mut seen = 0u64;
        for (index, plane) in planes.iter().enumerate() {
            if plane & !FULL_MASK != 0 {
                return Err(FormerError::InvalidShape {
                    message: format!("plane {} has bits beyond cell {}", index, CELLS - 1),
                });
            }
            if plane & seen != 0 {
                let pos = (plane & seen).trailing_zeros();
                return Err(FormerError::InvalidShape {
                    message: format!("more than one color at position {}", pos),
                });
            }
            seen |= plane;
        }
        Ok(Board { planes })
    }

    /// Creates a board from a fully populated per-cell color grid, indexed
    /// `[y][x]`.
    pub fn from_grid(grid: &[[Option<Brick>; WIDTH]; HEIGHT]) -> Self {
        let mut board = Board::new_empty();
        for (y, row) in grid.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if let Some(brick) = cell {
                    board.planes[brick.plane()] |= 1 << (y * WIDTH + x);
                }
            }
        }
        board
    }

    /// Creates a full board with every cell drawn uniformly from the four
    /// colors, in row-major order.
    ///
    /// The same generator state always yields the same board, so a seeded
    /// `SmallRng` gives reproducible boards.
    pub fn random(rng: &mut impl Rng) -> Self {
        let mut board = Board::new_empty();
        for pos in 0..CELLS {
            let brick = Brick::ALL[rng.gen_range(0..Brick::ALL.len())];
            board.planes[brick.plane()] |= 1 << pos;
        }
        board
    }

    /// The raw bitplanes, indexed by [`Brick::plane`].
    pub fn planes(&self) -> [u64; 4] {
        self.planes
    }

    /// Returns the brick at the linear position `pos`.
    ///
    /// # Returns
    /// * `Ok(Some(brick))` for an occupied cell, `Ok(None)` for an empty one.
    /// * `Err(FormerError::PositionOutOfRange)` if `pos >= CELLS`.
    pub fn brick_at(&self, pos: usize) -> FormerResult<Option<Brick>> {
        if pos >= CELLS {
            return Err(FormerError::PositionOutOfRange { pos });
        }
        let mask = 1u64 << pos;
        Ok(Brick::ALL
            .into_iter()
            .find(|brick| self.planes[brick.plane()] & mask != 0))
    }

    /// Returns the brick at column `x`, row `y`.
    ///
    /// # Returns
    /// `Err(FormerError::CoordinatesOutOfRange)` if `x >= WIDTH` or `y >= HEIGHT`.
    pub fn brick_at_xy(&self, x: usize, y: usize) -> FormerResult<Option<Brick>> {
        if x >= WIDTH || y >= HEIGHT {
            return Err(FormerError::CoordinatesOutOfRange { x, y });
        }
        self.brick_at(y * WIDTH + x)
    }

    /// Places `brick` at `pos`, or empties the cell when `brick` is `None`.
    ///
    /// The cell is cleared in every plane first, so a cell never holds two colors.
    pub fn set_brick(&mut self, pos: usize, brick: Option<Brick>) -> FormerResult<()> {
        if pos >= CELLS {
            return Err(FormerError::PositionOutOfRange { pos });
        }
        let mask = 1u64 << pos;
        for plane in self.planes.iter_mut() {
            *plane &= !mask;
        }
        if let Some(brick) = brick {
            self.planes[brick.plane()] |= mask;
        }
        Ok(())
    }

    /// Bitmask of every occupied cell.
    pub fn occupied(&self) -> u64 {
        self.planes[0] | self.planes[1] | self.planes[2] | self.planes[3]
    }

    /// Returns `true` when no cell holds a brick.
    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    /// Number of bricks left on the board.
    pub fn brick_count(&self) -> usize {
        self.occupied().count_ones() as usize
    }

    /// 32-bit FNV-1a hash over the little-endian bytes of the four planes.
    ///
    /// Deterministic across runs and platforms; identical planes always give the
    /// same value. Distinct boards can collide, so this is only a bucketing key.
    pub fn fingerprint(&self) -> u32 {
        const OFFSET_BASIS: u32 = 0x811c_9dc5;
        const PRIME: u32 = 0x0100_0193;

        let mut hash = OFFSET_BASIS;
        for plane in &self.planes {
            for byte in plane.to_le_bytes() {
                hash ^= byte as u32;
                hash = hash.wrapping_mul(PRIME);
            }
        }
        hash
    }

    /// Flood-fills the same-colored region containing `pos`.
    ///
    /// The region grows one step in all four directions per iteration, masked by
    /// the color's plane. Horizontal steps drop bits that would wrap from one
    /// row's end onto the next row's start. Returns `None` for an empty cell.
    fn component(&self, pos: usize) -> Option<(Brick, u64)> {
        let seed = 1u64 << pos;
        let brick = Brick::ALL
            .into_iter()
            .find(|brick| self.planes[brick.plane()] & seed != 0)?;
        let plane = self.planes[brick.plane()];

        let mut region = seed;
        loop {
            let grown = (region
                | (region >> WIDTH)
                | (region << WIDTH)
                | ((region & !FIRST_COLUMN) >> 1)
                | ((region & !LAST_COLUMN) << 1))
                & plane;
            if grown == region {
                return Some((brick, region));
            }
            region = grown;
        }
    }

    /// Removes the connected group of same-colored bricks containing `pos`.
    ///
    /// Groups of a single brick are valid and are removed too. Clicking an empty
    /// cell leaves the board untouched.
    ///
    /// # Returns
    /// * `Ok(n)` with the number of bricks removed (0 for an empty cell).
    /// * `Err(FormerError::PositionOutOfRange)` if `pos >= CELLS`.
    pub fn remove_group(&mut self, pos: usize) -> FormerResult<usize> {
        if pos >= CELLS {
            return Err(FormerError::PositionOutOfRange { pos });
        }
        Ok(self.take_component(pos))
    }

    fn take_component(&mut self, pos: usize) -> usize {
        match self.component(pos) {
            Some((brick, region)) => {
                self.planes[brick.plane()] &= !region;
                region.count_ones() as usize
            }
            None => 0,
        }
    }

    /// Finds every connected group on the board.
    ///
    /// Cells are scanned in ascending row-major order (position 0 first), and each
    /// group is reported once, represented by the first of its cells the scan
    /// reaches: the top-most, then left-most brick of the group. This order is
    /// stable and is what the search records as click positions.
    ///
    /// # Returns
    /// An empty vector for an empty board; otherwise one `ClickGroup` per
    /// connected component, singletons included.
    pub fn click_groups(&self) -> Vec<ClickGroup> {
        let mut groups = Vec::new();
        let mut unvisited = self.occupied();

        while unvisited != 0 {
            let pos = unvisited.trailing_zeros() as usize;
            match self.component(pos) {
                Some((brick, region)) => {
                    unvisited &= !region;
                    groups.push(ClickGroup {
                        pos,
                        brick,
                        size: region.count_ones() as usize,
                    });
                }
                None => unvisited &= !(1 << pos),
            }
        }
        groups
    }

    /// Applies gravity to the board column by column.
    ///
    /// The bricks of each column are collected top to bottom and written back
    /// packed against the bottom row in the same relative order, leaving the
    /// empty cells above them. Columns never interact.
    pub fn apply_gravity(&mut self) {
        for x in 0..WIDTH {
            let mut column = [None; HEIGHT];
            let mut count = 0;
            for y in 0..HEIGHT {
                let mask = 1u64 << (y * WIDTH + x);
                if let Some(brick) = Brick::ALL
                    .into_iter()
                    .find(|brick| self.planes[brick.plane()] & mask != 0)
                {
                    column[count] = Some(brick);
                    count += 1;
                }
            }
            if count == 0 || count == HEIGHT {
                continue;
            }

            let column_bits = column_mask(x);
            for plane in self.planes.iter_mut() {
                *plane &= !column_bits;
            }
            let top = HEIGHT - count;
            for (offset, brick) in column[..count].iter().flatten().enumerate() {
                self.planes[brick.plane()] |= 1 << ((top + offset) * WIDTH + x);
            }
        }
    }

    /// Processes a click: removes the group at `pos`, then applies gravity.
    ///
    /// # Returns
    /// The number of bricks removed, or `Err(FormerError::PositionOutOfRange)`.
    pub fn click(&mut self, pos: usize) -> FormerResult<usize> {
        if pos >= CELLS {
            return Err(FormerError::PositionOutOfRange { pos });
        }
        Ok(self.apply_click(pos))
    }

    /// `click` for a position already known to be on the grid.
    pub(crate) fn apply_click(&mut self, pos: usize) -> usize {
        debug_assert!(pos < CELLS);
        let removed = self.take_component(pos);
        if removed > 0 {
            self.apply_gravity();
        }
        removed
    }

    /// Generates a string representation of the board with an optional highlighted position.
    ///
    /// The output includes row and column numbers and uses ANSI escape codes for
    /// brick colors. The highlighted cell, if any, is drawn as `..` instead of
    /// blank space.
    pub fn to_string_with_highlight(&self, highlight: Option<usize>) -> String {
        let mut output = String::new();

        output.push_str("  ");
        for x in 0..WIDTH {
            output.push_str(&format!("{:<2}", x));
        }
        output.push('\n');

        for y in 0..HEIGHT {
            output.push_str(&format!("{:<2}", y));
            for x in 0..WIDTH {
                let pos = y * WIDTH + x;
                let color_code = match self.brick_at(pos) {
                    Ok(Some(brick)) => brick.to_ansi_color_code(),
                    _ => "40",
                };
                let content = if highlight == Some(pos) { ".." } else { "  " };
                output.push_str(&format!("\x1b[1;{};m{}\x1b[m", color_code, content));
            }
            if y < HEIGHT - 1 {
                output.push('\n');
            }
        }

        output
    }

    /// Plain-text rendering, one row per line, using [`Brick::to_char`] and `.`.
    pub fn to_plain_string(&self) -> String {
        (0..HEIGHT)
            .map(|y| {
                (0..WIDTH)
                    .map(|x| match self.brick_at(y * WIDTH + x) {
                        Ok(Some(brick)) => brick.to_char(),
                        _ => '.',
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Board {
    /// Formats the board for display using `to_string_with_highlight(None)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_highlight(None))
    }
}
