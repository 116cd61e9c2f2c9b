use std::fmt;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use super::Cell;
use crate::error::GameError;

/// Chebyshev radius around the first click that never receives a mine.
pub const OPENING_RADIUS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Continue,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

/// Square Minesweeper board with lazy mine placement.
///
/// Cells are stored row-major: index `x * size + y`.
#[derive(Debug, Clone)]
pub struct Board {
    size: usize,
    mine_count: usize,
    cells: Vec<Cell>,
    /// Aligned with the action universe; true while a cell can still be opened.
    selectable: Vec<bool>,
    revealed_count: usize,
    flag_count: usize,
    mines_pending: bool,
    status: GameStatus,
    rng: StdRng,
}

impl Board {
    /// Create an empty board whose mines are placed on the first reveal.
    pub fn new(size: usize, mine_count: usize) -> Result<Self, GameError> {
        Self::with_rng(size, mine_count, StdRng::from_os_rng())
    }

    /// Like [`Board::new`], but mine placement is reproducible.
    pub fn with_seed(size: usize, mine_count: usize, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(size, mine_count, StdRng::seed_from_u64(seed))
    }

    /// Create a board with a fixed mine layout. Lazy placement is re-armed by
    /// [`Board::restart`].
    pub fn with_mines(size: usize, mines: &[(usize, usize)]) -> Result<Self, GameError> {
        validate_size(size)?;
        let mut cells = vec![Cell::Hidden; size * size];
        for &(x, y) in mines {
            if x >= size || y >= size {
                return Err(GameError::InvalidCoords { x, y, size });
            }
            cells[x * size + y] = Cell::MineHidden;
        }
        let mine_count = cells.iter().filter(|c| c.has_mine()).count();
        validate_mine_count(size, mine_count)?;

        let mut board = Self::with_rng(size, mine_count, StdRng::from_os_rng())?;
        board.cells = cells;
        board.mines_pending = false;
        Ok(board)
    }

    fn with_rng(size: usize, mine_count: usize, rng: StdRng) -> Result<Self, GameError> {
        validate_size(size)?;
        validate_mine_count(size, mine_count)?;
        let cell_count = size * size;
        Ok(Board {
            size,
            mine_count,
            cells: vec![Cell::Hidden; cell_count],
            selectable: vec![true; cell_count],
            revealed_count: 0,
            flag_count: 0,
            mines_pending: true,
            status: GameStatus::Continue,
            rng,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn flag_count(&self) -> usize {
        self.flag_count
    }

    /// Mines minus flags; negative when the player over-flags.
    pub fn mines_left(&self) -> isize {
        self.mine_count as isize - self.flag_count as isize
    }

    /// Number of opened safe cells.
    pub fn score(&self) -> usize {
        self.revealed_count
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status != GameStatus::Continue
    }

    /// Whether mines are still waiting for the first reveal.
    pub fn mines_pending(&self) -> bool {
        self.mines_pending
    }

    /// Get the cell at `(x, y)`. Panics when out of bounds.
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.cells[self.index(x, y)]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// One entry per action index; true while that cell can still be opened.
    pub fn action_mask(&self) -> &[bool] {
        &self.selectable
    }

    /// Action indices of cells that have not been opened yet.
    pub fn unrevealed_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.selectable
            .iter()
            .enumerate()
            .filter_map(|(i, &open)| open.then_some(i))
    }

    pub fn index(&self, x: usize, y: usize) -> usize {
        x * self.size + y
    }

    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.size, index % self.size)
    }

    fn checked_index(&self, x: usize, y: usize) -> Result<usize, GameError> {
        if x >= self.size || y >= self.size {
            return Err(GameError::InvalidCoords {
                x,
                y,
                size: self.size,
            });
        }
        Ok(self.index(x, y))
    }

    /// Cells within `depth` steps of `(x, y)` on both axes, excluding itself.
    pub fn neighbors(&self, x: usize, y: usize, depth: usize) -> impl Iterator<Item = (usize, usize)> {
        neighbors(self.size, x, y, depth)
    }

    /// Count of mines in the 8-neighborhood of `(x, y)`.
    pub fn adjacent_mines(&self, x: usize, y: usize) -> u8 {
        self.neighbors(x, y, 1)
            .filter(|&(i, j)| self.cells[self.index(i, j)].has_mine())
            .count() as u8
    }

    /// Scatter the mines uniformly over every cell outside the opening area
    /// around `first_click`. Does nothing once mines are placed.
    pub fn place_mines(&mut self, first_click: (usize, usize)) -> Result<(), GameError> {
        let (fx, fy) = first_click;
        self.checked_index(fx, fy)?;
        if !self.mines_pending {
            return Ok(());
        }

        let mut excluded = vec![false; self.cell_count()];
        excluded[self.index(fx, fy)] = true;
        for (i, j) in self.neighbors(fx, fy, OPENING_RADIUS) {
            excluded[self.index(i, j)] = true;
        }
        let candidates: Vec<usize> = (0..self.cell_count()).filter(|&i| !excluded[i]).collect();
        if candidates.len() < self.mine_count {
            return Err(GameError::NotEnoughSafeCells {
                mines: self.mine_count,
                available: candidates.len(),
            });
        }

        for pick in index::sample(&mut self.rng, candidates.len(), self.mine_count).iter() {
            let idx = candidates[pick];
            self.cells[idx] = match self.cells[idx] {
                Cell::Flagged => Cell::MineFlagged,
                _ => Cell::MineHidden,
            };
        }
        self.mines_pending = false;
        log::debug!(
            "placed {} mines on {}x{} board, opening at ({}, {})",
            self.mine_count,
            self.size,
            self.size,
            fx,
            fy
        );
        Ok(())
    }

    /// Open the cell at `(x, y)`, cascading through zero-count regions.
    pub fn reveal(&mut self, x: usize, y: usize) -> Result<RevealOutcome, GameError> {
        let idx = self.checked_index(x, y)?;
        if self.is_terminal() || !matches!(self.cells[idx], Cell::Hidden | Cell::MineHidden) {
            return Ok(RevealOutcome::NoChange);
        }

        if self.mines_pending {
            self.place_mines((x, y))?;
        }

        if self.cells[idx] == Cell::MineHidden {
            self.explode(idx);
            return Ok(RevealOutcome::HitMine);
        }

        self.flood_reveal(idx);

        if self.revealed_count == self.cell_count() - self.mine_count {
            self.status = GameStatus::Won;
            Ok(RevealOutcome::Won)
        } else {
            Ok(RevealOutcome::Revealed)
        }
    }

    /// Reveal by action index (row-major).
    pub fn reveal_index(&mut self, index: usize) -> Result<RevealOutcome, GameError> {
        let (x, y) = self.coords(index);
        self.reveal(x, y)
    }

    fn flood_reveal(&mut self, start: usize) {
        let size = self.size;
        let mut worklist = vec![start];

        while let Some(idx) = worklist.pop() {
            if self.cells[idx] != Cell::Hidden {
                continue;
            }
            let (x, y) = self.coords(idx);
            let count = self.adjacent_mines(x, y);
            self.cells[idx] = Cell::Revealed(count);
            self.selectable[idx] = false;
            self.revealed_count += 1;

            if count == 0 {
                worklist.extend(
                    neighbors(size, x, y, 1)
                        .map(|(i, j)| i * size + j)
                        .filter(|&n| self.cells[n] == Cell::Hidden),
                );
            }
        }
    }

    fn explode(&mut self, triggered: usize) {
        for (idx, cell) in self.cells.iter_mut().enumerate() {
            match *cell {
                Cell::MineHidden => *cell = Cell::MineExploded,
                Cell::MineFlagged => {
                    *cell = Cell::MineExploded;
                    self.flag_count -= 1;
                }
                _ => continue,
            }
            self.selectable[idx] = false;
        }
        self.status = GameStatus::Lost;
        let (x, y) = self.coords(triggered);
        log::debug!("mine triggered at ({}, {})", x, y);
    }

    /// Mark a hidden cell as flagged.
    pub fn flag(&mut self, x: usize, y: usize) -> Result<MarkOutcome, GameError> {
        let idx = self.checked_index(x, y)?;
        if self.is_terminal() {
            return Ok(MarkOutcome::NoChange);
        }
        let flagged = match self.cells[idx] {
            Cell::Hidden => Cell::Flagged,
            Cell::MineHidden => Cell::MineFlagged,
            _ => return Ok(MarkOutcome::NoChange),
        };
        self.cells[idx] = flagged;
        self.flag_count += 1;
        Ok(MarkOutcome::Changed)
    }

    /// Remove a flag, restoring the hidden state underneath.
    pub fn unflag(&mut self, x: usize, y: usize) -> Result<MarkOutcome, GameError> {
        let idx = self.checked_index(x, y)?;
        if self.is_terminal() {
            return Ok(MarkOutcome::NoChange);
        }
        let hidden = match self.cells[idx] {
            Cell::Flagged => Cell::Hidden,
            Cell::MineFlagged => Cell::MineHidden,
            _ => return Ok(MarkOutcome::NoChange),
        };
        self.cells[idx] = hidden;
        self.flag_count -= 1;
        Ok(MarkOutcome::Changed)
    }

    /// Flag a hidden cell or unflag a flagged one.
    pub fn toggle_flag(&mut self, x: usize, y: usize) -> Result<MarkOutcome, GameError> {
        let idx = self.checked_index(x, y)?;
        if self.cells[idx].is_flagged() {
            self.unflag(x, y)
        } else {
            self.flag(x, y)
        }
    }

    /// Return to an all-hidden board; mines are placed again on the next reveal.
    pub fn restart(&mut self) {
        self.cells.fill(Cell::Hidden);
        self.selectable.fill(true);
        self.revealed_count = 0;
        self.flag_count = 0;
        self.mines_pending = true;
        self.status = GameStatus::Continue;
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size) {
            let line: Vec<String> = row.iter().map(|c| c.symbol().to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

fn validate_size(size: usize) -> Result<(), GameError> {
    if size == 0 {
        return Err(GameError::InvalidSize(size));
    }
    Ok(())
}

fn validate_mine_count(size: usize, mines: usize) -> Result<(), GameError> {
    let cells = size * size;
    if mines >= cells {
        return Err(GameError::TooManyMines { mines, cells });
    }
    Ok(())
}

fn neighbors(
    size: usize,
    x: usize,
    y: usize,
    depth: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let rows = x.saturating_sub(depth)..=(x + depth).min(size - 1);
    let cols = y.saturating_sub(depth)..=(y + depth).min(size - 1);
    rows.flat_map(move |i| cols.clone().map(move |j| (i, j)))
        .filter(move |&pos| pos != (x, y))
}
