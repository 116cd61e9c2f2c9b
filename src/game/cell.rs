/// State of a single board position.
///
/// Mine-bearing cells carry their own variants so a hidden mine can never be
/// confused with an empty hidden cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Hidden,
    Flagged,
    MineHidden,
    MineFlagged,
    MineExploded,
    /// Safe cell that has been opened, with its adjacent mine count (0..=8).
    Revealed(u8),
}

impl Cell {
    pub const fn has_mine(self) -> bool {
        matches!(self, Cell::MineHidden | Cell::MineFlagged | Cell::MineExploded)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Cell::Flagged | Cell::MineFlagged)
    }

    /// Hidden from the player: neither opened nor exploded.
    pub const fn is_unknown(self) -> bool {
        matches!(
            self,
            Cell::Hidden | Cell::Flagged | Cell::MineHidden | Cell::MineFlagged
        )
    }

    /// Character shown to the player. Mines stay hidden until they explode.
    pub fn symbol(self) -> char {
        match self {
            Cell::Hidden | Cell::MineHidden => '#',
            Cell::Flagged | Cell::MineFlagged => 'F',
            Cell::MineExploded => '*',
            Cell::Revealed(0) => '.',
            Cell::Revealed(k) => char::from(b'0' + k),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Hidden
    }
}
