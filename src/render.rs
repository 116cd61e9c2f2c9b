use std::io::Write;

use crate::game::Board;

/// Receives a frame after every action that changed the board.
pub trait Renderer {
    fn render(&mut self, board: &Board);
}

/// Draws the player-visible board as text.
pub struct TextRenderer<W: Write> {
    out: W,
    frames: usize,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        TextRenderer { out, frames: 0 }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TextRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, board: &Board) {
        self.frames += 1;
        let result = write!(
            self.out,
            "{}x{} | mines left: {} | score: {} | {:?}\n{}\n",
            board.size(),
            board.size(),
            board.mines_left(),
            board.score(),
            board.status(),
            board
        )
        .and_then(|_| self.out.flush());
        if let Err(e) = result {
            log::warn!("failed to render frame {}: {}", self.frames, e);
        }
    }
}

pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _board: &Board) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_frame_hides_mines() {
        let mut board = Board::with_mines(3, &[(2, 2)]).unwrap();
        board.reveal(0, 2).unwrap();
        let mut renderer = TextRenderer::new(Vec::new());
        renderer.render(&board);
        assert_eq!(renderer.frames(), 1);

        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(text.starts_with("3x3 | mines left: 1"));
        assert!(!text.contains('*'));
    }

    #[test]
    fn test_text_frame_shows_explosion() {
        let mut board = Board::with_mines(3, &[(1, 1)]).unwrap();
        board.reveal(1, 1).unwrap();
        let mut renderer = TextRenderer::new(Vec::new());
        renderer.render(&board);
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(text.contains('*'));
        assert!(text.contains("Lost"));
    }
}
