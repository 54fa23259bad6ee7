use crate::chess::{Color, Fen, File, Rank, Square};
use derive_more::{Display, Error, From};
use image::{codecs::png::PngEncoder, ColorType, ImageEncoder, Rgb, RgbImage};
use tracing::instrument;

mod glyph;
mod highlights;

pub use glyph::*;
pub use highlights::*;

/// The reason why the board image could not be rendered.
#[derive(Debug, Display, Error, From)]
#[display(fmt = "failed to encode the board image")]
pub struct RenderError(image::ImageError);

/// The colors used to paint the board.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Palette {
    pub light: Rgb<u8>,
    pub dark: Rgb<u8>,
    pub light_highlight: Rgb<u8>,
    pub dark_highlight: Rgb<u8>,
    pub white: Rgb<u8>,
    pub black: Rgb<u8>,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            light: Rgb([240, 217, 181]),
            dark: Rgb([181, 136, 99]),
            light_highlight: Rgb([205, 210, 106]),
            dark_highlight: Rgb([170, 162, 58]),
            white: Rgb([255, 255, 255]),
            black: Rgb([0, 0, 0]),
        }
    }
}

/// Renders board positions as PNG images.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct Renderer {
    palette: Palette,
}

impl Renderer {
    /// The width of each square in pixels.
    pub const SQUARE: u32 = 60;

    /// The width of the board in pixels.
    pub const SIZE: u32 = Self::SQUARE * 8;

    const CELL: u32 = Self::SQUARE / Glyph::SIZE as u32;

    /// Constructs a [`Renderer`] with a custom [`Palette`].
    pub fn new(palette: Palette) -> Self {
        Renderer { palette }
    }

    /// The [`Square`] depicted at pixel `(x, y)`, with the eighth rank at the top.
    fn square_at(x: u32, y: u32) -> Square {
        let file = File::new((x / Self::SQUARE) as u8);
        let rank = Rank::new((7 - y / Self::SQUARE) as u8);
        match Option::zip(file, rank) {
            Some((f, r)) => Square::new(f, r),
            None => unreachable!(),
        }
    }

    fn background(&self, sq: Square, highlights: &Highlights) -> Rgb<u8> {
        let is_dark = (sq.file().index() + sq.rank().index()) % 2 == 0;
        match (is_dark, highlights.contains(sq)) {
            (true, false) => self.palette.dark,
            (false, false) => self.palette.light,
            (true, true) => self.palette.dark_highlight,
            (false, true) => self.palette.light_highlight,
        }
    }

    /// Paints the board with the pieces of a [`Fen`] and tints the [`Highlights`].
    pub fn draw(&self, fen: &Fen, highlights: &Highlights) -> RgbImage {
        RgbImage::from_fn(Self::SIZE, Self::SIZE, |x, y| {
            let sq = Self::square_at(x, y);
            let background = self.background(sq, highlights);

            let piece = match fen.piece_at(sq) {
                None => return background,
                Some(p) => p,
            };

            let (body, outline) = match piece.color() {
                Color::White => (self.palette.white, self.palette.black),
                Color::Black => (self.palette.black, self.palette.white),
            };

            let row = ((y % Self::SQUARE) / Self::CELL) as usize;
            let col = ((x % Self::SQUARE) / Self::CELL) as usize;
            match Glyph::of(piece.role()).cell(row, col) {
                Cell::Body => body,
                Cell::Outline => outline,
                Cell::Empty => background,
            }
        })
    }

    /// Renders the position as a PNG image.
    #[instrument(level = "debug", skip(self), err)]
    pub fn render(&self, fen: &Fen, highlights: &Highlights) -> Result<Vec<u8>, RenderError> {
        let image = self.draw(fen, highlights);
        let mut png = Vec::new();
        PngEncoder::new(&mut png).write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ColorType::Rgb8,
        )?;

        Ok(png)
    }
}
