use crate::chess::Role;

/// Pixel-art silhouette of a chess piece on a coarse grid.
///
/// Each cell is either part of the body (`#`) or empty (`.`).
/// The outermost rows and columns are always empty to leave room for the outline.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Glyph(&'static [&'static str; Glyph::SIZE]);

/// How a cell of a [`Glyph`] is painted.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Cell {
    Body,
    Outline,
    Empty,
}

#[rustfmt::skip]
const PAWN: [&str; Glyph::SIZE] = [
    "...............",
    "...............",
    "...............",
    "......###......",
    ".....#####.....",
    ".....#####.....",
    "......###......",
    ".....#####.....",
    "......###......",
    "......###......",
    ".....#####.....",
    "....#######....",
    "...#########...",
    "...#########...",
    "...............",
];

#[rustfmt::skip]
const KNIGHT: [&str; Glyph::SIZE] = [
    "...............",
    "...............",
    "......#.#......",
    ".....######....",
    "....########...",
    "...####.#####..",
    "...#########...",
    "..######.###...",
    "..####..####...",
    ".......#####...",
    "......######...",
    ".....#######...",
    "....#########..",
    "....#########..",
    "...............",
];

#[rustfmt::skip]
const BISHOP: [&str; Glyph::SIZE] = [
    "...............",
    ".......#.......",
    "......###......",
    ".....##.##.....",
    ".....###.#.....",
    ".....#####.....",
    "......###......",
    ".....#####.....",
    "......###......",
    "......###......",
    ".....#####.....",
    "....#######....",
    "...####.####...",
    "...#########...",
    "...............",
];

#[rustfmt::skip]
const ROOK: [&str; Glyph::SIZE] = [
    "...............",
    "...............",
    "...#.##.##.#...",
    "...#########...",
    "...#########...",
    "....#######....",
    ".....#####.....",
    ".....#####.....",
    ".....#####.....",
    ".....#####.....",
    "....#######....",
    "...#########...",
    "...#########...",
    "...#########...",
    "...............",
];

#[rustfmt::skip]
const QUEEN: [&str; Glyph::SIZE] = [
    "...............",
    ".#....#.#....#.",
    ".##..##.##..##.",
    "..###########..",
    "..###########..",
    "...#########...",
    "....#######....",
    ".....#####.....",
    ".....#####.....",
    "....#######....",
    "...#########...",
    "...#########...",
    "..###########..",
    "..###########..",
    "...............",
];

#[rustfmt::skip]
const KING: [&str; Glyph::SIZE] = [
    "...............",
    ".......#.......",
    "......###......",
    ".......#.......",
    "...###.#.###...",
    "..#####.#####..",
    "..###########..",
    "..###########..",
    "...#########...",
    "....#######....",
    "....#######....",
    "...#########...",
    "...#########...",
    "...#########...",
    "...............",
];

impl Glyph {
    /// The number of cells along each side.
    pub const SIZE: usize = 15;

    /// The glyph that depicts a [`Role`].
    pub fn of(role: Role) -> Self {
        match role {
            Role::Pawn => Glyph(&PAWN),
            Role::Knight => Glyph(&KNIGHT),
            Role::Bishop => Glyph(&BISHOP),
            Role::Rook => Glyph(&ROOK),
            Role::Queen => Glyph(&QUEEN),
            Role::King => Glyph(&KING),
        }
    }

    fn is_body(&self, row: usize, col: usize) -> bool {
        self.0
            .get(row)
            .and_then(|r| r.as_bytes().get(col))
            .map_or(false, |&c| c == b'#')
    }

    /// How the cell at `(row, col)` is painted, counting from the top-left corner.
    ///
    /// Empty cells touching the body, diagonals included, form the outline.
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        if self.is_body(row, col) {
            return Cell::Body;
        }

        let touches_body = (row.saturating_sub(1)..=row + 1)
            .flat_map(|r| (col.saturating_sub(1)..=col + 1).map(move |c| (r, c)))
            .any(|(r, c)| self.is_body(r, c));

        if touches_body {
            Cell::Outline
        } else {
            Cell::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn glyphs_are_square(r: Role) {
        let Glyph(rows) = Glyph::of(r);
        for row in rows.iter() {
            assert_eq!(row.len(), Glyph::SIZE);
            assert!(row.bytes().all(|c| c == b'#' || c == b'.'));
        }
    }

    #[proptest]
    fn glyphs_leave_room_for_the_outline(r: Role) {
        let g = Glyph::of(r);
        for i in 0..Glyph::SIZE {
            assert!(!g.is_body(0, i));
            assert!(!g.is_body(Glyph::SIZE - 1, i));
            assert!(!g.is_body(i, 0));
            assert!(!g.is_body(i, Glyph::SIZE - 1));
        }
    }

    #[test]
    fn glyphs_are_distinct() {
        let roles = [
            Role::Pawn,
            Role::Knight,
            Role::Bishop,
            Role::Rook,
            Role::Queen,
            Role::King,
        ];

        for (i, a) in roles.iter().enumerate() {
            for b in &roles[i + 1..] {
                assert_ne!(Glyph::of(*a), Glyph::of(*b));
            }
        }
    }

    #[proptest]
    fn body_is_surrounded_by_outline(
        r: Role,
        #[strategy(1..Glyph::SIZE - 1)] row: usize,
        #[strategy(1..Glyph::SIZE - 1)] col: usize,
    ) {
        let g = Glyph::of(r);
        if g.cell(row, col) == Cell::Body {
            for (dr, dc) in [(0, 1), (2, 1), (1, 0), (1, 2)] {
                assert_ne!(g.cell(row + dr - 1, col + dc - 1), Cell::Empty);
            }
        }
    }

    #[test]
    fn corners_are_empty() {
        assert_eq!(Glyph::of(Role::Pawn).cell(0, 0), Cell::Empty);
        assert_eq!(Glyph::of(Role::Pawn).cell(2, 6), Cell::Outline);
        assert_eq!(Glyph::of(Role::Pawn).cell(3, 6), Cell::Body);
    }
}
