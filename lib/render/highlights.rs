use crate::chess::Square;
use derive_more::Deref;
use std::{convert::Infallible, fmt, str::FromStr};
use test_strategy::Arbitrary;

/// An ordered list of [`Square`]s to be tinted on the board image.
///
/// Duplicates are allowed and have no further effect.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deref, Arbitrary)]
pub struct Highlights(Vec<Square>);

impl Highlights {
    /// Parses a comma separated list of square labels, such as `e2,e4`.
    ///
    /// Labels are matched exactly and case-sensitively, those that name no square are dropped.
    pub fn parse(s: &str) -> Self {
        s.split(',')
            .filter(|label| !label.is_empty())
            .filter_map(|label| label.parse().ok())
            .collect()
    }

    /// Whether a [`Square`] is highlighted.
    pub fn contains(&self, sq: Square) -> bool {
        self.0.contains(&sq)
    }
}

impl FromIterator<Square> for Highlights {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        Highlights(iter.into_iter().collect())
    }
}

impl FromStr for Highlights {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Highlights::parse(s))
    }
}

/// Prints the squares as a comma separated list of labels.
impl fmt::Display for Highlights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sq) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }

            fmt::Display::fmt(sq, f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn parse_skips_empty_and_unknown_labels() {
        assert_eq!(
            Highlights::parse("a1,b2,,zz,c3"),
            Highlights(vec![Square::A1, Square::B2, Square::C3])
        );
    }

    #[test]
    fn parse_of_empty_string_is_empty() {
        assert_eq!(Highlights::parse(""), Highlights::default());
    }

    #[test]
    fn parse_is_case_sensitive_and_exact() {
        assert_eq!(Highlights::parse("A1,e4 ,e44, e4"), Highlights::default());
    }

    #[test]
    fn parse_preserves_order_and_duplicates() {
        assert_eq!(
            Highlights::parse("e4,e2,e4"),
            Highlights(vec![Square::E4, Square::E2, Square::E4])
        );
    }

    #[proptest]
    fn parsing_printed_highlights_is_an_identity(h: Highlights) {
        assert_eq!(Highlights::parse(&h.to_string()), h);
    }

    #[proptest]
    fn parse_never_panics(s: String) {
        let _ = Highlights::parse(&s);
    }

    #[proptest]
    fn contains_every_listed_square(h: Highlights) {
        for sq in h.iter() {
            assert!(h.contains(*sq));
        }
    }
}
