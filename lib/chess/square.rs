use crate::chess::{File, ParseFileError, ParseRankError, Rank};
use derive_more::{Display, Error, From};
use std::str::FromStr;

/// A square on the chess board.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[display(fmt = "{}{}", _0, _1)]
pub struct Square(pub File, pub Rank);

impl Square {
    /// Constructs [`Square`] from a pair of [`File`] and [`Rank`].
    pub fn new(f: File, r: Rank) -> Self {
        Square(f, r)
    }

    /// This square's [`File`].
    pub fn file(&self) -> File {
        self.0
    }

    /// This square's [`Rank`].
    pub fn rank(&self) -> Rank {
        self.1
    }

    /// The square displaced by a number of files and ranks, if still on the board.
    pub fn offset(&self, files: i8, ranks: i8) -> Option<Self> {
        let f = File::from_index(self.file().index().checked_add(files)?)?;
        let r = Rank::from_index(self.rank().index().checked_add(ranks)?)?;
        Some(Square(f, r))
    }

    /// Whether this is a light square.
    pub fn is_light(&self) -> bool {
        (self.file().index() + self.rank().index()) % 2 == 1
    }

    /// Returns an iterator over all squares, rank by rank starting from `a1`.
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        Rank::iter().flat_map(|r| File::iter().map(move |f| Square(f, r)))
    }
}

/// The reason why parsing [`Square`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum ParseSquareError {
    #[display(fmt = "failed to parse square")]
    InvalidFile(ParseFileError),
    #[display(fmt = "failed to parse square")]
    InvalidRank(ParseRankError),
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let i = s.char_indices().nth(1).map_or_else(|| s.len(), |(i, _)| i);
        Ok(Square(s[..i].parse()?, s[i..].parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;
    use test_strategy::proptest;

    #[test]
    fn square_guarantees_zero_value_optimization() {
        assert_eq!(size_of::<Option<Square>>(), size_of::<Square>());
    }

    #[proptest]
    fn new_constructs_square_from_pair_of_file_and_rank(sq: Square) {
        assert_eq!(Square::new(sq.file(), sq.rank()), sq);
    }

    #[test]
    fn iter_returns_all_squares_once() {
        let squares = Vec::from_iter(Square::iter());
        assert_eq!(squares.len(), 64);
        assert_eq!(squares.first(), Some(&Square(File::A, Rank::First)));
        assert_eq!(squares.last(), Some(&Square(File::H, Rank::Eighth)));

        let mut sorted = squares.clone();
        sorted.sort_by_key(|sq| (sq.rank(), sq.file()));
        sorted.dedup();
        assert_eq!(sorted, squares);
    }

    #[proptest]
    fn offset_displaces_file_and_rank(
        sq: Square,
        #[strategy(-8i8..=8)] files: i8,
        #[strategy(-8i8..=8)] ranks: i8,
    ) {
        match sq.offset(files, ranks) {
            Some(to) => {
                assert_eq!(to.file() - sq.file(), files);
                assert_eq!(to.rank() - sq.rank(), ranks);
            }

            None => assert!(
                !(0..8).contains(&(sq.file().index() + files))
                    || !(0..8).contains(&(sq.rank().index() + ranks))
            ),
        }
    }

    #[test]
    fn a1_is_a_dark_square() {
        assert!(!Square(File::A, Rank::First).is_light());
        assert!(Square(File::H, Rank::First).is_light());
    }

    #[proptest]
    fn adjacent_squares_have_different_colors(#[filter(#sq.file() != File::H)] sq: Square) {
        assert_ne!(sq.is_light(), sq.offset(1, 0).unwrap().is_light());
    }

    #[test]
    fn a1_parses_to_first_file_and_first_rank() {
        let sq: Square = "a1".parse().unwrap();
        assert_eq!((sq.file().index(), sq.rank().index()), (0, 0));
        assert_eq!(sq.to_string(), "a1");
    }

    #[proptest]
    fn parsing_printed_square_is_an_identity(sq: Square) {
        assert_eq!(sq.to_string().parse(), Ok(sq));
    }

    #[proptest]
    fn parsing_square_fails_if_file_invalid(
        #[filter(!('a'..='h').contains(&#c))] c: char,
        r: Rank,
    ) {
        assert_eq!(
            [c.to_string(), r.to_string()].concat().parse::<Square>(),
            Err(ParseSquareError::InvalidFile(ParseFileError))
        );
    }

    #[proptest]
    fn parsing_square_fails_if_rank_invalid(
        f: File,
        #[filter(!('1'..='8').contains(&#c))] c: char,
    ) {
        assert_eq!(
            [f.to_string(), c.to_string()].concat().parse::<Square>(),
            Err(ParseSquareError::InvalidRank(ParseRankError))
        );
    }

    #[proptest]
    fn parsing_square_fails_if_length_not_two(#[filter(#s.len() != 2)] s: String) {
        assert_eq!(s.parse::<Square>().ok(), None);
    }
}
