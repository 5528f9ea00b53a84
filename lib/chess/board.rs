use crate::chess::{Color, File, Piece, Rank, Role, Square};
use derive_more::{Display, Error};
use std::fmt::{self, Write};
use std::{ops::Index, str::FromStr};

/// The reason why the king of a [`Color`] could not be found on the [`Board`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error)]
#[display(fmt = "the {} king is missing from the board", _0)]
pub struct MissingKing(#[error(not(source))] pub Color);

/// The piece placement on the chess board.
///
/// The board does not enforce any rules beyond holding at most one piece per square,
/// see [`rules`][`crate::chess::rules`] for that.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    /// The standard initial placement.
    fn default() -> Self {
        use Role::*;
        const BACK_RANK: [Role; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        let mut board = Board::empty();
        for (f, r) in File::iter().zip(BACK_RANK) {
            board.place(Square(f, Rank::First), Piece(Color::White, r));
            board.place(Square(f, Rank::Second), Piece(Color::White, Pawn));
            board.place(Square(f, Rank::Seventh), Piece(Color::Black, Pawn));
            board.place(Square(f, Rank::Eighth), Piece(Color::Black, r));
        }

        board
    }
}

impl Board {
    /// A board with no pieces.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// The [`Piece`] on the given [`Square`], if any.
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.rank() as usize][sq.file() as usize]
    }

    /// Places a [`Piece`] on a [`Square`], returning the piece it replaced, if any.
    pub fn place(&mut self, sq: Square, p: Piece) -> Option<Piece> {
        self.squares[sq.rank() as usize][sq.file() as usize].replace(p)
    }

    /// Clears a [`Square`], returning the piece that stood on it, if any.
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.rank() as usize][sq.file() as usize].take()
    }

    /// Relocates whatever stands on `whence` to `whither`.
    ///
    /// No rules are checked, `whence` is left empty and whatever stood on `whither` is
    /// returned.
    pub fn move_piece(&mut self, whence: Square, whither: Square) -> Option<Piece> {
        match self.remove(whence) {
            Some(p) => self.place(whither, p),
            None => self.remove(whither),
        }
    }

    /// Whether every square strictly between `whence` and `whither` is empty.
    ///
    /// The squares must share a file, rank or diagonal, otherwise there is no path
    /// between them and this function returns `false`.
    pub fn path_clear(&self, whence: Square, whither: Square) -> bool {
        let (df, dr) = (whither.file() - whence.file(), whither.rank() - whence.rank());

        if !(df == 0 || dr == 0 || df.abs() == dr.abs()) {
            debug_assert!(false, "`{}` and `{}` are not aligned", whence, whither);
            return false;
        }

        let (sf, sr) = (df.signum(), dr.signum());
        let steps = df.abs().max(dr.abs());
        (1..steps)
            .filter_map(|i| whence.offset(sf * i, sr * i))
            .all(|sq| self[sq].is_none())
    }

    /// The [`Square`] occupied by the king of a [`Color`].
    pub fn king(&self, c: Color) -> Result<Square, MissingKing> {
        let king = Piece(c, Role::King);
        self.iter()
            .find_map(|(sq, p)| (p == king).then_some(sq))
            .ok_or(MissingKing(c))
    }

    /// An iterator over all pieces on the board.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|sq| Some((sq, self[sq]?)))
    }

    /// [`Square`]s occupied by pieces of a [`Color`].
    pub fn by_color(&self, c: Color) -> impl Iterator<Item = Square> + '_ {
        self.iter()
            .filter_map(move |(sq, p)| (p.color() == c).then_some(sq))
    }

    /// [`Square`]s occupied by a [`Piece`].
    pub fn by_piece(&self, p: Piece) -> impl Iterator<Item = Square> + '_ {
        self.iter().filter_map(move |(sq, q)| (p == q).then_some(sq))
    }
}

/// Retrieves the [`Piece`] at a given [`Square`], if any.
impl Index<Square> for Board {
    type Output = Option<Piece>;

    fn index(&self, sq: Square) -> &Self::Output {
        &self.squares[sq.rank() as usize][sq.file() as usize]
    }
}

/// Prints the piece placement field of [FEN].
///
/// [FEN]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in Rank::iter().rev() {
            let mut skip = 0;
            for file in File::iter() {
                match self[Square(file, r)] {
                    None => skip += 1,
                    Some(p) => {
                        if skip > 0 {
                            write!(f, "{}", skip)?;
                            skip = 0;
                        }

                        write!(f, "{}", p)?;
                    }
                }
            }

            if skip > 0 {
                write!(f, "{}", skip)?;
            }

            if r != Rank::First {
                f.write_char('/')?;
            }
        }

        Ok(())
    }
}

/// The reason why parsing [`Board`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum ParseBoardError {
    #[display(fmt = "failed to parse piece placement, expected 8 ranks separated by `/`")]
    InvalidRankCount,
    #[display(fmt = "failed to parse piece placement, rank {} does not span 8 files", _0)]
    InvalidRankLength(#[error(not(source))] Rank),
    #[display(fmt = "failed to parse piece placement, unexpected `{}`", _0)]
    InvalidPiece(#[error(not(source))] char),
}

impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<_> = s.split('/').collect();
        if segments.len() != 8 {
            return Err(ParseBoardError::InvalidRankCount);
        }

        let mut board = Board::empty();
        for (r, segment) in Rank::iter().rev().zip(segments) {
            let mut file = 0;
            for c in segment.chars() {
                let mut buffer = [0; 4];

                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    file += skip as i8;
                } else if let Ok(p) = c.encode_utf8(&mut buffer).parse() {
                    let f = File::from_index(file).ok_or(ParseBoardError::InvalidRankLength(r))?;
                    board.place(Square(f, r), p);
                    file += 1;
                } else {
                    return Err(ParseBoardError::InvalidPiece(c));
                }

                if file > 8 {
                    return Err(ParseBoardError::InvalidRankLength(r));
                }
            }

            if file != 8 {
                return Err(ParseBoardError::InvalidRankLength(r));
            }
        }

        Ok(board)
    }
}

#[cfg(test)]
impl proptest::arbitrary::Arbitrary for Board {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Board>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        use proptest::prelude::*;

        proptest::collection::vec(proptest::option::weighted(0.25, any::<Piece>()), 64)
            .prop_map(|pieces| {
                let mut board = Board::empty();
                for (sq, p) in Square::iter().zip(pieces) {
                    if let Some(p) = p {
                        board.place(sq, p);
                    }
                }

                board
            })
            .boxed()
    }
}
