use crate::chess::{Color, Rank, Role, Square};
use derive_more::{Display, Error};
use std::fmt::{self, Formatter};
use std::str::FromStr;

/// A chess [piece][`Role`] of a certain [`Color`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Piece(pub Color, pub Role);

impl Piece {
    /// Constructs [`Piece`] from a pair of [`Color`] and [`Role`].
    pub fn new(c: Color, r: Role) -> Self {
        Piece(c, r)
    }

    /// This piece's [`Color`].
    pub fn color(&self) -> Color {
        self.0
    }

    /// This piece's [`Role`].
    pub fn role(&self) -> Role {
        self.1
    }

    /// Whether this piece's movement pattern takes it from `whence` to `whither`.
    ///
    /// Only the geometry is considered, whatever else is on the board is ignored.
    pub fn shape_ok(&self, whence: Square, whither: Square) -> bool {
        let (df, dr) = (whither.file() - whence.file(), whither.rank() - whence.rank());

        match self.role() {
            Role::Pawn => {
                let forward = forward(self.color());
                df == 0
                    && (dr == forward
                        || dr == 2 * forward && whence.rank() == Rank::pawns(self.color()))
            }

            r => shape(r, df, dr),
        }
    }

    /// Whether this piece may capture an enemy piece standing on `whither`.
    ///
    /// Pawns capture one square diagonally forward, every other role captures
    /// the same way it moves.
    pub fn capture_shape_ok(&self, whence: Square, whither: Square) -> bool {
        let (df, dr) = (whither.file() - whence.file(), whither.rank() - whence.rank());

        match self.role() {
            Role::Pawn => df.abs() == 1 && dr == forward(self.color()),
            r => shape(r, df, dr),
        }
    }
}

/// The rank delta of a single pawn push.
fn forward(c: Color) -> i8 {
    match c {
        Color::White => 1,
        Color::Black => -1,
    }
}

fn rook(df: i8, dr: i8) -> bool {
    (df == 0) != (dr == 0)
}

fn bishop(df: i8, dr: i8) -> bool {
    df != 0 && df.abs() == dr.abs()
}

fn shape(r: Role, df: i8, dr: i8) -> bool {
    match r {
        Role::Pawn => false,
        Role::Knight => matches!((df.abs(), dr.abs()), (1, 2) | (2, 1)),
        Role::Bishop => bishop(df, dr),
        Role::Rook => rook(df, dr),
        Role::Queen => rook(df, dr) || bishop(df, dr),
        Role::King => df.abs() <= 1 && dr.abs() <= 1 && (df, dr) != (0, 0),
    }
}

/// Prints the piece as a letter in [FEN], upper case for white.
///
/// [FEN]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
impl fmt::Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.color() {
            Color::White => f.write_str(&self.role().to_string().to_ascii_uppercase()),
            Color::Black => write!(f, "{}", self.role()),
        }
    }
}

/// The reason why parsing [`Piece`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse piece, expected one of `PNBRQKpnbrqk`")]
pub struct ParsePieceError;

impl FromStr for Piece {
    type Err = ParsePieceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let role = s.to_ascii_lowercase().parse().map_err(|_| ParsePieceError)?;

        if s == s.to_ascii_lowercase() {
            Ok(Piece(Color::Black, role))
        } else {
            Ok(Piece(Color::White, role))
        }
    }
}
