use derive_more::Constructor;
use lib::chess::{Board, Color, File, Piece, Rank, Role, Square};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// The set of symbols used to draw pieces.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(rename_all = "lowercase")]
pub enum Glyphs {
    /// Chess symbols, e.g. `♔`.
    #[default]
    Unicode,

    /// Two letter codes, e.g. `wK`.
    Ascii,
}

impl Glyphs {
    /// The symbol that represents a [`Piece`].
    pub fn glyph(&self, p: Piece) -> String {
        match self {
            Glyphs::Unicode => unicode(p).to_string(),
            Glyphs::Ascii => {
                let c = match p.color() {
                    Color::White => 'w',
                    Color::Black => 'b',
                };

                format!("{}{}", c, p.role().to_string().to_ascii_uppercase())
            }
        }
    }
}

fn unicode(p: Piece) -> char {
    use {Color::*, Role::*};

    match (p.color(), p.role()) {
        (White, King) => '♔',
        (White, Queen) => '♕',
        (White, Rook) => '♖',
        (White, Bishop) => '♗',
        (White, Knight) => '♘',
        (White, Pawn) => '♙',
        (Black, King) => '♚',
        (Black, Queen) => '♛',
        (Black, Rook) => '♜',
        (Black, Bishop) => '♝',
        (Black, Knight) => '♞',
        (Black, Pawn) => '♟',
    }
}

/// A printable diagram of a [`Board`].
#[derive(Debug, Copy, Clone, Constructor)]
pub struct Diagram<'a> {
    board: &'a Board,
    glyphs: Glyphs,
}

impl Display for Diagram<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "  ")?;
        for file in File::iter() {
            write!(f, "   {}", file)?;
        }

        writeln!(f)?;
        writeln!(f, "   +---+---+---+---+---+---+---+---+")?;

        for rank in Rank::iter().rev() {
            write!(f, " {} |", rank)?;

            for file in File::iter() {
                match self.board[Square(file, rank)] {
                    Some(p) => write!(f, "{:^3}|", self.glyphs.glyph(p))?,
                    None => write!(f, "   |")?,
                }
            }

            writeln!(f, " {}", rank)?;
            writeln!(f, "   +---+---+---+---+---+---+---+---+")?;
        }

        write!(f, "  ")?;
        for file in File::iter() {
            write!(f, "   {}", file)?;
        }

        Ok(())
    }
}
