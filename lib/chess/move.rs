use crate::chess::{ParseRoleError, ParseSquareError, Role, Square};
use bitflags::bitflags;
use derive_more::{Constructor, Display, Error, From};
use std::fmt::{self, Formatter};
use std::str::FromStr;

bitflags! {
    /// Characteristics of a legal [`Move`] in the context of a [`Board`][`crate::chess::Board`].
    #[derive(Default)]
    pub struct MoveKind: u8 {
        const CAPTURE =     0b00000001;
        const PROMOTION =   0b00000010;
    }
}

/// A chess move in [pure coordinate notation].
///
/// [pure coordinate notation]: https://www.chessprogramming.org/Algebraic_Chess_Notation#Pure_coordinate_notation
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Constructor)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Move {
    whence: Square,
    whither: Square,
    promotion: Option<Role>,
}

impl Move {
    /// The source [`Square`].
    pub fn whence(&self) -> Square {
        self.whence
    }

    /// The destination [`Square`].
    pub fn whither(&self) -> Square {
        self.whither
    }

    /// The [`Role`] a pawn promotes to, if any.
    pub fn promotion(&self) -> Option<Role> {
        self.promotion
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.whence, self.whither)?;

        if let Some(r) = self.promotion {
            write!(f, "{}", r)?;
        }

        Ok(())
    }
}

/// The reason why parsing [`Move`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum ParseMoveError {
    #[display(fmt = "failed to parse move")]
    InvalidSquare(ParseSquareError),
    #[display(fmt = "failed to parse move")]
    InvalidPromotion(ParseRoleError),
}

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let i = s.char_indices().nth(2).map_or_else(|| s.len(), |(i, _)| i);
        let j = s.char_indices().nth(4).map_or_else(|| s.len(), |(i, _)| i);

        let promotion = match &s[j..] {
            "" => None,
            r => Some(r.parse()?),
        };

        Ok(Move::new(s[..i].parse()?, s[i..j].parse()?, promotion))
    }
}
