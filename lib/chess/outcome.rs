use crate::chess::Color;
use derive_more::Display;

/// The reason why a game was drawn.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum DrawReason {
    #[display(fmt = "insufficient material")]
    InsufficientMaterial,

    #[display(fmt = "the 50-move rule")]
    FiftyMoveRule,

    #[display(fmt = "threefold repetition")]
    ThreefoldRepetition,

    #[display(fmt = "agreement")]
    Agreement,
}

/// One of the possible outcomes of a chess game.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum Outcome {
    #[display(fmt = "checkmate by the {} player", _0)]
    Checkmate(Color),

    #[display(fmt = "stalemate")]
    Stalemate,

    #[display(fmt = "draw by {}", _0)]
    Draw(DrawReason),

    #[display(fmt = "the {} player won by resignation", _0)]
    Resignation(Color),

    #[display(fmt = "the {} player won on time", _0)]
    Timeout(Color),
}

impl Outcome {
    /// Whether the outcome is a [draw] and neither side has won.
    ///
    /// [draw]: https://www.chessprogramming.org/Draw
    pub fn is_draw(&self) -> bool {
        !self.is_decisive()
    }

    /// Whether the outcome is a decisive and one of the sides has won.
    pub fn is_decisive(&self) -> bool {
        self.winner().is_some()
    }

    /// The winning side, if the outcome is [decisive](`Self::is_decisive`).
    pub fn winner(&self) -> Option<Color> {
        match *self {
            Outcome::Checkmate(c) | Outcome::Resignation(c) | Outcome::Timeout(c) => Some(c),
            Outcome::Stalemate | Outcome::Draw(_) => None,
        }
    }
}
