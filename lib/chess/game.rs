use crate::chess::{rules, Board, Color, DrawReason, IllegalMove, Move, MoveKind, Outcome};
use crate::chess::{Piece, Rank, Role};
use derive_more::{Display, Error};
use std::collections::HashMap;
use tracing::{info, instrument};

/// The reason why an action could not be performed on a [`Game`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum InvalidAction {
    #[display(fmt = "the game has already ended in {}", _0)]
    GameHasEnded(#[error(not(source))] Outcome),
    #[display(fmt = "{}", _0)]
    IllegalMove(IllegalMove),
}

impl From<IllegalMove> for InvalidAction {
    fn from(e: IllegalMove) -> Self {
        InvalidAction::IllegalMove(e)
    }
}

/// The reason why a [`Board`] cannot be used to start a [`Game`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum IllegalSetup {
    #[display(fmt = "the {} king is missing from the board", _0)]
    MissingKing(#[error(not(source))] Color),
    #[display(fmt = "there is more than one {} king on the board", _0)]
    TooManyKings(#[error(not(source))] Color),
    #[display(fmt = "pawns cannot stand on the first or eighth rank")]
    PawnsOnBackRank,
    #[display(fmt = "the side not to move is in check")]
    OppositeCheck,
}

/// A snapshot of a [`Game`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct State {
    pub turn: Color,
    pub outcome: Option<Outcome>,
    pub board: Board,
}

/// A game of chess.
///
/// Tracks the side to move and the moves played so far, and detects when the game
/// has ended. Once an [`Outcome`] is reached it never changes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Game {
    board: Board,
    turn: Color,
    history: Vec<Move>,
    outcome: Option<Outcome>,
    halfmoves: u32,
    repetitions: HashMap<(Board, Color), u32>,
}

impl Default for Game {
    fn default() -> Self {
        Self::start(Board::default(), Color::White)
    }
}

impl Game {
    /// Starts a game from a custom [`Board`] with `turn` to move.
    ///
    /// The setup may already be terminal, e.g. if the side to move is checkmated.
    pub fn new(board: Board, turn: Color) -> Result<Self, IllegalSetup> {
        for c in Color::iter() {
            match board.by_piece(Piece(c, Role::King)).count() {
                0 => return Err(IllegalSetup::MissingKing(c)),
                1 => {}
                _ => return Err(IllegalSetup::TooManyKings(c)),
            }
        }

        let back_ranks = [Rank::First, Rank::Eighth];
        if board
            .iter()
            .any(|(sq, p)| p.role() == Role::Pawn && back_ranks.contains(&sq.rank()))
        {
            return Err(IllegalSetup::PawnsOnBackRank);
        }

        if matches!(rules::is_check(&board, !turn), Ok(true)) {
            return Err(IllegalSetup::OppositeCheck);
        }

        Ok(Self::start(board, turn))
    }

    fn start(board: Board, turn: Color) -> Self {
        let mut game = Game {
            board,
            turn,
            history: Vec::new(),
            outcome: None,
            halfmoves: 0,
            repetitions: HashMap::from([((board, turn), 1)]),
        };

        game.evaluate();
        game
    }

    /// The current piece placement.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The side to move.
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// The moves played so far, in order.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// The [`Outcome`] of the game, if it has ended.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// The number of halfmoves since the last capture or pawn move.
    pub fn halfmoves(&self) -> u32 {
        self.halfmoves
    }

    /// Whether the side to move is in check.
    pub fn is_check(&self) -> bool {
        matches!(rules::is_check(&self.board, self.turn), Ok(true))
    }

    /// A snapshot of the game.
    pub fn current_state(&self) -> State {
        State {
            turn: self.turn,
            outcome: self.outcome,
            board: self.board,
        }
    }

    /// The legal moves of a side, none once the game has ended.
    pub fn legal_moves_for(&self, c: Color) -> Vec<Move> {
        match self.outcome {
            Some(_) => Vec::new(),
            None => rules::legal_moves(&self.board, c).collect(),
        }
    }

    /// Plays a move for the side to move.
    ///
    /// If the move is rejected the game is left untouched.
    #[instrument(level = "debug", skip(self), fields(turn = %self.turn), ret, err)]
    pub fn apply_move(&mut self, m: Move) -> Result<MoveKind, InvalidAction> {
        self.ensure_in_progress()?;

        let kind = rules::validate(&self.board, self.turn, m)?;
        let is_pawn = matches!(self.board[m.whence()], Some(Piece(_, Role::Pawn)));

        rules::play_unchecked(&mut self.board, m);
        self.history.push(m);
        self.turn = !self.turn;

        // Positions before a capture or pawn move can never recur.
        if is_pawn || kind.contains(MoveKind::CAPTURE) {
            self.halfmoves = 0;
            self.repetitions.clear();
        } else {
            self.halfmoves += 1;
        }

        *self.repetitions.entry((self.board, self.turn)).or_insert(0) += 1;

        self.evaluate();
        Ok(kind)
    }

    /// The side `c` concedes the game.
    #[instrument(level = "debug", skip(self), err)]
    pub fn resign(&mut self, c: Color) -> Result<(), InvalidAction> {
        self.conclude(Outcome::Resignation(!c))
    }

    /// The side `c` ran out of time.
    #[instrument(level = "debug", skip(self), err)]
    pub fn flag_timeout(&mut self, c: Color) -> Result<(), InvalidAction> {
        self.conclude(Outcome::Timeout(!c))
    }

    /// Both sides agree to a draw.
    #[instrument(level = "debug", skip(self), err)]
    pub fn agree_draw(&mut self) -> Result<(), InvalidAction> {
        self.conclude(Outcome::Draw(DrawReason::Agreement))
    }

    fn ensure_in_progress(&self) -> Result<(), InvalidAction> {
        match self.outcome {
            Some(o) => Err(InvalidAction::GameHasEnded(o)),
            None => Ok(()),
        }
    }

    fn conclude(&mut self, o: Outcome) -> Result<(), InvalidAction> {
        self.ensure_in_progress()?;
        info!(outcome = %o, "game over");
        self.outcome = Some(o);
        Ok(())
    }

    fn evaluate(&mut self) {
        let repetitions = self.repetitions.get(&(self.board, self.turn));

        let outcome = if rules::legal_moves(&self.board, self.turn).next().is_none() {
            if self.is_check() {
                Outcome::Checkmate(!self.turn)
            } else {
                Outcome::Stalemate
            }
        } else if is_insufficient_material(&self.board) {
            Outcome::Draw(DrawReason::InsufficientMaterial)
        } else if self.halfmoves >= 100 {
            Outcome::Draw(DrawReason::FiftyMoveRule)
        } else if repetitions.copied().unwrap_or(0) >= 3 {
            Outcome::Draw(DrawReason::ThreefoldRepetition)
        } else {
            return;
        };

        info!(outcome = %outcome, "game over");
        self.outcome = Some(outcome);
    }
}

/// Whether neither side could possibly deliver checkmate.
fn is_insufficient_material(board: &Board) -> bool {
    let mut knights = 0;
    let mut bishops = [0; 2];

    for (sq, p) in board.iter() {
        match p.role() {
            Role::King => {}
            Role::Knight => knights += 1,
            Role::Bishop => bishops[sq.is_light() as usize] += 1,
            _ => return false,
        }
    }

    matches!((knights, bishops), (0, [_, 0]) | (0, [0, _]) | (1, [0, 0]))
}

#[cfg(test)]
impl proptest::arbitrary::Arbitrary for Game {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Game>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        use proptest::{prelude::*, sample::Selector};

        (0..48usize, any::<Selector>())
            .prop_map(|(moves, selector)| {
                let mut game = Game::default();

                for _ in 0..moves {
                    match selector.try_select(game.legal_moves_for(game.turn())) {
                        None => break,
                        Some(m) => game.apply_move(m).expect("legal move"),
                    };
                }

                game
            })
            .boxed()
    }
}
