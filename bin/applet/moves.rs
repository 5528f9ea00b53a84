use anyhow::Error as Anyhow;
use clap::Parser;
use lib::chess::{rules, Board, Color, Game, IllegalSetup, Move};
use tracing::{info, instrument};

/// Lists the legal moves in a position.
#[derive(Debug, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Moves {
    /// The side to move.
    #[clap(short, long, default_value_t = Color::White)]
    turn: Color,

    /// The piece placement in FEN notation.
    #[clap(default_value_t)]
    board: Board,
}

impl Moves {
    #[instrument(level = "trace", skip(self), err)]
    pub async fn execute(self) -> Result<(), Anyhow> {
        for m in self.legal_moves()? {
            println!("{}", m);
        }

        Ok(())
    }

    /// The legal moves of the side to move, even if the position is already drawn.
    fn legal_moves(&self) -> Result<Vec<Move>, IllegalSetup> {
        let game = Game::new(self.board, self.turn)?;

        if let Some(o) = game.outcome() {
            info!(outcome = %o, "the game would have ended");
        }

        Ok(rules::legal_moves(game.board(), self.turn).collect())
    }
}
