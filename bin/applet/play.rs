use crate::io::Pipe;
use crate::render::{Diagram, Glyphs};
use anyhow::Error as Anyhow;
use clap::Parser;
use derive_more::{Display, Error, From};
use lib::chess::{Board, Color, Game, Move, Outcome};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter};
use std::{str::FromStr, time::Duration};
use tokio::io::{stdin, stdout, AsyncRead, AsyncWrite};
use tokio::time::{timeout, Instant};
use tracing::{info, instrument, warn};

#[cfg(test)]
use proptest::strategy::Strategy;

/// The reason why parsing [`Settings`] failed.
#[derive(Debug, Display, Eq, PartialEq, Error, From)]
#[display(fmt = "failed to parse settings")]
pub struct ParseSettingsError(ron::de::SpannedError);

/// Runtime configuration for [`Play`].
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// How pieces are drawn.
    pub glyphs: Glyphs,

    /// The time budget of each player, unlimited if `None`.
    #[serde(with = "humantime_serde")]
    #[cfg_attr(test, strategy(proptest::option::of((1u64..86400).prop_map(Duration::from_secs))))]
    pub clock: Option<Duration>,
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&ron::ser::to_string(self).map_err(|_| fmt::Error)?)
    }
}

impl FromStr for Settings {
    type Err = ParseSettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ron::de::from_str(s)?)
    }
}

/// Plays a game of chess between two players sharing the terminal.
#[derive(Debug, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Play {
    /// Settings in RON notation, e.g. `(glyphs: ascii, clock: Some("5m"))`.
    #[clap(short, long, default_value_t)]
    settings: Settings,

    /// The side to move first.
    #[clap(short, long, default_value_t = Color::White)]
    turn: Color,

    /// The starting piece placement in FEN notation.
    #[clap(default_value_t)]
    board: Board,
}

impl Default for Play {
    fn default() -> Self {
        Play {
            settings: Settings::default(),
            turn: Color::White,
            board: Board::default(),
        }
    }
}

impl Play {
    #[instrument(level = "trace", skip(self), err)]
    pub async fn execute(self) -> Result<(), Anyhow> {
        let game = Game::new(self.board, self.turn)?;
        let mut session = Session::new(game, self.settings, Pipe::new(stdout(), stdin()));
        let outcome = session.run().await?;
        info!(%outcome, moves = session.game.history().len());
        Ok(())
    }
}

/// Commands available to the players.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Parser)]
#[clap(
    name = "",
    multicall = true,
    arg_required_else_help = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
enum Cmd {
    /// Move a piece on the board.
    #[display(fmt = "move {}", descriptor)]
    #[clap(after_help = r#"SYNTAX:
    <DESCRIPTOR>    ::= <SQUARE:from><SQUARE:to>[<PROMOTION>]
    <SQUARE>        ::= <FILE><RANK>
    <FILE>          ::= a|b|c|d|e|f|g|h
    <RANK>          ::= 1|2|3|4|5|6|7|8
    <PROMOTION>     ::= q|r|b|n"#)]
    Move {
        /// A chess move in pure coordinate notation.
        descriptor: Move,
    },

    /// Resign the game in favor of the opponent.
    #[display(fmt = "resign")]
    Resign,

    /// Both players agree to a draw.
    #[display(fmt = "draw")]
    Draw,

    /// List the legal moves of the side to move.
    #[display(fmt = "moves")]
    Moves,

    /// Print the moves played so far.
    #[display(fmt = "history")]
    History,
}

struct Session<W: AsyncWrite, R: AsyncRead> {
    game: Game,
    glyphs: Glyphs,
    clocks: [Option<Duration>; 2],
    io: Pipe<W, R>,
}

impl<W: AsyncWrite + Unpin, R: AsyncRead + Unpin> Session<W, R> {
    fn new(game: Game, settings: Settings, io: Pipe<W, R>) -> Self {
        Session {
            game,
            glyphs: settings.glyphs,
            clocks: [settings.clock; 2],
            io,
        }
    }

    /// Runs the game to completion.
    #[instrument(level = "debug", skip(self), ret, err)]
    async fn run(&mut self) -> Result<Outcome, Anyhow> {
        loop {
            if let Some(o) = self.game.outcome() {
                self.io.send(Diagram::new(self.game.board(), self.glyphs)).await?;
                self.io.send(o).await?;
                self.io.flush().await?;
                break Ok(o);
            }

            let turn = self.game.turn();
            self.io.send(Diagram::new(self.game.board(), self.glyphs)).await?;
            self.io.send(format!("{} to move", turn)).await?;

            let cmd = loop {
                self.io.flush().await?;

                let line = match self.recv(turn).await? {
                    None => break None,
                    Some(line) => line,
                };

                match Cmd::try_parse_from(line.split_whitespace()) {
                    Ok(cmd) => break Some(cmd),
                    Err(e) => self.io.send(e).await?,
                }
            };

            match cmd {
                None => self.game.flag_timeout(turn)?,
                Some(cmd) => self.act(turn, cmd).await?,
            }
        }
    }

    /// Waits for the next line, or `None` if the player runs out of time.
    async fn recv(&mut self, turn: Color) -> Result<Option<String>, Anyhow> {
        let remaining = match self.clocks[turn as usize] {
            None => return Ok(Some(self.io.recv().await?)),
            Some(remaining) => remaining,
        };

        let start = Instant::now();
        match timeout(remaining, self.io.recv()).await {
            Err(_) => {
                warn!(player = %turn, "out of time");
                self.clocks[turn as usize] = Some(Duration::ZERO);
                Ok(None)
            }

            Ok(line) => {
                self.clocks[turn as usize] = Some(remaining.saturating_sub(start.elapsed()));
                Ok(Some(line?))
            }
        }
    }

    async fn act(&mut self, turn: Color, cmd: Cmd) -> Result<(), Anyhow> {
        let result = match cmd {
            Cmd::Move { descriptor } => self.game.apply_move(descriptor).map(drop),
            Cmd::Resign => self.game.resign(turn),
            Cmd::Draw => self.game.agree_draw(),

            Cmd::Moves => {
                let moves = self.game.legal_moves_for(turn);
                self.io.send(join(&moves)).await?;
                Ok(())
            }

            Cmd::History => {
                self.io.send(join(self.game.history())).await?;
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!(%cmd, "{}", e);
            self.io.send(format!("cannot {}: {}", cmd, e)).await?;
        }

        Ok(())
    }
}

fn join(moves: &[Move]) -> String {
    moves.iter().map(Move::to_string).collect::<Vec<_>>().join(" ")
}
