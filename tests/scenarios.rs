use lib::chess::*;

fn mv(s: &str) -> Move {
    s.parse().unwrap()
}

#[test]
fn opening_pawn_push_is_accepted() {
    let mut game = Game::default();
    assert_eq!(game.apply_move(mv("e2e4")), Ok(MoveKind::empty()));
    assert_eq!(game.turn(), Color::Black);
    assert_eq!(game.history(), &[mv("e2e4")]);
    assert_eq!(game.outcome(), None);
}

#[test]
fn pawn_cannot_advance_three_squares() {
    let mut game = Game::default();
    assert_eq!(
        game.apply_move(mv("e2e5")),
        Err(InvalidAction::IllegalMove(IllegalMove::ShapeViolation))
    );

    assert_eq!(game.turn(), Color::White);
    assert!(game.history().is_empty());
    assert_eq!(game.board(), &Board::default());
}

#[test]
fn exposing_the_king_is_rejected() {
    let board: Board = "4k3/4r3/8/8/8/8/4N3/4K3".parse().unwrap();
    let mut game = Game::new(board, Color::White).unwrap();

    assert_eq!(
        game.apply_move(mv("e2c3")),
        Err(InvalidAction::IllegalMove(IllegalMove::LeavesKingInCheck))
    );

    assert_eq!(game.board(), &board);
    assert_eq!(game.turn(), Color::White);
}

#[test]
fn fools_mate() {
    let mut game = Game::default();

    for m in ["f2f3", "e7e5", "g2g4"] {
        assert!(game.apply_move(mv(m)).is_ok());
        assert_eq!(game.outcome(), None);
    }

    assert!(game.apply_move(mv("d8h4")).is_ok());
    assert!(game.is_check());
    assert_eq!(game.outcome(), Some(Outcome::Checkmate(Color::Black)));
    assert!(game.legal_moves_for(Color::White).is_empty());

    assert_eq!(
        game.apply_move(mv("a2a3")),
        Err(InvalidAction::GameHasEnded(Outcome::Checkmate(Color::Black)))
    );

    let history: Vec<_> = game.history().iter().map(Move::to_string).collect();
    assert_eq!(history, ["f2f3", "e7e5", "g2g4", "d8h4"]);
}

#[test]
fn promotion_replaces_the_pawn() {
    let board: Board = "7k/P7/8/8/8/8/8/4K3".parse().unwrap();
    let mut game = Game::new(board, Color::White).unwrap();

    assert_eq!(game.apply_move(mv("a7a8q")), Ok(MoveKind::PROMOTION));
    assert_eq!(
        game.board()[Square(File::A, Rank::Eighth)],
        Some(Piece(Color::White, Role::Queen))
    );

    assert!(game.is_check());
    assert_eq!(game.outcome(), None);
}

#[test]
fn square_notation() {
    let sq: Square = "a1".parse().unwrap();
    assert_eq!(sq, Square(File::A, Rank::First));
    assert_eq!(sq.to_string(), "a1");
    assert!("i9".parse::<Square>().is_err());
}

#[test]
fn state_snapshot_survives_further_play() {
    let mut game = Game::default();
    let before = game.current_state();

    game.apply_move(mv("d2d4")).unwrap();

    assert_eq!(before.turn, Color::White);
    assert_eq!(before.outcome, None);
    assert_eq!(before.board, Board::default());
    assert_ne!(game.current_state(), before);
}
