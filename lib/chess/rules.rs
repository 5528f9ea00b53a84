use crate::chess::{Board, Color, MissingKing, Move, MoveKind, Piece, Rank, Role, Square};
use arrayvec::ArrayVec;
use derive_more::{Display, Error};

/// The reason why a [`Move`] was rejected.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum IllegalMove {
    #[display(fmt = "there is no piece of the side to move on the source square")]
    NoPieceOrWrongColor,
    #[display(fmt = "the destination square is occupied by a friendly piece")]
    FriendlyFireBlocked,
    #[display(fmt = "the piece does not move that way")]
    ShapeViolation,
    #[display(fmt = "the path to the destination square is obstructed")]
    PathBlocked,
    #[display(fmt = "pawns must promote to a knight, bishop, rook or queen on the last rank")]
    InvalidPromotion,
    #[display(fmt = "the move leaves the king in check")]
    LeavesKingInCheck,
    #[display(fmt = "{}", _0)]
    MissingKing(MissingKing),
}

impl From<MissingKing> for IllegalMove {
    fn from(e: MissingKing) -> Self {
        IllegalMove::MissingKing(e)
    }
}

/// Checks whether `m` is legal for the side `turn` on `board`.
///
/// Checks are performed in order and the first violation is reported:
///
/// 1. the source square must hold a piece of the side to move;
/// 2. the destination square must not hold a friendly piece;
/// 3. the piece must be able to reach the destination, capturing if it's occupied;
/// 4. nothing may stand in between for sliders and pawns advancing two squares;
/// 5. pawns reaching the last rank must promote, no other move may;
/// 6. the king of the side to move must not be attacked afterwards.
///
/// On success, returns the [`MoveKind`] of `m`.
pub fn validate(board: &Board, turn: Color, m: Move) -> Result<MoveKind, IllegalMove> {
    let (whence, whither) = (m.whence(), m.whither());

    let piece = board[whence]
        .filter(|p| p.color() == turn)
        .ok_or(IllegalMove::NoPieceOrWrongColor)?;

    let mut kind = MoveKind::empty();

    match board[whither] {
        Some(p) if p.color() == turn => return Err(IllegalMove::FriendlyFireBlocked),
        Some(_) if piece.capture_shape_ok(whence, whither) => kind |= MoveKind::CAPTURE,
        None if piece.shape_ok(whence, whither) => {}
        _ => return Err(IllegalMove::ShapeViolation),
    }

    if runs_along_a_line(piece, whence, whither) && !board.path_clear(whence, whither) {
        return Err(IllegalMove::PathBlocked);
    }

    if piece.role() == Role::Pawn && whither.rank() == Rank::promotion(turn) {
        match m.promotion() {
            Some(r) if r.is_promotion() => kind |= MoveKind::PROMOTION,
            _ => return Err(IllegalMove::InvalidPromotion),
        }
    } else if m.promotion().is_some() {
        return Err(IllegalMove::InvalidPromotion);
    }

    let mut scratch = *board;
    play_unchecked(&mut scratch, m);
    if is_check(&scratch, turn)? {
        return Err(IllegalMove::LeavesKingInCheck);
    }

    Ok(kind)
}

/// Plays `m` on `board` without checking whether it's legal.
///
/// Returns the captured [`Piece`], if any.
pub fn play_unchecked(board: &mut Board, m: Move) -> Option<Piece> {
    let captured = board.move_piece(m.whence(), m.whither());

    if let (Some(r), Some(p)) = (m.promotion(), board[m.whither()]) {
        board.place(m.whither(), Piece(p.color(), r));
    }

    captured
}

/// Whether any piece of the side `by` could capture on `sq`.
///
/// The piece standing on `sq`, if any, is irrelevant, as is whether capturing would
/// expose the attacker's own king.
pub fn is_attacked(board: &Board, sq: Square, by: Color) -> bool {
    board.iter().any(|(whence, p)| {
        p.color() == by
            && p.capture_shape_ok(whence, sq)
            && (!runs_along_a_line(p, whence, sq) || board.path_clear(whence, sq))
    })
}

/// Whether the move of `piece` from `whence` to `whither` crosses other squares.
fn runs_along_a_line(piece: Piece, whence: Square, whither: Square) -> bool {
    match piece.role() {
        Role::Pawn => (whither.rank() - whence.rank()).abs() == 2,
        r => r.is_slider(),
    }
}

/// Whether the king of the given [`Color`] is attacked.
pub fn is_check(board: &Board, c: Color) -> Result<bool, MissingKing> {
    Ok(is_attacked(board, board.king(c)?, !c))
}

/// An iterator over the legal [`Move`]s of the side `turn`.
///
/// Pawns reaching the last rank yield one move per [promotion][`Role::PROMOTIONS`].
pub fn legal_moves(board: &Board, turn: Color) -> impl Iterator<Item = Move> + '_ {
    board
        .by_color(turn)
        .flat_map(move |whence| {
            Square::iter().flat_map(move |whither| candidates(board, whence, whither))
        })
        .filter(move |&m| validate(board, turn, m).is_ok())
}

fn candidates(board: &Board, whence: Square, whither: Square) -> ArrayVec<Move, 4> {
    let mut moves = ArrayVec::new();

    match board[whence] {
        Some(Piece(c, Role::Pawn)) if whither.rank() == Rank::promotion(c) => {
            for r in Role::PROMOTIONS {
                moves.push(Move::new(whence, whither, Some(r)));
            }
        }

        _ => moves.push(Move::new(whence, whither, None)),
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::sample::Selector;
    use test_strategy::proptest;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn mv(s: &str) -> Move {
        s.parse().unwrap()
    }

    fn board(fen: &str) -> Board {
        fen.parse().unwrap()
    }

    #[test]
    fn pawn_push_is_legal_from_initial_position() {
        assert_eq!(
            validate(&Board::default(), Color::White, mv("e2e4")),
            Ok(MoveKind::empty())
        );
    }

    #[test]
    fn moving_from_an_empty_square_or_an_enemy_piece_is_illegal() {
        let b = Board::default();
        assert_eq!(
            validate(&b, Color::White, mv("e3e4")),
            Err(IllegalMove::NoPieceOrWrongColor)
        );

        assert_eq!(
            validate(&b, Color::White, mv("e7e5")),
            Err(IllegalMove::NoPieceOrWrongColor)
        );
    }

    #[test]
    fn capturing_a_friendly_piece_is_illegal() {
        assert_eq!(
            validate(&Board::default(), Color::White, mv("a1a2")),
            Err(IllegalMove::FriendlyFireBlocked)
        );
    }

    #[test]
    fn pawns_cannot_advance_three_squares() {
        assert_eq!(
            validate(&Board::default(), Color::White, mv("e2e5")),
            Err(IllegalMove::ShapeViolation)
        );
    }

    #[test]
    fn pawns_cannot_capture_straight_ahead() {
        let b = board("4k3/8/8/8/4p3/4P3/8/4K3");
        assert_eq!(
            validate(&b, Color::White, mv("e3e4")),
            Err(IllegalMove::ShapeViolation)
        );
    }

    #[test]
    fn sliders_cannot_move_through_pieces() {
        let b = Board::default();
        assert_eq!(
            validate(&b, Color::White, mv("a1a3")),
            Err(IllegalMove::PathBlocked)
        );

        assert_eq!(
            validate(&b, Color::White, mv("c1e3")),
            Err(IllegalMove::PathBlocked)
        );
    }

    #[test]
    fn pawns_cannot_jump_over_pieces() {
        let b = board("4k3/8/8/8/8/4n3/4P3/4K3");
        assert_eq!(
            validate(&b, Color::White, mv("e2e4")),
            Err(IllegalMove::PathBlocked)
        );
    }

    #[test]
    fn knights_jump_over_pieces() {
        assert_eq!(
            validate(&Board::default(), Color::Black, mv("g8f6")),
            Ok(MoveKind::empty())
        );
    }

    #[test]
    fn pawns_must_promote_on_the_last_rank() {
        let b = board("4k3/P7/8/8/8/8/8/4K3");
        assert_eq!(
            validate(&b, Color::White, mv("a7a8")),
            Err(IllegalMove::InvalidPromotion)
        );

        assert_eq!(
            validate(&b, Color::White, mv("a7a8k")),
            Err(IllegalMove::InvalidPromotion)
        );

        assert_eq!(
            validate(&b, Color::White, mv("a7a8n")),
            Ok(MoveKind::PROMOTION)
        );
    }

    #[test]
    fn only_pawns_reaching_the_last_rank_may_promote() {
        let b = Board::default();
        assert_eq!(
            validate(&b, Color::White, mv("e2e4q")),
            Err(IllegalMove::InvalidPromotion)
        );

        assert_eq!(
            validate(&b, Color::White, mv("g1f3q")),
            Err(IllegalMove::InvalidPromotion)
        );
    }

    #[test]
    fn captures_are_flagged() {
        let b = board("4k3/8/8/3p4/4P3/8/8/4K3");
        assert_eq!(validate(&b, Color::White, mv("e4d5")), Ok(MoveKind::CAPTURE));

        let b = board("3r3k/4P3/8/8/8/8/8/4K3");
        assert_eq!(
            validate(&b, Color::White, mv("e7d8q")),
            Ok(MoveKind::CAPTURE | MoveKind::PROMOTION)
        );
    }

    #[test]
    fn pinned_pieces_cannot_move_off_the_pin() {
        let b = board("4r2k/8/8/8/8/8/4B3/4K3");
        assert_eq!(
            validate(&b, Color::White, mv("e2d3")),
            Err(IllegalMove::LeavesKingInCheck)
        );
    }

    #[test]
    fn king_cannot_step_into_an_attacked_square() {
        let b = board("4k3/8/8/8/8/8/8/r3K3");
        assert_eq!(
            validate(&b, Color::White, mv("e1d1")),
            Err(IllegalMove::LeavesKingInCheck)
        );

        assert_eq!(
            validate(&b, Color::White, mv("e1f1")),
            Err(IllegalMove::LeavesKingInCheck)
        );

        assert_eq!(validate(&b, Color::White, mv("e1e2")), Ok(MoveKind::empty()));
    }

    #[test]
    fn moving_without_a_king_is_reported() {
        let b = board("4k3/8/8/8/8/8/4P3/8");
        assert_eq!(
            validate(&b, Color::White, mv("e2e4")),
            Err(IllegalMove::MissingKing(MissingKing(Color::White)))
        );
    }

    #[proptest]
    fn sliders_are_blocked_by_any_piece_in_between(
        #[strategy(proptest::sample::select(&[Role::Bishop, Role::Rook, Role::Queen][..]))] r: Role,
        c: Color,
        whence: Square,
        #[filter(Piece(#c, #r).shape_ok(#whence, #whither)
            && !Piece(#c, Role::King).shape_ok(#whence, #whither))]
        whither: Square,
        blocker: Piece,
        selector: Selector,
    ) {
        let (df, dr) = (whither.file() - whence.file(), whither.rank() - whence.rank());
        let steps = df.abs().max(dr.abs());
        let i = selector.select(1..steps);

        let mut b = Board::empty();
        b.place(whence, Piece(c, r));
        b.place(whence.offset(df.signum() * i, dr.signum() * i).unwrap(), blocker);

        assert_eq!(
            validate(&b, c, Move::new(whence, whither, None)),
            Err(IllegalMove::PathBlocked)
        );
    }

    #[test]
    fn kings_and_knights_ignore_pieces_in_between() {
        let b = board("4k3/8/8/8/8/8/3PP3/3QKN2");
        assert_eq!(validate(&b, Color::White, mv("f1g3")), Ok(MoveKind::empty()));
        assert_eq!(validate(&b, Color::White, mv("e1f2")), Ok(MoveKind::empty()));
    }

    #[proptest]
    fn legal_moves_never_leave_the_king_in_check(b: Board, c: Color) {
        for m in legal_moves(&b, c) {
            let mut scratch = b;
            play_unchecked(&mut scratch, m);
            assert_eq!(is_check(&scratch, c), Ok(false));
        }
    }

    #[test]
    fn there_are_twenty_legal_moves_in_the_initial_position() {
        assert_eq!(legal_moves(&Board::default(), Color::White).count(), 20);
        assert_eq!(legal_moves(&Board::default(), Color::Black).count(), 20);
    }

    #[test]
    fn legal_moves_include_every_promotion() {
        let b = board("4k3/P7/8/8/8/8/8/4K3");
        let promotions = Vec::from_iter(
            legal_moves(&b, Color::White).filter_map(|m| m.promotion()),
        );

        assert_eq!(promotions, Role::PROMOTIONS);
        assert_eq!(legal_moves(&b, Color::White).count(), 9);
    }

    #[test]
    fn play_unchecked_replaces_promoted_pawn() {
        let mut b = board("3r3k/4P3/8/8/8/8/8/4K3");
        assert_eq!(
            play_unchecked(&mut b, mv("e7d8q")),
            Some(Piece(Color::Black, Role::Rook))
        );

        assert_eq!(b[sq("d8")], Some(Piece(Color::White, Role::Queen)));
        assert_eq!(b[sq("e7")], None);
    }

    #[test]
    fn pawns_attack_diagonally_forward() {
        let b = Board::default();
        assert!(is_attacked(&b, sq("e3"), Color::White));
        assert!(is_attacked(&b, sq("d6"), Color::Black));
        assert!(!is_attacked(&b, sq("e4"), Color::White));
        assert!(!is_attacked(&b, sq("e5"), Color::Black));
    }

    #[test]
    fn attacks_are_blocked_by_pieces_in_between() {
        let b = board("4k3/8/8/8/8/8/8/R2n3K");
        assert!(is_attacked(&b, sq("c1"), Color::White));
        assert!(is_attacked(&b, sq("d1"), Color::White));
        assert!(!is_attacked(&b, sq("f1"), Color::White));
    }

    #[proptest]
    fn is_check_tells_whether_the_king_is_attacked(b: Board, c: Color) {
        assert_eq!(
            is_check(&b, c),
            b.king(c).map(|sq| is_attacked(&b, sq, !c))
        );
    }

    #[test]
    fn neither_king_is_in_check_in_the_initial_position() {
        assert_eq!(is_check(&Board::default(), Color::White), Ok(false));
        assert_eq!(is_check(&Board::default(), Color::Black), Ok(false));
    }
}
