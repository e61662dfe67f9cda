//! Adjudication scenarios derived from the Diplomacy Adjudicator Test Cases
//! (DATC) by Lucas B. Kruijswijk, adapted to the chess variant. Section
//! numbers follow the DATC where a case carries over.

#[path = "./util.rs"]
mod util;

use chessdip::board::PieceKind;
use chessdip::game::CommandError;
use chessdip::judge::OrderState::*;
use util::*;

#[test]
fn t6a4_move_to_own_square() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1"]);
    orders(&mut g, "england", &["Kd1 d1"]);
    g.adjudicate();
    assert_outcomes!(g, "Kd1 d1": Fails);
}

#[test]
fn t6a6_ordering_another_powers_piece() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1"]);
    let italy = power(&g, "italy");
    assert_eq!(
        g.process_order(italy, "Kd1 d2"),
        Err(CommandError::ForeignPiece)
    );
    assert!(!g.orders().has_orders());
}

#[test]
fn t6a8_support_to_hold_yourself() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1"]);
    orders(&mut g, "england", &["Kd1 S Kd1 H"]);
    g.adjudicate();
    assert_outcomes!(g, "Kd1 S Kd1 H": Fails);
}

#[test]
fn t6a10_support_on_unreachable_destination() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1", "Rh1"]);
    orders(&mut g, "england", &["Rh1 H", "Kd1 S Rh1 H"]);
    g.adjudicate();
    assert_outcomes!(g, "Kd1 S Rh1 H": Fails, "Rh1 H": Succeeds);
}

#[test]
fn t6a11_simple_bounce() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1"]);
    setup(&mut g, "italy", &["Ke1"]);
    orders(&mut g, "england", &["Kd1 d2"]);
    orders(&mut g, "italy", &["Ke1 d2"]);
    g.adjudicate();
    assert_outcomes!(g, "Kd1 d2": Fails, "Ke1 d2": Fails);
}

#[test]
fn t6a12_bounce_of_three_units() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1"]);
    setup(&mut g, "italy", &["Ke1"]);
    setup(&mut g, "scandinavia", &["Pd3"]);
    orders(&mut g, "england", &["Kd1 d2"]);
    orders(&mut g, "italy", &["Ke1 d2"]);
    orders(&mut g, "scandinavia", &["Pd3 d2"]);
    g.adjudicate();
    assert_outcomes!(g, "Kd1 d2": Fails, "Ke1 d2": Fails, "Pd3 d2": Fails);
}

#[test]
fn t6c1_three_army_circular_movement() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1", "Bd2", "Rc1"]);
    orders(&mut g, "england", &["Kd1 d2", "Bd2 c1", "Rc1 d1"]);
    g.adjudicate();
    assert_outcomes!(g, "Kd1 d2": Succeeds, "Bd2 c1": Succeeds, "Rc1 d1": Succeeds);

    g.progress();
    let board = g.board();
    let king = board.piece_at("d2".parse().unwrap()).unwrap();
    assert_eq!(board.piece(king).kind(), PieceKind::King);
    let bishop = board.piece_at("c1".parse().unwrap()).unwrap();
    assert_eq!(board.piece(bishop).kind(), PieceKind::Bishop);
    let rook = board.piece_at("d1".parse().unwrap()).unwrap();
    assert_eq!(board.piece(rook).kind(), PieceKind::Rook);
}

#[test]
fn t6c1a_circular_movement_across_powers() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1"]);
    setup(&mut g, "italy", &["Ke1"]);
    setup(&mut g, "scandinavia", &["Rd2"]);
    orders(&mut g, "england", &["Kd1 e1"]);
    orders(&mut g, "italy", &["Ke1 d2"]);
    orders(&mut g, "scandinavia", &["Rd2 d1"]);
    g.adjudicate();
    assert_outcomes!(g, "Kd1 e1": Succeeds, "Ke1 d2": Succeeds, "Rd2 d1": Succeeds);
}

#[test]
fn t6c2_circular_movement_with_support() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1", "Bd2", "Rc1", "Nc3"]);
    orders(&mut g, "england", &["Kd1 d2", "Bd2 c1", "Rc1 d1", "Nc3 S Rc1 d1"]);
    g.adjudicate();
    assert_outcomes!(g, "Kd1 d2": Succeeds, "Bd2 c1": Succeeds, "Rc1 d1": Succeeds);
}

#[test]
fn t6c3_disrupted_three_army_circular_movement() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1", "Bd2", "Rc1", "Nc3"]);
    orders(&mut g, "england", &["Kd1 d2", "Bd2 c1", "Rc1 d1", "Nc3 d1"]);
    g.adjudicate();
    assert_outcomes!(
        g,
        "Kd1 d2": Fails,
        "Bd2 c1": Fails,
        "Rc1 d1": Fails,
        "Nc3 d1": Fails,
    );
}

#[test]
fn t6d1_supported_hold_prevents_dislodgement() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1", "Bc1"]);
    setup(&mut g, "france", &["Nd2", "Rd4"]);
    orders(&mut g, "england", &["Kd1 d2", "Bc1 S Kd1 d2"]);
    orders(&mut g, "france", &["Nd2 H", "Rd4 S Nd2 H"]);
    g.adjudicate();
    assert_outcomes!(
        g,
        "Kd1 d2": Fails,
        "Bc1 S Kd1 d2": Succeeds,
        "Nd2 H": Succeeds,
        "Rd4 S Nd2 H": Succeeds,
    );
}

#[test]
fn t6d2_cut_support_allows_dislodgement() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1", "Bc1"]);
    setup(&mut g, "france", &["Nd2", "Rd4"]);
    setup(&mut g, "scandinavia", &["Rh4"]);
    orders(&mut g, "england", &["Kd1 d2", "Bc1 S Kd1 d2"]);
    orders(&mut g, "france", &["Nd2 H", "Rd4 S Nd2 H"]);
    orders(&mut g, "scandinavia", &["Rh4 d4"]);
    g.adjudicate();
    assert_outcomes!(
        g,
        "Kd1 d2": Succeeds,
        "Rd4 S Nd2 H": Fails,
        "Rh4 d4": Fails,
        "Nd2 H": Fails,
    );

    // The knight stood its ground and is captured.
    g.progress();
    let d2 = g.board().piece_at("d2".parse().unwrap()).unwrap();
    assert_eq!(g.board().piece(d2).kind(), PieceKind::King);
    assert_eq!(g.board().pieces_of(power(&g, "france")).count(), 1);
}

#[test]
fn t6d14_head_to_head_with_equal_support_bounces() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1", "Bc1"]);
    setup(&mut g, "italy", &["Kd2", "Be2"]);
    orders(&mut g, "england", &["Kd1 d2", "Bc1 S Kd1 d2"]);
    orders(&mut g, "italy", &["Kd2 d1", "Be2 S Kd2 d1"]);
    g.adjudicate();
    assert_outcomes!(g, "Kd1 d2": Fails, "Kd2 d1": Fails);
}

#[test]
fn t6d14_head_to_head_with_greater_support_dislodges() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1", "Bc1", "Rd4"]);
    setup(&mut g, "italy", &["Kd2", "Be2"]);
    orders(&mut g, "england", &["Kd1 d2", "Bc1 S Kd1 d2", "Rd4 S Kd1 d2"]);
    orders(&mut g, "italy", &["Kd2 d1", "Be2 S Kd2 d1"]);
    g.adjudicate();
    assert_outcomes!(g, "Kd1 d2": Succeeds, "Kd2 d1": Fails);

    g.progress();
    let d2 = g.board().piece_at("d2".parse().unwrap()).unwrap();
    assert_eq!(g.board().piece(d2).kind(), PieceKind::King);
    assert_eq!(g.board().pieces_of(power(&g, "italy")).count(), 1);
}

#[test]
fn t6e1_support_from_defenders_power_does_not_help() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1"]);
    setup(&mut g, "italy", &["Kd2", "Be2"]);
    orders(&mut g, "england", &["Kd1 d2"]);
    orders(&mut g, "italy", &["Kd2 d1", "Be2 S Kd1 d2"]);
    g.adjudicate();
    assert_outcomes!(g, "Kd1 d2": Fails, "Kd2 d1": Fails, "Be2 S Kd1 d2": Succeeds);
}

#[test]
fn t6e_supported_attack_cannot_dislodge_own_piece() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1", "Pd2", "Bc1"]);
    orders(&mut g, "england", &["Kd1 d2", "Bc1 S Kd1 d2"]);
    g.adjudicate();
    assert_outcomes!(g, "Kd1 d2": Fails);
}

#[test]
fn t6d17_dislodgement_cuts_support() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1", "Bd2"]);
    setup(&mut g, "italy", &["Ke1"]);
    setup(&mut g, "france", &["Rd4", "Nb3"]);
    orders(&mut g, "england", &["Kd1 e1", "Bd2 S Kd1 e1"]);
    orders(&mut g, "france", &["Rd4 d2", "Nb3 S Rd4 d2"]);
    g.adjudicate();
    assert_outcomes!(
        g,
        "Rd4 d2": Succeeds,
        "Bd2 S Kd1 e1": Fails,
        "Kd1 e1": Fails,
    );
}

#[test]
fn szykman_convoy_under_attack() {
    let mut g = game();
    setup(&mut g, "england", &["Kd3", "Nc3"]);
    setup(&mut g, "italy", &["Ke1", "Bf1"]);
    orders(&mut g, "england", &["Nc3 e2", "Kd3 S Nc3 e2"]);
    orders(&mut g, "italy", &["Bf1 d3", "Ke1 S e2 C Bf1 d3"]);
    g.adjudicate();
    assert_outcomes!(
        g,
        "Nc3 e2": Succeeds,
        "Kd3 S Nc3 e2": Succeeds,
        "Bf1 d3": Fails,
    );

    // The contested convoy at e2 fails with the move it carries.
    let convoy = g
        .orders()
        .iter()
        .find(|(_, o)| {
            !o.is_virtual() && o.is_convoy() && o.starting_square() == "e2".parse().unwrap()
        })
        .map(|(_, o)| o.success())
        .expect("the bishop's path should be tiled by a convoy at e2");
    assert!(!convoy);
}

#[test]
fn convoys_crossing_the_same_square_annihilate() {
    let mut g = game();
    setup(&mut g, "england", &["Rb1"]);
    setup(&mut g, "scandinavia", &["Bc1"]);
    orders(&mut g, "england", &["Rb1 b4"]);
    orders(&mut g, "scandinavia", &["Bc1 a3"]);
    g.adjudicate();
    assert_outcomes!(g, "Rb1 b4": Fails, "Bc1 a3": Fails);
}

#[test]
fn supported_convoy_beats_unsupported_rival() {
    let mut g = game();
    setup(&mut g, "england", &["Rb1", "Ka2"]);
    setup(&mut g, "scandinavia", &["Bc1"]);
    orders(&mut g, "england", &["Rb1 b4", "Ka2 S b2 C Rb1 b4"]);
    orders(&mut g, "scandinavia", &["Bc1 a3"]);
    g.adjudicate();
    assert_outcomes!(
        g,
        "Rb1 b4": Succeeds,
        "Ka2 S b2 C Rb1 b4": Succeeds,
        "Bc1 a3": Fails,
    );
}

#[test]
fn pawn_travels_bounce() {
    let mut g = game();
    setup(&mut g, "england", &["Pc2"]);
    setup(&mut g, "scandinavia", &["Pc4"]);
    orders(&mut g, "england", &["Pc2 c3"]);
    orders(&mut g, "scandinavia", &["Pc4 c3"]);
    g.adjudicate();
    assert_outcomes!(g, "Pc2 c3": Fails, "Pc4 c3": Fails);
}

#[test]
fn pawn_cannot_capture_forward() {
    let mut g = game();
    setup(&mut g, "england", &["Pc2"]);
    setup(&mut g, "scandinavia", &["Nc3"]);
    orders(&mut g, "england", &["Pc2 c3"]);
    g.adjudicate();
    assert_outcomes!(g, "Pc2 c3": Fails);
}

#[test]
fn pawn_attack_on_empty_square_does_not_relocate() {
    let mut g = game();
    setup(&mut g, "england", &["Pd2"]);
    orders(&mut g, "england", &["Pd2 e3"]);
    g.adjudicate();
    assert_outcomes!(g, "Pd2 e3": Succeeds);

    g.progress();
    let board = g.board();
    assert!(board.piece_at("e3".parse().unwrap()).is_none());
    let pawn = board.piece_at("d2".parse().unwrap()).unwrap();
    assert_eq!(board.piece(pawn).kind(), PieceKind::Pawn);
}

#[test]
fn supported_pawn_attack_captures_in_place() {
    let mut g = game();
    setup(&mut g, "england", &["Pd2", "Kf2"]);
    setup(&mut g, "scandinavia", &["Ne3"]);
    orders(&mut g, "england", &["Pd2 e3", "Kf2 S Pd2 e3"]);
    g.adjudicate();
    assert_outcomes!(g, "Pd2 e3": Succeeds);

    g.progress();
    let board = g.board();
    // The defender is captured but the pawn attacks without occupying.
    assert!(board.piece_at("e3".parse().unwrap()).is_none());
    let pawn = board.piece_at("d2".parse().unwrap()).unwrap();
    assert_eq!(board.piece(pawn).kind(), PieceKind::Pawn);
}

#[test]
fn castling_fails_when_the_rook_is_prevented() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1", "Ra1"]);
    setup(&mut g, "france", &["Kc2"]);
    let england = power(&g, "england");
    g.add_castle(england, false).unwrap();
    orders(&mut g, "france", &["Kc2 c1"]);
    g.adjudicate();
    assert_outcomes!(g, "Kd1 b1": Fails, "Ra1 c1": Fails, "Kc2 c1": Succeeds);

    g.progress();
    let board = g.board();
    let king = board.piece_at("d1".parse().unwrap()).unwrap();
    assert_eq!(board.piece(king).kind(), PieceKind::King);
    let rook = board.piece_at("a1".parse().unwrap()).unwrap();
    assert_eq!(board.piece(rook).kind(), PieceKind::Rook);
    let france_king = board.piece_at("c1".parse().unwrap()).unwrap();
    assert_eq!(board.piece(france_king).kind(), PieceKind::King);
}

#[test]
fn unopposed_castle_moves_both_pieces() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1", "Ra1"]);
    orders(&mut g, "england", &["O-O"]);
    g.adjudicate();
    assert_outcomes!(g, "Kd1 b1": Succeeds, "Ra1 c1": Succeeds);

    g.progress();
    let board = g.board();
    let king = board.piece_at("b1".parse().unwrap()).unwrap();
    assert_eq!(board.piece(king).kind(), PieceKind::King);
    let rook = board.piece_at("c1".parse().unwrap()).unwrap();
    assert_eq!(board.piece(rook).kind(), PieceKind::Rook);
}

#[test]
fn castling_requires_unmoved_pieces() {
    let mut g = game();
    setup(&mut g, "england", &["Kd1", "Ra1"]);
    let england = power(&g, "england");

    orders(&mut g, "england", &["Ra1 a2"]);
    g.adjudicate();
    g.progress();
    orders(&mut g, "england", &["Ra2 a1"]);
    g.adjudicate();
    g.progress();

    assert!(matches!(
        g.add_castle(england, false),
        Err(CommandError::AlreadyMoved(_))
    ));
}

#[test]
fn en_passant_capture() {
    let mut g = game();
    setup(&mut g, "england", &["Pd5", "Kf6"]);
    setup(&mut g, "france", &["Pe7"]);

    orders(&mut g, "france", &["Pe7 e5"]);
    g.adjudicate();
    assert_outcomes!(g, "Pe7 e5": Succeeds);
    g.progress();

    orders(&mut g, "england", &["Pd5 t e6 x e5", "Kf6 S Pd5 e5"]);
    g.adjudicate();
    assert_outcomes!(g, "Pd5 e6": Succeeds, "Pd5 e5": Succeeds);
    g.progress();

    let board = g.board();
    let pawn = board.piece_at("e6".parse().unwrap()).unwrap();
    assert_eq!(board.piece(pawn).kind(), PieceKind::Pawn);
    assert!(board.piece_at("e5".parse().unwrap()).is_none());
    assert_eq!(board.pieces_of(power(&g, "france")).count(), 0);
}

#[test]
fn en_passant_requires_the_mark() {
    let mut g = game();
    setup(&mut g, "england", &["Pd5"]);
    setup(&mut g, "france", &["Pe5"]);
    let england = power(&g, "england");
    // The French pawn has not just made a two-step move.
    assert!(matches!(
        g.process_order(england, "Pd5 t e6 x e5"),
        Err(CommandError::NotOpenToEnPassant(_))
    ));
}
