//! The game layer: turning parsed intents into managed orders, running the
//! adjudicator, and progressing the board.

use crate::board::{
    Board, BoardSetup, ChessPath, PathException, PieceId, PieceKind, PowerId, Square,
};
use crate::judge::{self, OrderState};
use crate::order::{MoveType, Order, OrderId, OrderKind, OrderManager, OrderSpec};
use crate::parser::{OrderIntent, ParseError};
use thiserror::Error;
use tracing::{info, warn};

mod phase;

pub use self::phase::Phase;

/// A user-level order that could not be applied. The order set is left
/// unchanged when one of these comes back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("No piece on {0}.")]
    NoPiece(Square),
    #[error("Cannot order another power's piece.")]
    ForeignPiece,
    #[error("No piece on {0} to support.")]
    NoSupportTarget(Square),
    #[error("No pawn on {0}.")]
    NoPawn(Square),
    #[error("No pawn on {0} to attack.")]
    NoPassedPawn(Square),
    #[error("The pawn on {0} is not open to en passant.")]
    NotOpenToEnPassant(Square),
    #[error("No king on {0} to castle.")]
    NoKing(Square),
    #[error("No rook on {0} to castle.")]
    NoRook(Square),
    #[error("The piece on {0} has already moved.")]
    AlreadyMoved(Square),
    #[error("Convoying square cannot convoy along the specified path.")]
    OffPath,
    #[error("No order on {0} to remove.")]
    NoOrder(Square),
}

/// Managing object for a game: the board, the order set, and the phase
/// clock.
pub struct Game {
    board: Board,
    manager: OrderManager,
    starting_pieces: Vec<(PowerId, Vec<(PieceKind, Square)>)>,
    phase: Phase,
    year: u32,
}

impl Game {
    /// A game on the given setup, with an empty board. Call [`Game::setup`]
    /// to place the setup's starting pieces, or [`Game::place_pieces`] to
    /// arrange a position by hand.
    pub fn new(setup: &BoardSetup) -> Self {
        Game {
            board: Board::new(setup),
            manager: OrderManager::new(),
            starting_pieces: setup.pieces().to_vec(),
            phase: Phase::Spring,
            year: 1,
        }
    }

    /// A game on the standard setup, with the standard starting pieces.
    pub fn standard() -> Self {
        let mut game = Game::new(crate::board::standard_setup());
        game.setup();
        game
    }

    /// Place the setup's starting pieces.
    pub fn setup(&mut self) {
        for (power, placements) in self.starting_pieces.clone() {
            for (kind, square) in placements {
                self.board.add_piece(kind, power, square);
            }
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn orders(&self) -> &OrderManager {
        &self.manager
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    /// Place extra pieces from placements like `"K d1"`. Used by scenario
    /// setup; the setup's own starting pieces are placed by [`Game::setup`].
    pub fn place_pieces(&mut self, power: PowerId, placements: &[&str]) {
        for placement in placements {
            let text = placement.replace(' ', "");
            let kind = text[..1]
                .parse::<PieceKind>()
                .unwrap_or_else(|_| panic!("bad piece in placement '{}'", placement));
            let square = text[1..]
                .parse::<Square>()
                .unwrap_or_else(|_| panic!("bad square in placement '{}'", placement));
            self.board.add_piece(kind, power, square);
        }
    }

    pub fn find_power(&self, prefix: &str) -> Option<PowerId> {
        self.board.find_power(prefix)
    }

    /// Process a batch of order texts for one power. Failures are logged and
    /// skipped; the rest still apply.
    pub fn process_orders(&mut self, power: PowerId, orders: &[&str]) {
        for order in orders {
            if let Err(error) = self.process_order(power, order) {
                warn!("{}", error);
            }
        }
    }

    /// Parse one order text, validate it semantically, and apply it to the
    /// order set.
    pub fn process_order(&mut self, power: PowerId, text: &str) -> Result<(), CommandError> {
        let intent: OrderIntent = text.parse()?;
        self.apply_intent(power, intent)
    }

    fn apply_intent(&mut self, power: PowerId, intent: OrderIntent) -> Result<(), CommandError> {
        match intent {
            OrderIntent::Hold(hold) => {
                let piece = self.own_piece(power, hold.at)?;
                self.manager
                    .get_order(&self.board, OrderSpec::Hold { piece }, false);
                Ok(())
            }
            OrderIntent::Move(mv) => {
                let piece = self.own_piece(power, mv.from)?;
                let move_type = self.move_type_for(piece, mv.to);
                self.manager.get_order(
                    &self.board,
                    OrderSpec::plain_move(piece, mv.to, move_type),
                    false,
                );
                Ok(())
            }
            OrderIntent::SupportHold(support) => {
                let piece = self.own_piece(power, support.by)?;
                let supported = self
                    .board
                    .piece_at(support.target)
                    .ok_or(CommandError::NoSupportTarget(support.target))?;
                self.manager.get_support_order(
                    &self.board,
                    piece,
                    OrderSpec::Hold { piece: supported },
                    false,
                );
                Ok(())
            }
            OrderIntent::SupportMove(support) => {
                let piece = self.own_piece(power, support.by)?;
                let supported = self
                    .board
                    .piece_at(support.from)
                    .ok_or(CommandError::NoSupportTarget(support.from))?;
                self.manager.get_support_order(
                    &self.board,
                    piece,
                    OrderSpec::plain_move(supported, support.to, MoveType::Move),
                    false,
                );
                Ok(())
            }
            OrderIntent::SupportConvoy(support) => {
                let piece = self.own_piece(power, support.by)?;
                let convoyed = self
                    .board
                    .piece_at(support.from)
                    .ok_or(CommandError::NoSupportTarget(support.from))?;
                let at = self.board.piece(convoyed);
                let (_, intermediate) = ChessPath::validate(
                    at.kind(),
                    self.board.power(at.power()).side(),
                    at.square(),
                    support.to,
                );
                if !intermediate.contains(&support.site) {
                    return Err(CommandError::OffPath);
                }
                let convoyed_spec = if support.convoyed_is_support {
                    OrderSpec::Support {
                        piece: convoyed,
                        target: support.to,
                    }
                } else {
                    OrderSpec::plain_move(convoyed, support.to, MoveType::Move)
                };
                self.manager.get_support_convoy_order(
                    &self.board,
                    piece,
                    support.site,
                    convoyed_spec,
                    false,
                );
                Ok(())
            }
            OrderIntent::EnPassant(ep) => self.add_en_passant(power, ep.from, ep.travel, ep.attack),
            OrderIntent::Castle(castle) => self.add_castle(power, castle.long),
            OrderIntent::Build(build) => {
                let kind = build.kind.unwrap_or(PieceKind::Pawn);
                self.manager.get_order(
                    &self.board,
                    OrderSpec::Build {
                        power,
                        kind,
                        square: build.at,
                    },
                    false,
                );
                Ok(())
            }
            OrderIntent::Disband(disband) => {
                let piece = self.own_piece(power, disband.at)?;
                self.manager
                    .get_order(&self.board, OrderSpec::Disband { piece }, false);
                Ok(())
            }
        }
    }

    /// Issue the linked travel-and-attack pair of an en-passant capture.
    pub fn add_en_passant(
        &mut self,
        power: PowerId,
        from: Square,
        travel: Square,
        attack: Square,
    ) -> Result<(), CommandError> {
        let pawn = self.own_piece(power, from).map_err(|error| match error {
            CommandError::NoPiece(square) => CommandError::NoPawn(square),
            other => other,
        })?;
        if self.board.piece(pawn).kind() != PieceKind::Pawn {
            return Err(CommandError::NoPawn(from));
        }
        let passed = self
            .board
            .piece_at(attack)
            .filter(|&p| self.board.piece(p).kind() == PieceKind::Pawn)
            .ok_or(CommandError::NoPassedPawn(attack))?;
        if !self.board.can_en_passant(passed, travel) {
            return Err(CommandError::NotOpenToEnPassant(attack));
        }

        let linker = self.manager.new_linker();
        self.manager.get_order(
            &self.board,
            OrderSpec::Move {
                piece: pawn,
                dest: travel,
                move_type: MoveType::Travel,
                exception: None,
                linker: Some(linker),
            },
            false,
        );
        self.manager.get_order(
            &self.board,
            OrderSpec::Move {
                piece: pawn,
                dest: attack,
                move_type: MoveType::Attack,
                exception: Some(PathException::EnPassant),
                linker: Some(linker),
            },
            false,
        );
        Ok(())
    }

    /// Issue the linked king-and-rook pair of a castle.
    pub fn add_castle(&mut self, power: PowerId, long: bool) -> Result<(), CommandError> {
        let geometry = self.board.power(power).clone();
        let king_square = geometry.king_square();
        let rook_square = if long {
            geometry.queen_rook_square()
        } else {
            geometry.king_rook_square()
        };
        let king = self
            .board
            .piece_at(king_square)
            .filter(|&p| self.board.piece(p).kind() == PieceKind::King)
            .ok_or(CommandError::NoKing(king_square))?;
        let rook = self
            .board
            .piece_at(rook_square)
            .filter(|&p| self.board.piece(p).kind() == PieceKind::Rook)
            .ok_or(CommandError::NoRook(rook_square))?;
        if self.board.moved(king) {
            return Err(CommandError::AlreadyMoved(king_square));
        }
        if self.board.moved(rook) {
            return Err(CommandError::AlreadyMoved(rook_square));
        }

        let (king_dest, rook_dest) = if long {
            (
                geometry.queenside_castle_king_square(),
                geometry.queenside_castle_rook_square(),
            )
        } else {
            (
                geometry.kingside_castle_king_square(),
                geometry.kingside_castle_rook_square(),
            )
        };
        let linker = self.manager.new_linker();
        for (piece, dest) in [(king, king_dest), (rook, rook_dest)].iter().copied() {
            self.manager.get_order(
                &self.board,
                OrderSpec::Move {
                    piece,
                    dest,
                    move_type: MoveType::Travel,
                    exception: Some(PathException::Castle),
                    linker: Some(linker),
                },
                false,
            );
        }
        Ok(())
    }

    /// Retract the real order of the piece standing on `square`.
    pub fn retract_on(&mut self, power: PowerId, square: Square) -> Result<(), CommandError> {
        let piece = self.own_piece(power, square)?;
        let order = self
            .manager
            .iter()
            .find(|(_, o)| !o.is_virtual() && o.piece() == Some(piece))
            .map(|(id, _)| id)
            .ok_or(CommandError::NoOrder(square))?;
        self.manager.retract(order);
        Ok(())
    }

    /// Adjudicate the current order set: inject holds for every piece
    /// without a valid real move, resolve, then record the disbands of
    /// captured pieces.
    pub fn adjudicate(&mut self) {
        self.ensure_holds();
        judge::adjudicate(&self.board, &mut self.manager);
        self.make_disbands();
    }

    /// Execute every real order, clear the order set, and advance the phase
    /// clock.
    pub fn progress(&mut self) {
        self.board.clear_en_passant();
        let ids = self.manager.order_ids().collect::<Vec<_>>();
        for id in ids {
            if !self.manager.get(id).is_virtual() {
                let order = self.manager.get(id).clone();
                order.execute(&mut self.board, &self.manager);
            }
        }
        self.manager.clear();
        match self.phase {
            Phase::Fall => self.board.update_sc_ownership(),
            Phase::Winter => self.year += 1,
            Phase::Spring => {}
        }
        self.phase = self.phase.next();
        info!("Moving on to the {} phase.", self.phase);
    }

    /// The adjudicated outcome of the order `text` describes, if such an
    /// order is in the set.
    pub fn outcome_of(&self, text: &str) -> Option<OrderState> {
        let intent = text.parse::<OrderIntent>().ok()?;
        let id = self.find_order(&intent)?;
        Some(self.manager.get(id).success().into())
    }

    fn find_order(&self, intent: &OrderIntent) -> Option<OrderId> {
        let find = |pred: &dyn Fn(&Order) -> bool| {
            self.manager
                .iter()
                .find(|(_, o)| !o.is_virtual() && pred(o))
                .or_else(|| self.manager.iter().find(|(_, o)| pred(o)))
                .map(|(id, _)| id)
        };
        match *intent {
            OrderIntent::Hold(hold) => {
                let piece = self.board.piece_at(hold.at)?;
                find(&|o| o.is_hold() && o.piece() == Some(piece))
            }
            OrderIntent::Move(mv) => {
                let piece = self.board.piece_at(mv.from)?;
                find(&|o| o.is_move() && o.piece() == Some(piece) && o.landing_square() == mv.to)
            }
            OrderIntent::SupportHold(s) => {
                let piece = self.board.piece_at(s.by)?;
                find(&|o| {
                    matches!(o.kind(), OrderKind::SupportHold { .. })
                        && o.piece() == Some(piece)
                        && o.landing_square() == s.target
                })
            }
            OrderIntent::SupportMove(s) => {
                let piece = self.board.piece_at(s.by)?;
                let supported = self.board.piece_at(s.from)?;
                find(&|o| {
                    matches!(o.kind(), OrderKind::SupportMove { .. })
                        && o.piece() == Some(piece)
                        && o.landing_square() == s.to
                        && o.supported_order().map_or(false, |sup| {
                            self.manager.get(sup).piece() == Some(supported)
                        })
                })
            }
            OrderIntent::SupportConvoy(s) => {
                let piece = self.board.piece_at(s.by)?;
                find(&|o| {
                    matches!(o.kind(), OrderKind::SupportConvoy { .. })
                        && o.piece() == Some(piece)
                        && o.landing_square() == s.site
                })
            }
            OrderIntent::EnPassant(ep) => {
                let piece = self.board.piece_at(ep.from)?;
                find(&|o| {
                    o.is_move() && o.piece() == Some(piece) && o.landing_square() == ep.travel
                })
            }
            OrderIntent::Castle(_) => None,
            OrderIntent::Build(b) => find(&|o| {
                matches!(o.kind(), OrderKind::Build { square, .. } if *square == b.at)
            }),
            OrderIntent::Disband(d) => {
                let piece = self.board.piece_at(d.at)?;
                find(&|o| matches!(o.kind(), OrderKind::Disband) && o.piece() == Some(piece))
            }
        }
    }

    fn own_piece(&self, power: PowerId, square: Square) -> Result<PieceId, CommandError> {
        let piece = self
            .board
            .piece_at(square)
            .ok_or(CommandError::NoPiece(square))?;
        if self.board.piece(piece).power() != power {
            return Err(CommandError::ForeignPiece);
        }
        Ok(piece)
    }

    /// Pawn column moves are travels, pawn diagonals are attacks; everything
    /// else both attacks and travels.
    fn move_type_for(&self, piece: PieceId, dest: Square) -> MoveType {
        let at = self.board.piece(piece);
        if at.kind() == PieceKind::Pawn {
            if at.square().file() == dest.file() {
                MoveType::Travel
            } else {
                MoveType::Attack
            }
        } else {
            MoveType::Move
        }
    }

    /// Add or make real the hold orders for non-moving pieces.
    fn ensure_holds(&mut self) {
        let moving = self
            .manager
            .iter()
            .filter(|(_, o)| !o.is_virtual() && o.is_move() && o.path_valid())
            .filter_map(|(_, o)| o.piece())
            .collect::<Vec<_>>();
        let resting = self
            .board
            .pieces()
            .filter(|piece| !moving.contains(piece))
            .collect::<Vec<_>>();
        for piece in resting {
            self.manager.ensure_hold(&self.board, piece);
        }
    }

    /// A piece that stayed put while a foreign move took its square is
    /// captured: record a disband for it.
    fn make_disbands(&mut self) {
        let mut captured = Vec::new();
        for (_, order) in self.manager.iter() {
            if !(order.is_move() && !order.is_virtual() && order.success()) {
                continue;
            }
            let victim = match self.board.piece_at(order.landing_square()) {
                Some(piece) => piece,
                None => continue,
            };
            if Some(victim) == order.piece() {
                continue;
            }
            let vacated = self.manager.iter().any(|(_, o)| {
                !o.is_virtual() && o.is_move() && o.success() && o.piece() == Some(victim)
            });
            let already_disbanding = self.manager.iter().any(|(_, o)| {
                matches!(o.kind(), OrderKind::Disband) && o.piece() == Some(victim)
            });
            if !vacated && !already_disbanding && !captured.contains(&victim) {
                captured.push(victim);
            }
        }
        for piece in captured {
            info!("{} is captured.", self.board.describe(piece));
            self.manager.push_disband(&self.board, piece);
        }
    }
}
