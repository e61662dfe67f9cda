//! The model for orders and the manager that keeps the order graph coherent.
//!
//! Orders are cross-linked: a support points at the order it supports, a
//! convoy points at the order whose path it tiles, and both ends know about
//! each other. The links are arena handles ([`OrderId`]) rather than
//! references, which keeps the cyclic graph safe to mutate.

use crate::board::{Board, ChessPath, PathException, PieceId, PieceKind, PowerId, Square};
use tracing::info;

mod manager;

pub use self::manager::OrderManager;

/// Stable handle to an order in the manager's arena.
///
/// A handle stays valid until the order is retracted; handles are not reused
/// within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderId(pub(crate) usize);

/// Stable handle to an [`OrderLinker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkerId(pub(crate) usize);

/// Distinguishes how a move treats its landing square.
///
/// Most moves both attack and travel. Pawns split the two: a straight
/// advance is a `Travel` (it cannot capture), a diagonal is an `Attack` (it
/// captures without occupying).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveType {
    Move,
    Attack,
    Travel,
}

/// The variant-specific part of an order.
#[derive(Debug, Clone)]
pub enum OrderKind {
    /// Remain in place.
    Hold,
    /// Move along a chess path to a landing square.
    Move {
        dest: Square,
        move_type: MoveType,
        path: ChessPath,
    },
    /// A claim on one intermediate square of another order's path. Created
    /// by the manager, never by the player directly.
    Convoy { site: Square },
    /// Support a piece holding on the path's landing square.
    SupportHold { path: ChessPath },
    /// Support a move into the path's landing square.
    SupportMove { path: ChessPath },
    /// Support a convoy claim on the path's landing square.
    SupportConvoy { path: ChessPath },
    /// A support whose beneficiary is not yet known. Only exists while a
    /// retraction preserves a supported convoy; upgraded in place when the
    /// player issues a typed support with the same piece and target.
    Support { path: ChessPath },
    /// Place a new piece during the winter phase.
    Build {
        power: PowerId,
        kind: PieceKind,
        square: Square,
    },
    /// Remove a piece.
    Disband,
}

/// An order issued to a piece (or, for convoys and builds, to a square).
///
/// Orders can be real or virtual. A virtual order has not been issued
/// itself, but is referenced as the supported or convoyed order of a real
/// one; it is forced to fail at adjudication. Equality is identity: compare
/// [`OrderId`]s.
#[derive(Debug, Clone)]
pub struct Order {
    pub(crate) piece: Option<PieceId>,
    pub(crate) start: Square,
    pub(crate) kind: OrderKind,
    pub(crate) is_virtual: bool,
    pub(crate) supports: Vec<OrderId>,
    pub(crate) convoys: Vec<OrderId>,
    pub(crate) supported_order: Option<OrderId>,
    pub(crate) convoyed_order: Option<OrderId>,
    pub(crate) linker: Option<LinkerId>,
    pub(crate) success: bool,
}

impl Order {
    pub(crate) fn new(piece: Option<PieceId>, start: Square, kind: OrderKind) -> Self {
        Order {
            piece,
            start,
            kind,
            is_virtual: false,
            supports: Vec::new(),
            convoys: Vec::new(),
            supported_order: None,
            convoyed_order: None,
            linker: None,
            success: true,
        }
    }

    /// The acting piece. `None` for convoys and builds.
    pub fn piece(&self) -> Option<PieceId> {
        self.piece
    }

    pub fn kind(&self) -> &OrderKind {
        &self.kind
    }

    pub fn starting_square(&self) -> Square {
        self.start
    }

    pub fn landing_square(&self) -> Square {
        match &self.kind {
            OrderKind::Hold | OrderKind::Disband => self.start,
            OrderKind::Move { dest, .. } => *dest,
            OrderKind::Convoy { site } => *site,
            OrderKind::SupportHold { path }
            | OrderKind::SupportMove { path }
            | OrderKind::SupportConvoy { path }
            | OrderKind::Support { path } => path.land(),
            OrderKind::Build { square, .. } => *square,
        }
    }

    /// The convoy sites of the order's path; empty when the path is invalid
    /// or the order has no path.
    pub fn intermediate_squares(&self) -> &[Square] {
        match self.path() {
            Some(path) if path.valid() => path.intermediate_squares(),
            _ => &[],
        }
    }

    pub fn path(&self) -> Option<&ChessPath> {
        match &self.kind {
            OrderKind::Move { path, .. }
            | OrderKind::SupportHold { path }
            | OrderKind::SupportMove { path }
            | OrderKind::SupportConvoy { path }
            | OrderKind::Support { path } => Some(path),
            _ => None,
        }
    }

    /// Whether the order's own path is traversable, before convoy
    /// disruption is considered. Orders without paths trivially pass.
    pub fn path_valid(&self) -> bool {
        self.path().map(ChessPath::valid).unwrap_or(true)
    }

    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    pub fn success(&self) -> bool {
        self.success
    }

    /// Supports pointing at this order.
    pub fn supports(&self) -> &[OrderId] {
        &self.supports
    }

    /// The convoys tiling this order's intermediate squares.
    pub fn convoys(&self) -> &[OrderId] {
        &self.convoys
    }

    /// The order this one supports, for support orders.
    pub fn supported_order(&self) -> Option<OrderId> {
        self.supported_order
    }

    /// The order this convoy carries, for convoys.
    pub fn convoyed_order(&self) -> Option<OrderId> {
        self.convoyed_order
    }

    pub fn linker(&self) -> Option<LinkerId> {
        self.linker
    }

    pub fn is_hold(&self) -> bool {
        matches!(self.kind, OrderKind::Hold)
    }

    pub fn is_move(&self) -> bool {
        matches!(self.kind, OrderKind::Move { .. })
    }

    pub fn is_convoy(&self) -> bool {
        matches!(self.kind, OrderKind::Convoy { .. })
    }

    pub fn is_support(&self) -> bool {
        matches!(
            self.kind,
            OrderKind::SupportHold { .. }
                | OrderKind::SupportMove { .. }
                | OrderKind::SupportConvoy { .. }
                | OrderKind::Support { .. }
        )
    }

    pub fn move_type(&self) -> Option<MoveType> {
        match self.kind {
            OrderKind::Move { move_type, .. } => Some(move_type),
            _ => None,
        }
    }

    pub fn is_travel(&self) -> bool {
        self.move_type() == Some(MoveType::Travel)
    }

    pub fn is_attack(&self) -> bool {
        self.move_type() == Some(MoveType::Attack)
    }

    /// Whether a generic support with this order's piece and landing square
    /// could be replaced by a typed support aimed at `target` without
    /// disturbing its convoy tiling.
    pub fn is_inheritable(&self, piece: PieceId, target: Square) -> bool {
        self.is_support() && self.piece == Some(piece) && self.landing_square() == target
    }

    /// A narrated description, e.g. `"England King at d1 move to d2"`.
    pub fn describe(&self, board: &Board) -> String {
        let prefix = if self.is_virtual { "[virtual] " } else { "" };
        let subject = match self.piece {
            Some(piece) => board.describe(piece),
            None => self.start.to_string(),
        };
        let action = match &self.kind {
            OrderKind::Hold => "hold".to_string(),
            OrderKind::Move { dest, move_type, .. } => {
                let verb = match move_type {
                    MoveType::Move => "move",
                    MoveType::Attack => "attack",
                    MoveType::Travel => "travel",
                };
                format!("{} to {}", verb, dest)
            }
            OrderKind::Convoy { .. } => "convoy".to_string(),
            OrderKind::SupportHold { path }
            | OrderKind::SupportMove { path }
            | OrderKind::SupportConvoy { path } => format!("support {}", path.land()),
            OrderKind::Support { path } => format!("generic support {}", path.land()),
            OrderKind::Build { kind, square, .. } => format!("build {} on {}", kind, square),
            OrderKind::Disband => "disband".to_string(),
        };
        format!("{}{} {}", prefix, subject, action)
    }

    /// Apply a resolved order to the board, narrating the outcome. Returns
    /// whether anything the order attempted actually happened.
    pub fn execute(&self, board: &mut Board, manager: &OrderManager) -> bool {
        if self.is_virtual {
            return false;
        }
        match &self.kind {
            OrderKind::Hold => {
                let piece = self.piece.expect("hold orders have pieces");
                if !self.success {
                    info!("{} failed to hold.", board.describe(piece));
                    return false;
                }
                info!("{} held.", board.describe(piece));
                true
            }
            OrderKind::Move {
                dest,
                move_type,
                path,
            } => {
                let piece = self.piece.expect("move orders have pieces");
                let verb = match move_type {
                    MoveType::Move => "move",
                    MoveType::Attack => "attack",
                    MoveType::Travel => "travel",
                };
                if !self.success {
                    info!("{} failed to {}.", board.describe(piece), verb);
                    return false;
                }
                if !path.valid() {
                    info!("{} cannot {} to {}.", board.describe(piece), verb, dest);
                    return false;
                }
                let is_pawn = board.piece(piece).kind() == PieceKind::Pawn;
                if is_pawn && *move_type == MoveType::Attack && board.piece_at(*dest).is_none() {
                    info!(
                        "{} successfully attacked, but does not move to, {}.",
                        board.describe(piece),
                        dest
                    );
                    return true;
                }
                if *move_type != MoveType::Attack {
                    board.move_piece_to(piece, *dest);
                }
                if is_pawn && !self.intermediate_squares().is_empty() {
                    board.mark_en_passant(piece, self.intermediate_squares()[0]);
                }
                info!("{} moved to {}.", board.describe(piece), dest);
                true
            }
            OrderKind::Convoy { site } => {
                if !self.success {
                    return false;
                }
                let convoyed = self.convoyed_order.expect("convoys carry an order");
                manager
                    .get(convoyed)
                    .intermediate_squares()
                    .contains(site)
            }
            OrderKind::SupportHold { path }
            | OrderKind::SupportMove { path }
            | OrderKind::SupportConvoy { path }
            | OrderKind::Support { path } => {
                let piece = self.piece.expect("support orders have pieces");
                if !self.success {
                    info!(
                        "{} failed to support {}.",
                        board.describe(piece),
                        path.land()
                    );
                    return false;
                }
                if !path.valid() {
                    info!("{} cannot support {}.", board.describe(piece), path.land());
                    return false;
                }
                info!("{} supported {}.", board.describe(piece), path.land());
                true
            }
            OrderKind::Build {
                power,
                kind,
                square,
            } => {
                board.vacate_square(*square);
                let piece = board.add_piece(*kind, *power, *square);
                info!("{} built {}.", board.power(*power), board.describe(piece));
                true
            }
            OrderKind::Disband => {
                let piece = self.piece.expect("disband orders have pieces");
                info!("{} disbanded.", board.describe(piece));
                board.remove_piece(piece);
                true
            }
        }
    }
}

/// A bundle of moves adjudicated as one atomic unit with a single outcome:
/// the two moves of a castle, or the travel-and-attack pair of an en-passant
/// capture.
///
/// Orders sharing a linker are exempt from mutual conflict clearing and are
/// retracted together.
#[derive(Debug, Clone, Default)]
pub struct OrderLinker {
    pub(crate) orders: Vec<OrderId>,
    pub(crate) success: bool,
}

impl OrderLinker {
    pub fn orders(&self) -> &[OrderId] {
        &self.orders
    }

    pub fn success(&self) -> bool {
        self.success
    }
}

/// The identity of an order, as requested by the game layer.
///
/// [`OrderManager::get_order`] matches specs against existing orders before
/// constructing anything: two requests with the same identifying fields
/// yield the same order. Attributes that are not part of an order's
/// identity, like a move's [`MoveType`], ride along without participating
/// in the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSpec {
    Hold {
        piece: PieceId,
    },
    Move {
        piece: PieceId,
        dest: Square,
        move_type: MoveType,
        exception: Option<PathException>,
        linker: Option<LinkerId>,
    },
    Convoy {
        site: Square,
        convoyed: OrderId,
    },
    SupportHold {
        piece: PieceId,
        supported: OrderId,
    },
    SupportMove {
        piece: PieceId,
        supported: OrderId,
    },
    SupportConvoy {
        piece: PieceId,
        convoy: OrderId,
    },
    Support {
        piece: PieceId,
        target: Square,
    },
    Build {
        power: PowerId,
        kind: PieceKind,
        square: Square,
    },
    Disband {
        piece: PieceId,
    },
}

impl OrderSpec {
    /// Plain move spec with no linker or path exception.
    pub fn plain_move(piece: PieceId, dest: Square, move_type: MoveType) -> Self {
        OrderSpec::Move {
            piece,
            dest,
            move_type,
            exception: None,
            linker: None,
        }
    }
}
