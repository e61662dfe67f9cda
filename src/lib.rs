//! An adjudicator for orders in Chess Dip, a chess-themed variant of the board
//! game Diplomacy. Pieces move along chess paths, every crossed square is a
//! convoy that can be attacked, and simultaneous orders are resolved with the
//! partial-information algorithm described in Lucas Kruijswijk's
//! [Math of Adjudication](https://diplom.org/Zine/S2009M/Kruijswijk/DipMath_Chp1.htm).

pub mod board;
pub mod game;
pub mod judge;
pub mod order;
pub mod parser;

pub use crate::board::{Board, BoardSetup, ChessPath, Piece, PieceId, PieceKind, Power, PowerId, Side, Square};
pub use crate::game::Game;
pub use crate::order::{MoveType, Order, OrderId};

/// Format trait for short naming of objects in orders.
pub trait ShortName {
    /// This method returns the short display name of the object.
    fn short_name(&self) -> std::borrow::Cow<'_, str>;
}
