//! The board: squares, pieces, powers, chess paths, and the mutable state
//! shared by the order manager, the adjudicator, and the executor.

mod path;
mod piece;
mod power;
mod setup;
mod square;
mod state;

pub use self::path::{ChessPath, PathException};
pub use self::piece::{Piece, PieceId, PieceKind};
pub use self::power::{Power, PowerId, Side};
pub use self::setup::{standard_setup, BoardSetup};
pub use self::square::Square;
pub use self::state::Board;
