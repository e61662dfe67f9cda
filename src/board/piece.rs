use crate::board::{PowerId, Square};
use crate::parser::{ParseError, ParseErrorKind};
use crate::ShortName;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// The kind of a chess piece. There are no queens in Chess Dip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PieceKind {
    #[cfg_attr(feature = "serde", serde(rename = "P"))]
    Pawn,
    #[cfg_attr(feature = "serde", serde(rename = "N"))]
    Knight,
    #[cfg_attr(feature = "serde", serde(rename = "B"))]
    Bishop,
    #[cfg_attr(feature = "serde", serde(rename = "R"))]
    Rook,
    #[cfg_attr(feature = "serde", serde(rename = "K"))]
    King,
}

impl PieceKind {
    /// The piece's full name, as used in order narration.
    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Pawn => "Pawn",
            PieceKind::Knight => "Knight",
            PieceKind::Bishop => "Bishop",
            PieceKind::Rook => "Rook",
            PieceKind::King => "King",
        }
    }
}

impl ShortName for PieceKind {
    fn short_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(match *self {
            PieceKind::Pawn => "P",
            PieceKind::Knight => "N",
            PieceKind::Bishop => "B",
            PieceKind::Rook => "R",
            PieceKind::King => "K",
        })
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PieceKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match &s.to_lowercase()[..] {
            "p" | "pawn" => Ok(PieceKind::Pawn),
            "n" | "knight" => Ok(PieceKind::Knight),
            "b" | "bishop" => Ok(PieceKind::Bishop),
            "r" | "rook" => Ok(PieceKind::Rook),
            "k" | "king" => Ok(PieceKind::King),
            _ => Err(ParseError::new(ParseErrorKind::InvalidPieceKind, s)),
        }
    }
}

/// Stable handle to a piece in the board's arena.
///
/// Pieces have identity: two pieces of the same kind and power are distinct,
/// and a handle stays valid until the piece is removed from the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceId(pub(crate) usize);

/// A piece on the board.
#[derive(Debug, Clone)]
pub struct Piece {
    kind: PieceKind,
    power: PowerId,
    square: Square,
    moved: bool,
}

impl Piece {
    pub(crate) fn new(kind: PieceKind, power: PowerId, square: Square) -> Self {
        Piece {
            kind,
            power,
            square,
            moved: false,
        }
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn power(&self) -> PowerId {
        self.power
    }

    pub fn square(&self) -> Square {
        self.square
    }

    /// Whether the piece has moved this game. Castling requires an unmoved
    /// king and rook.
    pub fn moved(&self) -> bool {
        self.moved
    }

    pub(crate) fn move_to(&mut self, square: Square) {
        self.square = square;
        self.moved = true;
    }
}

impl ShortName for Piece {
    fn short_name(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{}{}", self.kind.short_name(), self.square))
    }
}
