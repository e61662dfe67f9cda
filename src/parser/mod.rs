//! Parsing of the order-text surface into order intents.
//!
//! Orders are recognized case-insensitively with whitespace ignored:
//!
//! ```text
//! Kd1 d2              move (piece letter optional)
//! Kd1 H               hold
//! Kd1 S Nb1 H         support hold
//! Kd1 S Nb1 c3        support move
//! Kd1 S e2 C Bf1 d3   support the convoy at e2 carrying Bf1 -> d3
//! Pd5 t c6 x c5       en passant (travel and attack, either order)
//! O-O / O-O-O         castle
//! Build Ne1           build (piece letter defaults to pawn)
//! Disband Kd1         disband
//! ```
//!
//! Parsing yields an [`OrderIntent`], not an order: squares are not yet
//! resolved to pieces, and no semantic checks have run. The game layer does
//! both before touching the order manager.

use crate::board::{PieceKind, Square};
use from_variants::FromVariants;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::str::FromStr;

mod error;

pub use self::error::{ParseError, ParseErrorKind};

/// A parsed order, waiting for semantic validation.
#[derive(Debug, Clone, PartialEq, Eq, FromVariants)]
pub enum OrderIntent {
    Hold(HoldIntent),
    Move(MoveIntent),
    SupportHold(SupportHoldIntent),
    SupportMove(SupportMoveIntent),
    SupportConvoy(SupportConvoyIntent),
    EnPassant(EnPassantIntent),
    Castle(CastleIntent),
    Build(BuildIntent),
    Disband(DisbandIntent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldIntent {
    pub at: Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveIntent {
    pub from: Square,
    pub to: Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportHoldIntent {
    pub by: Square,
    pub target: Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportMoveIntent {
    pub by: Square,
    pub from: Square,
    pub to: Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportConvoyIntent {
    pub by: Square,
    /// The convoy site being supported.
    pub site: Square,
    /// Starting square of the convoyed piece.
    pub from: Square,
    pub to: Square,
    /// Whether the convoyed order is itself a support rather than a move.
    pub convoyed_is_support: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnPassantIntent {
    pub from: Square,
    pub travel: Square,
    pub attack: Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastleIntent {
    pub long: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildIntent {
    pub at: Square,
    pub kind: Option<PieceKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisbandIntent {
    pub at: Square,
}

const PIECE: &str = "[pnbrk]?";
const SQUARE: &str = "[a-h][1-8]";

lazy_static! {
    static ref ORDER_PATTERN: Regex = Regex::new(&format!(
        "^(?:\
         (?P<piece>{piece})(?P<start>{square})(?:\
            (?P<support>s(?:{piece})(?P<sup_start>{square})(?:\
                (?P<sup_hold>h?)\
                |(?:[-xt]?)(?P<sup_land>{square})\
                |c(?:{piece})(?P<conv_start>{square})(?P<conv_code>[-xts]?)(?P<conv_land>{square})\
            ))\
            |(?P<ep1>t(?P<ep1_travel>{square})x(?P<ep1_attack>{square}))\
            |(?P<ep2>x(?P<ep2_attack>{square})t(?P<ep2_travel>{square}))\
            |(?:-?(?P<land>{square}))\
            |(?P<hold>h)\
         )\
         |(?P<long_castle>o-o-o)\
         |(?P<short_castle>o-o)\
         |build(?P<build_piece>{piece})(?P<build_square>{square})\
         |disband(?:{piece})(?P<disband_square>{square})\
         )$",
        piece = PIECE,
        square = SQUARE,
    ))
    .expect("order pattern is well-formed");
}

fn square(caps: &Captures, name: &str) -> Square {
    caps.name(name)
        .expect("group participates in this alternative")
        .as_str()
        .parse()
        .expect("group only matches valid squares")
}

impl FromStr for OrderIntent {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.to_lowercase().replace(' ', "");
        let caps = ORDER_PATTERN
            .captures(&text)
            .ok_or_else(|| ParseError::new(ParseErrorKind::UnrecognizedOrder, s))?;

        if caps.name("hold").is_some() {
            return Ok(HoldIntent {
                at: square(&caps, "start"),
            }
            .into());
        }
        if caps.name("land").is_some() {
            return Ok(MoveIntent {
                from: square(&caps, "start"),
                to: square(&caps, "land"),
            }
            .into());
        }
        if caps.name("support").is_some() {
            let by = square(&caps, "start");
            if caps.name("conv_start").is_some() {
                return Ok(SupportConvoyIntent {
                    by,
                    site: square(&caps, "sup_start"),
                    from: square(&caps, "conv_start"),
                    to: square(&caps, "conv_land"),
                    convoyed_is_support: caps
                        .name("conv_code")
                        .map_or(false, |code| code.as_str() == "s"),
                }
                .into());
            }
            if caps.name("sup_land").is_some() {
                return Ok(SupportMoveIntent {
                    by,
                    from: square(&caps, "sup_start"),
                    to: square(&caps, "sup_land"),
                }
                .into());
            }
            return Ok(SupportHoldIntent {
                by,
                target: square(&caps, "sup_start"),
            }
            .into());
        }
        if caps.name("ep1").is_some() || caps.name("ep2").is_some() {
            let (travel, attack) = if caps.name("ep1").is_some() {
                (square(&caps, "ep1_travel"), square(&caps, "ep1_attack"))
            } else {
                (square(&caps, "ep2_travel"), square(&caps, "ep2_attack"))
            };
            return Ok(EnPassantIntent {
                from: square(&caps, "start"),
                travel,
                attack,
            }
            .into());
        }
        if caps.name("long_castle").is_some() {
            return Ok(CastleIntent { long: true }.into());
        }
        if caps.name("short_castle").is_some() {
            return Ok(CastleIntent { long: false }.into());
        }
        if caps.name("build_square").is_some() {
            let kind = caps
                .name("build_piece")
                .filter(|p| !p.as_str().is_empty())
                .map(|p| p.as_str().parse().expect("group only matches piece letters"));
            return Ok(BuildIntent {
                at: square(&caps, "build_square"),
                kind,
            }
            .into());
        }
        if caps.name("disband_square").is_some() {
            return Ok(DisbandIntent {
                at: square(&caps, "disband_square"),
            }
            .into());
        }

        Err(ParseError::new(ParseErrorKind::UnrecognizedOrder, s))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn intent(s: &str) -> OrderIntent {
        s.parse().unwrap_or_else(|e| panic!("'{}' should parse: {}", s, e))
    }

    #[test]
    fn moves() {
        assert_eq!(
            intent("Kd1 d2"),
            OrderIntent::Move(MoveIntent {
                from: sq("d1"),
                to: sq("d2")
            })
        );
        assert_eq!(intent("d1 d2"), intent("Kd1 - d2"));
    }

    #[test]
    fn holds() {
        assert_eq!(
            intent("Kd1 H"),
            OrderIntent::Hold(HoldIntent { at: sq("d1") })
        );
    }

    #[test]
    fn supports() {
        assert_eq!(
            intent("Kd1 S Nb1 H"),
            OrderIntent::SupportHold(SupportHoldIntent {
                by: sq("d1"),
                target: sq("b1")
            })
        );
        // A bare supported square also reads as a hold support.
        assert_eq!(intent("Kd1 S Nb1"), intent("kd1snb1h"));
        assert_eq!(
            intent("Kd1 S Nb1 c3"),
            OrderIntent::SupportMove(SupportMoveIntent {
                by: sq("d1"),
                from: sq("b1"),
                to: sq("c3")
            })
        );
        assert_eq!(intent("Kd1 S Nb1 x c3"), intent("Kd1 S Nb1 c3"));
    }

    #[test]
    fn support_convoy() {
        assert_eq!(
            intent("Ke1 S e2 C Bf1 d3"),
            OrderIntent::SupportConvoy(SupportConvoyIntent {
                by: sq("e1"),
                site: sq("e2"),
                from: sq("f1"),
                to: sq("d3"),
                convoyed_is_support: false,
            })
        );
        assert_eq!(
            intent("Ke1 S e2 C Bf1 s d3"),
            OrderIntent::SupportConvoy(SupportConvoyIntent {
                by: sq("e1"),
                site: sq("e2"),
                from: sq("f1"),
                to: sq("d3"),
                convoyed_is_support: true,
            })
        );
    }

    #[test]
    fn en_passant_either_order() {
        let expected = OrderIntent::EnPassant(EnPassantIntent {
            from: sq("d5"),
            travel: sq("c6"),
            attack: sq("c5"),
        });
        assert_eq!(intent("Pd5 t c6 x c5"), expected);
        assert_eq!(intent("Pd5 x c5 t c6"), expected);
    }

    #[test]
    fn castles() {
        assert_eq!(
            intent("O-O"),
            OrderIntent::Castle(CastleIntent { long: false })
        );
        assert_eq!(
            intent("o-o-o"),
            OrderIntent::Castle(CastleIntent { long: true })
        );
    }

    #[test]
    fn builds_and_disbands() {
        assert_eq!(
            intent("Build Ne1"),
            OrderIntent::Build(BuildIntent {
                at: sq("e1"),
                kind: Some(PieceKind::Knight)
            })
        );
        assert_eq!(
            intent("build e1"),
            OrderIntent::Build(BuildIntent {
                at: sq("e1"),
                kind: None
            })
        );
        assert_eq!(
            intent("Disband Kd1"),
            OrderIntent::Disband(DisbandIntent { at: sq("d1") })
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<OrderIntent>().is_err());
        assert!("Kd1".parse::<OrderIntent>().is_err());
        assert!("Kz9 d2".parse::<OrderIntent>().is_err());
        assert!("castle".parse::<OrderIntent>().is_err());
    }
}
