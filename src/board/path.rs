use crate::board::{PieceKind, Side, Square};

/// Exceptional moves whose geometry is validated by the game layer rather
/// than by the ordinary movement rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathException {
    Castle,
    EnPassant,
}

/// The path a piece claims when it moves or supports.
///
/// Validity and the ordered intermediate squares are computed once, at
/// construction. The intermediate squares are the move's convoy sites: each
/// one gets an auto-created convoy order, and each can be attacked to break
/// the move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChessPath {
    start: Square,
    land: Square,
    valid: bool,
    intermediate: Vec<Square>,
    exception: Option<PathException>,
}

impl ChessPath {
    pub fn new(
        kind: PieceKind,
        side: Side,
        start: Square,
        land: Square,
        exception: Option<PathException>,
    ) -> Self {
        let (valid, intermediate) = match exception {
            None => ChessPath::validate(kind, side, start, land),
            Some(PathException::Castle) => {
                // Castle legality was checked by the game layer; only the
                // rook keeps convoy sites, and not its final square.
                let intermediate = if kind == PieceKind::Rook {
                    let (_, mut squares) = ChessPath::validate(kind, side, start, land);
                    squares.pop();
                    squares
                } else {
                    Vec::new()
                };
                (true, intermediate)
            }
            Some(PathException::EnPassant) => {
                let (dfile, drank) = start.delta_to(land);
                let valid = dfile.abs() == 1 && (drank == 0 || drank.abs() == 2);
                (valid, Vec::new())
            }
        };

        ChessPath {
            start,
            land,
            valid,
            intermediate,
            exception,
        }
    }

    /// Movement rules per piece kind, returning validity and the open squares
    /// strictly between start and landing.
    pub fn validate(
        kind: PieceKind,
        side: Side,
        start: Square,
        land: Square,
    ) -> (bool, Vec<Square>) {
        if start == land {
            return (false, Vec::new());
        }

        let (dfile, drank) = start.delta_to(land);
        match kind {
            PieceKind::King => (dfile.abs() <= 1 && drank.abs() <= 1, Vec::new()),
            PieceKind::Knight => (
                (drank.abs() == 2 && dfile.abs() == 1) || (dfile.abs() == 2 && drank.abs() == 1),
                Vec::new(),
            ),
            PieceKind::Rook => {
                if dfile == 0 || drank == 0 {
                    (true, between(start, land))
                } else {
                    (false, Vec::new())
                }
            }
            PieceKind::Bishop => {
                if dfile.abs() == drank.abs() {
                    (true, between(start, land))
                } else {
                    (false, Vec::new())
                }
            }
            PieceKind::Pawn => {
                let forward: i8 = match side {
                    Side::White => 1,
                    Side::Black => -1,
                    Side::Neutral => return (false, Vec::new()),
                };
                let home = match side {
                    Side::White => start.rank() < 2,
                    _ => start.rank() >= 6,
                };
                if drank == forward && dfile.abs() <= 1 {
                    (true, Vec::new())
                } else if home && drank == 2 * forward && dfile == 0 {
                    let crossed = Square::new(start.file(), (start.rank() as i8 + forward) as u8);
                    (true, vec![crossed])
                } else {
                    (false, Vec::new())
                }
            }
        }
    }

    pub fn start(&self) -> Square {
        self.start
    }

    pub fn land(&self) -> Square {
        self.land
    }

    pub fn valid(&self) -> bool {
        self.valid
    }

    pub fn intermediate_squares(&self) -> &[Square] {
        &self.intermediate
    }

    pub fn exception(&self) -> Option<PathException> {
        self.exception
    }
}

/// The squares strictly between two squares on a shared file, rank, or
/// diagonal, ordered from `start` to `land`.
fn between(start: Square, land: Square) -> Vec<Square> {
    let (dfile, drank) = start.delta_to(land);
    let steps = dfile.abs().max(drank.abs());
    let fstep = dfile.signum();
    let rstep = drank.signum();
    (1..steps)
        .map(|i| {
            Square::new(
                (start.file() as i8 + i * fstep) as u8,
                (start.rank() as i8 + i * rstep) as u8,
            )
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::{ChessPath, PathException};
    use crate::board::{PieceKind, Side, Square};

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn path(kind: PieceKind, side: Side, start: &str, land: &str) -> ChessPath {
        ChessPath::new(kind, side, sq(start), sq(land), None)
    }

    #[test]
    fn king_steps() {
        assert!(path(PieceKind::King, Side::White, "d1", "d2").valid());
        assert!(path(PieceKind::King, Side::White, "d1", "e2").valid());
        assert!(!path(PieceKind::King, Side::White, "d1", "d3").valid());
        assert!(!path(PieceKind::King, Side::White, "d1", "d1").valid());
    }

    #[test]
    fn knight_jumps() {
        assert!(path(PieceKind::Knight, Side::White, "b1", "c3").valid());
        assert!(path(PieceKind::Knight, Side::White, "b1", "d2").valid());
        assert!(!path(PieceKind::Knight, Side::White, "b1", "b3").valid());
        assert!(path(PieceKind::Knight, Side::White, "b1", "c3")
            .intermediate_squares()
            .is_empty());
    }

    #[test]
    fn rook_lines() {
        let p = path(PieceKind::Rook, Side::White, "a1", "a5");
        assert!(p.valid());
        assert_eq!(p.intermediate_squares(), &[sq("a2"), sq("a3"), sq("a4")]);

        let p = path(PieceKind::Rook, Side::Black, "h8", "e8");
        assert!(p.valid());
        assert_eq!(p.intermediate_squares(), &[sq("g8"), sq("f8")]);

        assert!(!path(PieceKind::Rook, Side::White, "a1", "b2").valid());
    }

    #[test]
    fn bishop_diagonals() {
        let p = path(PieceKind::Bishop, Side::White, "f1", "d3");
        assert!(p.valid());
        assert_eq!(p.intermediate_squares(), &[sq("e2")]);

        let p = path(PieceKind::Bishop, Side::White, "c1", "g5");
        assert_eq!(p.intermediate_squares(), &[sq("d2"), sq("e3"), sq("f4")]);

        assert!(!path(PieceKind::Bishop, Side::White, "c1", "c4").valid());
    }

    #[test]
    fn pawn_advances_by_side() {
        assert!(path(PieceKind::Pawn, Side::White, "d2", "d3").valid());
        assert!(path(PieceKind::Pawn, Side::White, "d2", "e3").valid());
        assert!(!path(PieceKind::Pawn, Side::White, "d2", "d1").valid());

        assert!(path(PieceKind::Pawn, Side::Black, "d7", "d6").valid());
        assert!(path(PieceKind::Pawn, Side::Black, "d7", "c6").valid());
        assert!(!path(PieceKind::Pawn, Side::Black, "d7", "d8").valid());
    }

    #[test]
    fn pawn_double_step_from_home() {
        let p = path(PieceKind::Pawn, Side::White, "d2", "d4");
        assert!(p.valid());
        assert_eq!(p.intermediate_squares(), &[sq("d3")]);

        let p = path(PieceKind::Pawn, Side::Black, "e7", "e5");
        assert!(p.valid());
        assert_eq!(p.intermediate_squares(), &[sq("e6")]);

        assert!(!path(PieceKind::Pawn, Side::White, "d3", "d5").valid());
    }

    #[test]
    fn castle_rook_keeps_open_squares_except_last() {
        let p = ChessPath::new(
            PieceKind::Rook,
            Side::White,
            sq("a1"),
            sq("c1"),
            Some(PathException::Castle),
        );
        assert!(p.valid());
        assert_eq!(p.intermediate_squares(), &[] as &[Square]);

        let p = ChessPath::new(
            PieceKind::Rook,
            Side::White,
            sq("a1"),
            sq("d1"),
            Some(PathException::Castle),
        );
        assert_eq!(p.intermediate_squares(), &[sq("b1")]);
    }

    #[test]
    fn en_passant_exception() {
        let p = ChessPath::new(
            PieceKind::Pawn,
            Side::White,
            sq("d5"),
            sq("c5"),
            Some(PathException::EnPassant),
        );
        assert!(p.valid());

        let p = ChessPath::new(
            PieceKind::Pawn,
            Side::White,
            sq("d5"),
            sq("d6"),
            Some(PathException::EnPassant),
        );
        assert!(!p.valid());
    }
}
