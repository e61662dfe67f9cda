use crate::board::{BoardSetup, Piece, PieceId, PieceKind, Power, PowerId, Side, Square};

/// The chess board: pieces, square ownership, supply-center ownership, and
/// en-passant marks.
///
/// Pieces live in an arena and are addressed by [`PieceId`]; a handle stays
/// valid until the piece is removed. The adjudicator only reads the board;
/// mutation happens when orders execute after adjudication.
pub struct Board {
    powers: Vec<Power>,
    pieces: Vec<Option<Piece>>,
    sc_mask: [[bool; 8]; 8],
    ownership: [[PowerId; 8]; 8],
    sc_ownership: [[PowerId; 8]; 8],
    en_passant: Vec<(PieceId, Square)>,
}

impl Board {
    pub fn new(setup: &BoardSetup) -> Self {
        let sc_mask = setup.sc_mask();
        let mut sc_ownership = [[PowerId::NEUTRAL; 8]; 8];
        // Home supply centers start owned by their side.
        for rank in 0..8 {
            for file in 0..8 {
                if !sc_mask[rank][file] {
                    continue;
                }
                if rank < 2 {
                    sc_ownership[rank][file] = PowerId::WHITE;
                } else if rank >= 6 {
                    sc_ownership[rank][file] = PowerId::BLACK;
                }
            }
        }

        Board {
            powers: setup.powers().to_vec(),
            pieces: Vec::new(),
            sc_mask,
            ownership: [[PowerId::NEUTRAL; 8]; 8],
            sc_ownership,
            en_passant: Vec::new(),
        }
    }

    pub fn power(&self, id: PowerId) -> &Power {
        &self.powers[id.0]
    }

    /// The playing powers, excluding the ambient neutral/white/black slots.
    pub fn true_powers(&self) -> impl Iterator<Item = PowerId> {
        (3..self.powers.len()).map(PowerId)
    }

    /// Find a playing power whose name starts with `prefix`, ignoring case.
    pub fn find_power(&self, prefix: &str) -> Option<PowerId> {
        if prefix.is_empty() {
            return None;
        }
        let prefix = prefix.to_lowercase();
        self.true_powers()
            .find(|&id| self.power(id).name().to_lowercase().starts_with(&prefix))
    }

    pub fn piece(&self, id: PieceId) -> &Piece {
        self.pieces[id.0]
            .as_ref()
            .expect("piece handle refers to a removed piece")
    }

    pub fn pieces(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| PieceId(i))
    }

    pub fn pieces_of(&self, power: PowerId) -> impl Iterator<Item = PieceId> + '_ {
        self.pieces()
            .filter(move |&id| self.piece(id).power() == power)
    }

    pub fn piece_at(&self, square: Square) -> Option<PieceId> {
        self.pieces().find(|&id| self.piece(id).square() == square)
    }

    pub fn moved(&self, id: PieceId) -> bool {
        self.piece(id).moved()
    }

    /// A narrated name for a piece, e.g. "England King at d1".
    pub fn describe(&self, id: PieceId) -> String {
        let piece = self.piece(id);
        format!(
            "{} {} at {}",
            self.power(piece.power()),
            piece.kind(),
            piece.square()
        )
    }

    pub fn add_piece(&mut self, kind: PieceKind, power: PowerId, square: Square) -> PieceId {
        let id = PieceId(self.pieces.len());
        self.pieces.push(Some(Piece::new(kind, power, square)));
        self.set_ownership(square, power);
        id
    }

    pub fn remove_piece(&mut self, id: PieceId) {
        self.pieces[id.0] = None;
    }

    pub fn vacate_square(&mut self, square: Square) {
        if let Some(id) = self.piece_at(square) {
            self.remove_piece(id);
        }
    }

    pub fn move_piece_to(&mut self, id: PieceId, square: Square) {
        let power = {
            let piece = self.pieces[id.0]
                .as_mut()
                .expect("piece handle refers to a removed piece");
            piece.move_to(square);
            piece.power()
        };
        self.set_ownership(square, power);
    }

    pub fn owner(&self, square: Square) -> PowerId {
        self.ownership[square.rank() as usize][square.file() as usize]
    }

    pub fn set_ownership(&mut self, square: Square, power: PowerId) {
        self.ownership[square.rank() as usize][square.file() as usize] = power;
    }

    pub fn is_supply_center(&self, square: Square) -> bool {
        self.sc_mask[square.rank() as usize][square.file() as usize]
    }

    pub fn sc_owner(&self, square: Square) -> PowerId {
        self.sc_ownership[square.rank() as usize][square.file() as usize]
    }

    fn set_sc_ownership(&mut self, square: Square, power: PowerId) {
        if self.is_supply_center(square) {
            self.sc_ownership[square.rank() as usize][square.file() as usize] = power;
        }
    }

    /// Claim supply centers for the pieces parked on them. Called at the
    /// fall-to-winter phase boundary.
    ///
    /// The middle ranks are claimed by any piece; the home ranks only flip
    /// when a pawn reaches the far side of the board.
    pub fn update_sc_ownership(&mut self) {
        let ids = self.pieces().collect::<Vec<_>>();
        for id in ids {
            let (kind, square, power) = {
                let piece = self.piece(id);
                (piece.kind(), piece.square(), piece.power())
            };
            let side = self.power(power).side();
            if square.rank() >= 2 && square.rank() < 6 {
                self.set_sc_ownership(square, power);
            } else if kind == PieceKind::Pawn {
                if side == Side::White && square.rank() == 7 {
                    self.set_sc_ownership(square, power);
                } else if side == Side::Black && square.rank() == 0 {
                    self.set_sc_ownership(square, power);
                }
            }
        }
    }

    pub fn mark_en_passant(&mut self, pawn: PieceId, crossed: Square) {
        self.en_passant.push((pawn, crossed));
    }

    pub fn clear_en_passant(&mut self) {
        self.en_passant.clear();
    }

    /// Whether `pawn` crossed `square` with a two-step move last turn,
    /// leaving it open to en passant.
    pub fn can_en_passant(&self, pawn: PieceId, square: Square) -> bool {
        self.en_passant.contains(&(pawn, square))
    }
}
