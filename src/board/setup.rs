use crate::board::{PieceKind, Power, PowerId, Side, Square};
use lazy_static::lazy_static;

/// An initial board setup: the power list, the supply-center placement, and
/// the starting pieces.
///
/// The first three power slots are always the ambient neutral, white, and
/// black powers used for square and supply-center ownership; playing powers
/// follow them.
#[derive(Debug, Clone)]
pub struct BoardSetup {
    powers: Vec<Power>,
    sc_mask: [[bool; 8]; 8],
    pieces: Vec<(PowerId, Vec<(PieceKind, Square)>)>,
}

impl BoardSetup {
    pub fn new() -> Self {
        BoardSetup {
            powers: vec![
                Power::new("neutral", Side::Neutral, false),
                Power::new("white", Side::White, false),
                Power::new("black", Side::Black, false),
            ],
            sc_mask: [[false; 8]; 8],
            pieces: Vec::new(),
        }
    }

    /// Register a playing power, returning its id.
    pub fn add_power(&mut self, power: Power) -> PowerId {
        let id = PowerId(self.powers.len());
        self.powers.push(power);
        id
    }

    /// Set the supply-center mask, rank 0 first.
    pub fn set_sc_mask(&mut self, mask: [[bool; 8]; 8]) {
        self.sc_mask = mask;
    }

    /// Add starting pieces for a power from placements like `"K d1"`.
    ///
    /// # Panics
    ///
    /// Panics on a malformed placement; setups are static data.
    pub fn add_pieces(&mut self, power: PowerId, placements: &[&str]) {
        let parsed = placements
            .iter()
            .map(|p| {
                let text = p.replace(' ', "");
                let kind = text[..1]
                    .parse::<PieceKind>()
                    .unwrap_or_else(|_| panic!("bad piece in placement '{}'", p));
                let square = text[1..]
                    .parse::<Square>()
                    .unwrap_or_else(|_| panic!("bad square in placement '{}'", p));
                (kind, square)
            })
            .collect();
        self.pieces.push((power, parsed));
    }

    pub fn powers(&self) -> &[Power] {
        &self.powers
    }

    pub fn sc_mask(&self) -> [[bool; 8]; 8] {
        self.sc_mask
    }

    pub fn pieces(&self) -> &[(PowerId, Vec<(PieceKind, Square)>)] {
        &self.pieces
    }
}

impl Default for BoardSetup {
    fn default() -> Self {
        BoardSetup::new()
    }
}

lazy_static! {
    static ref STANDARD_SETUP: BoardSetup = load_standard();
}

/// Gets a static reference to the standard four-power setup with 29 supply
/// centers.
pub fn standard_setup() -> &'static BoardSetup {
    &STANDARD_SETUP
}

fn load_standard() -> BoardSetup {
    const T: bool = true;
    const F: bool = false;

    let mut setup = BoardSetup::new();
    let england = setup.add_power(Power::new("England", Side::White, true));
    let italy = setup.add_power(Power::new("Italy", Side::White, false));
    let france = setup.add_power(Power::new("France", Side::Black, false));
    let scandinavia = setup.add_power(Power::new("Scandinavia", Side::Black, true));

    // Rank 1 at the top of the literal, rank 8 at the bottom.
    setup.set_sc_mask([
        [T, T, F, T, T, T, F, T],
        [F, F, T, F, T, F, F, T],
        [F, F, T, F, T, F, T, F],
        [F, F, T, F, T, F, F, F],
        [T, T, F, T, F, F, F, F],
        [F, F, F, F, T, T, F, T],
        [F, T, F, T, T, F, F, F],
        [T, F, T, T, T, F, T, T],
    ]);

    setup.add_pieces(england, &["K d1", "P c2", "N b1"]);
    setup.add_pieces(italy, &["K e1", "P e2", "B f1"]);
    setup.add_pieces(france, &["K e8", "P e7", "N g8"]);
    setup.add_pieces(scandinavia, &["K d8", "P d7", "B c8"]);

    setup
}
