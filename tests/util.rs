#![allow(dead_code)]

use chessdip::board::{standard_setup, PowerId};
use chessdip::Game;

/// A game on the standard powers with an empty board; scenarios place their
/// own pieces.
pub fn game() -> Game {
    Game::new(standard_setup())
}

pub fn power(game: &Game, name: &str) -> PowerId {
    game.find_power(name)
        .unwrap_or_else(|| panic!("power '{}' should exist", name))
}

pub fn setup(game: &mut Game, power_name: &str, pieces: &[&str]) {
    let id = power(game, power_name);
    game.place_pieces(id, pieces);
}

pub fn orders(game: &mut Game, power_name: &str, texts: &[&str]) {
    let id = power(game, power_name);
    for text in texts {
        game.process_order(id, text)
            .unwrap_or_else(|e| panic!("'{}' should be accepted: {}", text, e));
    }
}

/// Assert the adjudicated outcome of each order text.
#[macro_export]
macro_rules! assert_outcomes {
    ($game:expr, $($order:tt : $expected:expr),+ $(,)?) => {
        $(
            assert_eq!(
                $game.outcome_of($order),
                Some($expected),
                "{}",
                $order
            );
        )+
    };
}
