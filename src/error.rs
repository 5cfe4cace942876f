use thiserror::Error;

/// Errors produced by the game engine.
///
/// None of these are fatal: hosts ignore `InvalidAction`, and treat `OutOfRange`
/// as the end of the game.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("invalid action: {0}")]
    InvalidAction(&'static str),

    #[error("level {index} is out of range (catalog has {len} levels)")]
    OutOfRange { index: usize, len: usize },

    #[error("content pool error: {0}")]
    Pool(String),
}

pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_readable() {
        assert_eq!(
            GameError::InvalidAction("card already matched").to_string(),
            "invalid action: card already matched"
        );
        assert_eq!(
            GameError::OutOfRange { index: 5, len: 5 }.to_string(),
            "level 5 is out of range (catalog has 5 levels)"
        );
    }
}
