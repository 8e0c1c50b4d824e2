mod library;
mod records;

pub use library::{Library, OwnedGameEntry};
pub use records::{Game, OwnedGame, PlaytimeSample, User};
