use thiserror::Error;

use crate::sprites::SpriteId;

/// Errors raised while setting up a scene
#[derive(Debug, Error)]
pub enum Error {
    /// The texture provider has no sprite for an id the scene draws
    #[error("sprite catalog has no sprite for {0:?}")]
    MissingSprite(SpriteId),
    /// A sprite exists but its pixel data does not match its dimensions
    #[error("sprite {id:?} is malformed: {reason}")]
    MalformedSprite {
        /// Offending sprite
        id: SpriteId,
        /// What was wrong with it
        reason: String,
    },
    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
