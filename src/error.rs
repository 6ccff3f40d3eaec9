use thiserror::Error;

/// Static configuration mistakes, detected when a pad is built.
#[derive(Debug, Error, PartialEq)]
pub enum PadError {
    #[error("pad must have at least one socket")]
    NoSockets,

    #[error("secondary dial #{position}: index {index} is outside 0..{sockets}")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        sockets: u32,
    },

    #[error("secondary dial #{position}: spread must be at least 1")]
    ZeroSpread { position: usize },

    #[error("secondary dial #{position}: scale must be positive, got {scale}")]
    BadScale { position: usize, scale: f32 },

    #[error("cross dial {id}: dead_zone must be in [0, 0.5), got {dead_zone}")]
    BadDeadZone { id: i32, dead_zone: f32 },

    #[error("{what} must be a finite number, got {value}")]
    NotFinite { what: String, value: f32 },

    #[error("primary buttons dial needs at least one button")]
    NoButtons,

    #[error("{0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, PadError>;
