//! Direction of a price move.

/// Direction between two consecutive values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    /// Direction of the move from `from` to `to`.
    #[must_use]
    pub fn between(from: f64, to: f64) -> Self {
        if to > from {
            Self::Up
        } else if to < from {
            Self::Down
        } else {
            Self::Flat
        }
    }

    /// Arrow glyph used by text surfaces.
    #[must_use]
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Up => "▲",
            Self::Down => "▼",
            Self::Flat => "•",
        }
    }
}
