/// Normalized 2D hand position, `(0, 0)` top-left to `(1, 1)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
    pub detected: bool,
}

impl Pointer {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
            detected: true,
        }
    }

    pub fn lost() -> Self {
        Self::default()
    }
}

impl Default for Pointer {
    fn default() -> Self {
        Self {
            x: 0.5,
            y: 0.5,
            detected: false,
        }
    }
}

/// Hand-tracking input, refreshed once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureState {
    pub pointer: Pointer,
    pub two_hands_active: bool,
}
