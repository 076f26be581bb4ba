use super::error::PackError;

/// Immutable canvas extent. Collision work happens on the integer pixel grid
/// obtained by flooring each side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    width: f64,
    height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Result<Self, PackError> {
        if !width.is_finite() || !height.is_finite() || width < 1.0 || height < 1.0 {
            return Err(PackError::InvalidArgument(format!(
                "canvas must be at least 1x1 pixels, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    pub fn pixel_width(&self) -> usize {
        self.width.floor() as usize
    }

    pub fn pixel_height(&self) -> usize {
        self.height.floor() as usize
    }
}

/// Axis-aligned rectangle in canvas pixel space. The origin may be negative
/// while a candidate is still being searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: usize,
    pub height: usize,
}

impl PixelRect {
    pub fn new(x: i64, y: i64, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i64 {
        self.x + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.height as i64
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    pub fn intersects(&self, other: &PixelRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Sequence number a session hands out to every word it is asked to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WordId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The mask can never fit inside the field, or committing it was rejected.
    OutOfBounds,
    /// Every spiral (initial plus random restarts) ran out of candidates.
    Exhausted,
    /// No mask could be built for the word, so it never reached the packer.
    Rasterize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementFailure {
    pub id: WordId,
    pub reason: FailureReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Placed { id: WordId, rect: PixelRect },
    Failed(PlacementFailure),
}

impl Placement {
    pub fn id(&self) -> WordId {
        match self {
            Placement::Placed { id, .. } => *id,
            Placement::Failed(failure) => failure.id,
        }
    }

    pub fn rect(&self) -> Option<PixelRect> {
        match self {
            Placement::Placed { rect, .. } => Some(*rect),
            Placement::Failed(_) => None,
        }
    }

    pub fn is_placed(&self) -> bool {
        matches!(self, Placement::Placed { .. })
    }
}

/// A word after sizing, rasterization and placement.
#[derive(Debug, Clone)]
pub struct PlacedWord {
    pub text: String,
    pub weight: f64,
    pub font_size: f32,
    pub rotated: bool,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Start of the baseline in canvas coordinates.
    pub anchor_x: f32,
    pub anchor_y: f32,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct FailedWord {
    pub text: String,
    pub weight: f64,
    pub reason: FailureReason,
}

#[derive(Debug, Clone)]
pub struct CloudLayout {
    pub width: f32,
    pub height: f32,
    pub words: Vec<PlacedWord>,
    pub failed: Vec<FailedWord>,
    /// Set when the run stopped early on a cancellation request. Words that
    /// were never attempted appear in neither `words` nor `failed`.
    pub canceled: bool,
}
