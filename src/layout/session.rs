use std::borrow::Borrow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace, warn};

use super::error::PackError;
use super::field::CollisionField;
use super::mask::WordMask;
use super::random::Randomizer;
use super::spiral::SpiralPositioner;
use super::types::{Canvas, FailureReason, PixelRect, Placement, PlacementFailure, WordId};
use crate::config::PackConfig;

// Recentering moves a word this many pixels past the dilation radius per nudge.
const RECENTER_EXTRA_STEP: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

const QUADRANT_SIGNS: [(f64, f64); 4] = [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)];

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Direction of the quadrant relative to the canvas center.
    pub fn signs(self) -> (f64, f64) {
        QUADRANT_SIGNS[self as usize]
    }
}

/// Cooperative cancellation shared between a packing run and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub placements: Vec<Placement>,
    pub canceled: bool,
}

/// One cloud-generation pass over a single canvas.
///
/// Words are placed strictly one after another: each commit lands in the
/// field before the next word is tested, so later words see every earlier
/// placement. Once any word exhausts its first spiral the session switches to
/// random quadrant starts for the rest of its life.
#[derive(Debug)]
pub struct PackingSession<R> {
    canvas: Canvas,
    field: CollisionField,
    randomizer: R,
    config: PackConfig,
    random_starts: bool,
    next_id: usize,
    placed: Vec<(WordId, PixelRect)>,
    failures: Vec<PlacementFailure>,
}

impl<R: Randomizer> PackingSession<R> {
    pub fn new(width: f64, height: f64, randomizer: R, config: PackConfig) -> Result<Self, PackError> {
        let canvas = Canvas::new(width, height)?;
        config.validate()?;
        let field = CollisionField::new(
            &canvas,
            config.edge_margin,
            config.dilation,
            config.dilation_shape,
        );
        debug!(
            width = canvas.pixel_width(),
            height = canvas.pixel_height(),
            margin = config.edge_margin,
            dilation = config.dilation,
            "packing session created"
        );
        Ok(Self {
            canvas,
            field,
            randomizer,
            config,
            random_starts: false,
            next_id: 0,
            placed: Vec::new(),
            failures: Vec::new(),
        })
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn field(&self) -> &CollisionField {
        &self.field
    }

    pub fn placed(&self) -> &[(WordId, PixelRect)] {
        &self.placed
    }

    pub fn failures(&self) -> &[PlacementFailure] {
        &self.failures
    }

    pub fn is_random_start_mode(&self) -> bool {
        self.random_starts
    }

    pub fn into_randomizer(self) -> R {
        self.randomizer
    }

    /// Find a free spot for `mask`, commit it and report where it went. A word
    /// that cannot be placed is recorded in `failures` and the session stays
    /// usable.
    pub fn try_place(&mut self, mask: &WordMask) -> Placement {
        let id = WordId(self.next_id);
        self.next_id += 1;

        if !self.field.can_ever_fit(mask) {
            return self.fail(id, FailureReason::OutOfBounds);
        }

        let mut spiral =
            SpiralPositioner::new(&self.canvas, self.config.spiral_chord, self.config.spiral_phase);
        spiral.set_aspect(
            mask.width() as f64 / mask.height() as f64,
            self.config.max_aspect_bias,
        );

        let start = if self.random_starts {
            self.random_start()
        } else {
            self.canvas.center()
        };
        let mut found = self.search(mask, &mut spiral, start);

        let mut restarts = 0;
        while found.is_none() {
            if !self.random_starts {
                debug!(word = id.0, "center spiral exhausted, switching to random starts");
                self.random_starts = true;
            }
            if restarts >= self.config.restart_attempts {
                return self.fail(id, FailureReason::Exhausted);
            }
            restarts += 1;
            let start = self.random_start();
            trace!(word = id.0, restarts, x = start.0, y = start.1, "restarting spiral");
            found = self.search(mask, &mut spiral, start);
        }

        let Some(mut rect) = found else {
            return self.fail(id, FailureReason::Exhausted);
        };
        if self.random_starts && self.config.recenter {
            rect = self.recenter(mask, rect);
        }

        if let Err(err) = self.field.commit(mask, rect.x, rect.y) {
            warn!(word = id.0, %err, "commit rejected");
            return self.fail(id, FailureReason::OutOfBounds);
        }
        trace!(word = id.0, x = rect.x, y = rect.y, restarts, "word placed");
        self.placed.push((id, rect));
        Placement::Placed { id, rect }
    }

    /// Place masks in iteration order, checking `cancel` before each one.
    /// Words left unattempted after a cancellation are not failures.
    pub fn place_all<I, M>(&mut self, masks: I, cancel: &CancelFlag) -> SessionReport
    where
        I: IntoIterator<Item = M>,
        M: Borrow<WordMask>,
    {
        let mut placements = Vec::new();
        let mut masks = masks.into_iter();
        loop {
            if cancel.is_canceled() {
                debug!(placed = self.placed.len(), "packing canceled");
                return SessionReport {
                    placements,
                    canceled: true,
                };
            }
            let Some(mask) = masks.next() else {
                break;
            };
            placements.push(self.try_place(mask.borrow()));
        }
        SessionReport {
            placements,
            canceled: false,
        }
    }

    fn fail(&mut self, id: WordId, reason: FailureReason) -> Placement {
        debug!(word = id.0, ?reason, "word could not be placed");
        let failure = PlacementFailure { id, reason };
        self.failures.push(failure);
        Placement::Failed(failure)
    }

    // Test the start itself, then walk the spiral around it.
    fn search(
        &self,
        mask: &WordMask,
        spiral: &mut SpiralPositioner,
        (center_x, center_y): (f64, f64),
    ) -> Option<PixelRect> {
        let origin_x = center_x - mask.width() as f64 / 2.0;
        let origin_y = center_y - mask.height() as f64 / 2.0;
        let mut last = (origin_x.round() as i64, origin_y.round() as i64);
        if !self.field.collides(mask, last.0, last.1) {
            return Some(PixelRect::new(last.0, last.1, mask.width(), mask.height()));
        }

        spiral.reset(origin_x, origin_y);
        loop {
            let point = spiral.next_point();
            let candidate = (point.x.round() as i64, point.y.round() as i64);
            if candidate != last {
                if !self.field.collides(mask, candidate.0, candidate.1) {
                    return Some(PixelRect::new(
                        candidate.0,
                        candidate.1,
                        mask.width(),
                        mask.height(),
                    ));
                }
                last = candidate;
            }
            if !point.has_more {
                return None;
            }
        }
    }

    fn random_start(&mut self) -> (f64, f64) {
        let idx = self.randomizer.next(Quadrant::ALL.len() as i64).clamp(0, 3) as usize;
        let (x_sign, y_sign) = Quadrant::ALL[idx].signs();
        let width = self.canvas.pixel_width() as i64;
        let height = self.canvas.pixel_height() as i64;
        let dx = self.randomizer.next_range(width / 8, 3 * width / 8) as f64;
        let dy = self.randomizer.next_range(height / 8, 3 * height / 8) as f64;
        let (center_x, center_y) = self.canvas.center();
        (center_x + x_sign * dx, center_y + y_sign * dy)
    }

    // Greedy nudge toward the canvas center, one axis at a time. Stops on the
    // last free position before a collision, or once another step could not
    // bring the word any closer.
    fn recenter(&self, mask: &WordMask, mut rect: PixelRect) -> PixelRect {
        let step = (self.config.dilation + RECENTER_EXTRA_STEP) as i64;
        let buffer = self.config.dilation as f64;
        let (center_x, center_y) = self.canvas.center();

        loop {
            let dist = center_x - rect.center().0;
            if dist.abs() <= buffer || dist.abs() < step as f64 {
                break;
            }
            let next_x = rect.x + step * dist.signum() as i64;
            if self.field.collides(mask, next_x, rect.y) {
                break;
            }
            rect.x = next_x;
        }

        loop {
            let dist = center_y - rect.center().1;
            if dist.abs() <= buffer || dist.abs() < step as f64 {
                break;
            }
            let next_y = rect.y + step * dist.signum() as i64;
            if self.field.collides(mask, rect.x, next_y) {
                break;
            }
            rect.y = next_y;
        }

        rect
    }
}
