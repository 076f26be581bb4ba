use std::f64::consts::TAU;

use super::types::Canvas;

const MIN_CHORD: f64 = 0.25;
const MIN_DELTA: f64 = 1e-3;
const DEFAULT_START_DELTA: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralPoint {
    pub x: f64,
    pub y: f64,
    /// False once the spiral has travelled past its maximum angle. The point
    /// carrying `false` is still a valid candidate.
    pub has_more: bool,
}

/// Archimedean spiral stepped by arc length, so candidates are spaced about
/// `chord` pixels apart no matter how far out the spiral has grown.
#[derive(Debug, Clone)]
pub struct SpiralPositioner {
    delta: f64,
    start_delta: f64,
    delta_max: f64,
    away_step: f64,
    chord: f64,
    phase: f64,
    start_x: f64,
    start_y: f64,
    x_scale: f64,
    y_scale: f64,
    exhausted: bool,
}

impl SpiralPositioner {
    pub fn new(canvas: &Canvas, chord: f64, phase: f64) -> Self {
        let chord = if chord.is_finite() {
            chord.max(MIN_CHORD)
        } else {
            MIN_CHORD
        };
        let radius = canvas.width().max(canvas.height()) / 2.0;
        let delta_max = TAU * radius / chord;
        let away_step = radius / delta_max;
        let (start_x, start_y) = canvas.center();
        Self {
            delta: DEFAULT_START_DELTA,
            start_delta: DEFAULT_START_DELTA,
            delta_max,
            away_step,
            chord,
            phase,
            start_x,
            start_y,
            x_scale: 1.0,
            y_scale: 1.0,
            exhausted: false,
        }
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn delta_max(&self) -> f64 {
        self.delta_max
    }

    pub fn away_step(&self) -> f64 {
        self.away_step
    }

    pub fn chord(&self) -> f64 {
        self.chord
    }

    pub fn start(&self) -> (f64, f64) {
        (self.start_x, self.start_y)
    }

    /// Angle the next `reset` rewinds to.
    pub fn set_start_delta(&mut self, delta: f64) {
        self.start_delta = delta.max(MIN_DELTA);
    }

    /// Stretch the spiral along the long axis of a word. `ratio` is
    /// width / height; the stretch is capped at `max_bias` either way.
    pub fn set_aspect(&mut self, ratio: f64, max_bias: f64) {
        let max_bias = max_bias.max(1.0);
        let ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio.clamp(1.0 / max_bias, max_bias)
        } else {
            1.0
        };
        if ratio >= 1.0 {
            self.x_scale = ratio;
            self.y_scale = 1.0;
        } else {
            self.x_scale = 1.0;
            self.y_scale = 1.0 / ratio;
        }
    }

    /// Move the origin and rewind the angle.
    pub fn reset(&mut self, start_x: f64, start_y: f64) {
        self.start_x = start_x;
        self.start_y = start_y;
        self.delta = self.start_delta;
        self.exhausted = false;
    }

    pub fn next_point(&mut self) -> SpiralPoint {
        let away = self.away_step * self.delta;
        let angle = self.delta + self.phase;
        let x = self.start_x + angle.cos() * away * self.x_scale;
        let y = self.start_y + angle.sin() * away * self.y_scale;
        self.delta += self.chord / away;
        let has_more = self.delta <= self.delta_max;
        if !has_more {
            self.exhausted = true;
        }
        SpiralPoint { x, y, has_more }
    }
}

/// Yields candidates up to and including the point that reports exhaustion.
impl Iterator for SpiralPositioner {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let point = self.next_point();
        Some((point.x, point.y))
    }
}
