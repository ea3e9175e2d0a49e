use typestate::RegisterPort;

use super::Display;
use crate::color::Color;
use crate::memory_map::CANVAS_HEIGHT;
use crate::memory_map::CANVAS_WIDTH;

/// Integer Bresenham walk between two points, both endpoints included.
///
/// Pixels come out starting at `(x1, y1)`. Pixel selection always follows the
/// walk taken from the endpoint with the smaller major-axis coordinate, so a
/// line and its reverse touch the same pixels in opposite order. Every point
/// lies inside the bounding box of the endpoints, which keeps coordinates in
/// `u32`.
#[derive(Debug, Clone)]
pub struct Line {
    major0: i64,
    minor0: i64,
    minor_step: i64,
    dmajor: u64,
    dminor: u64,
    x_major: bool,
    reversed: bool,
    step: u64,
}

impl Line {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        let (x1, y1, x2, y2) = (x1 as i64, y1 as i64, x2 as i64, y2 as i64);
        let x_major = (x2 - x1).abs() > (y2 - y1).abs();

        let (a, b) = if x_major {
            ((x1, y1), (x2, y2))
        } else {
            ((y1, x1), (y2, x2))
        };
        let reversed = a.0 > b.0;
        let (start, end) = if reversed { (b, a) } else { (a, b) };

        Self {
            major0: start.0,
            minor0: start.1,
            minor_step: if end.1 < start.1 { -1 } else { 1 },
            dmajor: (end.0 - start.0) as u64,
            dminor: (end.1 - start.1).unsigned_abs(),
            x_major,
            reversed,
            step: 0,
        }
    }

    /// Point `k` major steps from the low end.
    ///
    /// The walk starts with `err = dmajor >> 1` and steps the minor axis each
    /// time `err` goes negative, so after `k` steps it has taken
    /// `ceil((k * dminor - (dmajor >> 1)) / dmajor)` minor steps. The
    /// numerator is never negative, and fits `u64` for `u32` coordinates.
    fn point(&self, k: u64) -> (u32, u32) {
        let minor_steps = match self.dmajor {
            0 => 0,
            d => (k * self.dminor + d - 1 - (d >> 1)) / d,
        };
        let major = self.major0 + k as i64;
        let minor = self.minor0 + self.minor_step * minor_steps as i64;

        if self.x_major {
            (major as u32, minor as u32)
        } else {
            (minor as u32, major as u32)
        }
    }
}

impl Iterator for Line {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<(u32, u32)> {
        if self.step > self.dmajor {
            return None;
        }
        let k = if self.reversed {
            self.dmajor - self.step
        } else {
            self.step
        };
        self.step += 1;
        Some(self.point(k))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.dmajor + 1).saturating_sub(self.step);
        match usize::try_from(left) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl<P: RegisterPort> Display<P> {
    /// Paints the whole canvas row by row, then commits once.
    pub fn clear(&mut self, color: Color) {
        for y in 0..CANVAS_HEIGHT {
            for x in 0..CANVAS_WIDTH {
                self.set_pixel(x, y, color);
            }
        }
        self.commit();
    }

    pub fn draw_line(&mut self, x1: u32, y1: u32, x2: u32, y2: u32, color: Color) {
        for (x, y) in Line::new(x1, y1, x2, y2) {
            self.set_pixel(x, y, color);
        }
        self.commit();
    }

    /// Outline as four lines: top, right, bottom, left. Corners are shared.
    /// Each edge commits on its own.
    pub fn draw_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Color) {
        if w == 0 || h == 0 {
            return;
        }
        let right = x.saturating_add(w - 1);
        let bottom = y.saturating_add(h - 1);

        self.draw_line(x, y, right, y, color);
        self.draw_line(right, y, right, bottom, color);
        self.draw_line(right, bottom, x, bottom, color);
        self.draw_line(x, bottom, x, y, color);
    }

    /// Paints `[x, x + w) × [y, y + h)` row by row, then commits once.
    ///
    /// Pixels past the canvas are dropped one by one like any other
    /// out-of-range `set_pixel`.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Color) {
        // set_pixel drops these anyway; don't spin through them
        let x_end = x.saturating_add(w).min(CANVAS_WIDTH);
        let y_end = y.saturating_add(h).min(CANVAS_HEIGHT);

        for row in y..y_end {
            for col in x..x_end {
                self.set_pixel(col, row, color);
            }
        }
        self.commit();
    }
}
