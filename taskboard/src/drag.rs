//! Edge autoscroll while a card is grabbed.
//!
//! Called once per UI tick. When the pointer sits within `zone` of the top
//! or bottom edge of the column it hovers, the column scrolls toward that
//! edge; the speed grows the longer the pointer stays in the zone, up to a
//! cap. Leaving the zone or ending the drag resets the acceleration.

/// Tuning constants for [`AutoScroll`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollProfile {
    /// Distance from an edge that triggers scrolling.
    pub zone: f64,
    /// Speed on the first tick in the zone.
    pub base_speed: f64,
    /// Speed cap.
    pub max_speed: f64,
    /// Speed added per tick spent in the zone.
    pub acceleration: f64,
}

impl ScrollProfile {
    /// Pixel units, for pointer-driven front ends.
    pub const PIXELS: Self = Self {
        zone: 100.0,
        base_speed: 30.0,
        max_speed: 60.0,
        acceleration: 0.05,
    };

    /// Terminal rows.
    pub const ROWS: Self = Self {
        zone: 2.0,
        base_speed: 0.5,
        max_speed: 3.0,
        acceleration: 0.25,
    };
}

/// Geometry of the scroll container for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Pointer position relative to the container's top edge.
    pub pointer: f64,
    /// Visible height of the container.
    pub height: f64,
    /// Current scroll offset.
    pub offset: f64,
    /// Total height of the content.
    pub content_height: f64,
}

impl Viewport {
    fn max_offset(&self) -> f64 {
        (self.content_height - self.height).max(0.0)
    }
}

/// Per-drag autoscroll state.
#[derive(Debug, Clone)]
pub struct AutoScroll {
    profile: ScrollProfile,
    ticks_in_zone: u32,
}

impl Default for AutoScroll {
    fn default() -> Self {
        Self::new(ScrollProfile::ROWS)
    }
}

impl AutoScroll {
    #[must_use]
    pub const fn new(profile: ScrollProfile) -> Self {
        Self {
            profile,
            ticks_in_zone: 0,
        }
    }

    /// Speed the next in-zone tick would scroll by.
    #[must_use]
    pub fn speed(&self) -> f64 {
        let p = &self.profile;
        f64::from(self.ticks_in_zone)
            .mul_add(p.acceleration, p.base_speed)
            .min(p.max_speed)
    }

    /// Ticks spent continuously in a scroll zone.
    #[must_use]
    pub const fn ticks_in_zone(&self) -> u32 {
        self.ticks_in_zone
    }

    /// Advances one tick and returns the scroll delta: positive scrolls
    /// down, negative up, zero when outside both zones or already at the
    /// end in that direction.
    pub fn tick(&mut self, view: Viewport) -> f64 {
        let speed = self.speed();
        let zone = self.profile.zone;
        let delta = if view.pointer > view.height - zone && view.offset < view.max_offset() {
            Some(speed)
        } else if view.pointer < zone && view.offset > 0.0 {
            Some(-speed)
        } else {
            None
        };

        match delta {
            Some(delta) => {
                self.ticks_in_zone = self.ticks_in_zone.saturating_add(1);
                delta
            }
            None => {
                self.ticks_in_zone = 0;
                0.0
            }
        }
    }

    /// Ends the drag.
    pub const fn cancel(&mut self) {
        self.ticks_in_zone = 0;
    }
}

/// Applies `delta` to `offset`, clamped to the scrollable range.
#[must_use]
pub fn scrolled(view: Viewport, delta: f64) -> f64 {
    (view.offset + delta).clamp(0.0, view.max_offset())
}
