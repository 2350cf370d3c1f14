//! Arena geometry.
//!
//! The arena is an axis-aligned rectangle with its origin in the top-left
//! corner and a border of fixed thickness on every edge. It has no behavior
//! of its own; physics, collision and spawning use it to keep circles inside.
//!
//! # Example
//!
//! ```
//! use sawclash_core::arena::Arena;
//! use glam::Vec2;
//!
//! let arena = Arena::new(400.0, 400.0, 3.0);
//!
//! // A radius-20 actor must keep its center in [23, 377] on both axes.
//! assert!(arena.contains_circle(Vec2::new(23.0, 200.0), 20.0));
//! assert!(!arena.contains_circle(Vec2::new(22.0, 200.0), 20.0));
//!
//! let clamped = arena.clamp_circle(Vec2::new(-50.0, 500.0), 20.0);
//! assert_eq!(clamped, Vec2::new(23.0, 377.0));
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::ArenaConfig;
use crate::rng::SimRng;

/// Bounded rectangular arena.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    width: f32,
    height: f32,
    border: f32,
}

impl Arena {
    /// Creates an arena of the given size and border thickness.
    #[must_use]
    pub const fn new(width: f32, height: f32, border: f32) -> Self {
        Self {
            width,
            height,
            border,
        }
    }

    /// Creates an arena from configuration.
    #[must_use]
    pub const fn from_config(config: &ArenaConfig) -> Self {
        Self::new(config.width, config.height, config.border)
    }

    /// Arena width.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Arena height.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Border thickness.
    #[must_use]
    pub const fn border(&self) -> f32 {
        self.border
    }

    /// Center point of the arena.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Smallest legal center coordinate for a circle of `radius`.
    #[must_use]
    pub fn min_center(&self, radius: f32) -> Vec2 {
        Vec2::splat(radius + self.border)
    }

    /// Largest legal center coordinate for a circle of `radius`.
    #[must_use]
    pub fn max_center(&self, radius: f32) -> Vec2 {
        Vec2::new(
            self.width - radius - self.border,
            self.height - radius - self.border,
        )
    }

    /// Returns true if a circle lies fully inside the border-adjusted arena.
    #[must_use]
    pub fn contains_circle(&self, center: Vec2, radius: f32) -> bool {
        let min = self.min_center(radius);
        let max = self.max_center(radius);
        center.cmpge(min).all() && center.cmple(max).all()
    }

    /// Moves a circle's center to the nearest legal position.
    #[must_use]
    pub fn clamp_circle(&self, center: Vec2, radius: f32) -> Vec2 {
        center.clamp(self.min_center(radius), self.max_center(radius))
    }

    /// Samples a point uniformly, keeping `margin` free on every side.
    ///
    /// The margin is measured from the outer arena edge. If the margin leaves
    /// no room on an axis, that coordinate is the arena center.
    pub fn random_point(&self, rng: &mut SimRng, margin: f32) -> Vec2 {
        Vec2::new(
            rng.range(margin, self.width - margin),
            rng.range(margin, self.height - margin),
        )
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::from_config(&ArenaConfig::default())
    }
}
