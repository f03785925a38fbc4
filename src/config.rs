//! Construction parameters of the trees.
//!
//! Invalid parameters are programmer errors: the `new` constructors panic with the
//! [`ConfigError`] message, the `try_*` constructors return it.
use crate::geom::{Rectangle, Scalar};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Deepest linear tree that is accepted.
///
/// Node codes of a tree with `n` levels are `2n - 1` bits wide and the skeleton holds
/// `(4^n - 1) / 3` nodes.
pub const MAX_LINEAR_LEVELS: u32 = 12;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("max_levels must be at least 1")]
    ZeroLevels,
    #[error("max_levels {levels} exceeds the supported maximum of {max}")]
    TooManyLevels { levels: u32, max: u32 },
    #[error("max_objects must be at least 1")]
    ZeroObjects,
    #[error("bounds must have a positive extent, got {width}x{height}")]
    EmptyBounds { width: f64, height: f64 },
}

/// Parameters of the adaptive [`Quadtree`](crate::quadtree::Quadtree).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QuadtreeConfig {
    /// Nodes at this depth never split, the root is at depth 0.
    pub max_levels: u32,
    /// A node splits once it holds more than this many objects.
    pub max_objects: usize,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            max_levels: 10,
            max_objects: 10,
        }
    }
}

impl QuadtreeConfig {
    pub fn new(max_levels: u32, max_objects: usize) -> Self {
        Self {
            max_levels,
            max_objects,
        }
    }

    pub fn validate<S: Scalar>(&self, bounds: &Rectangle<S>) -> Result<(), ConfigError> {
        if self.max_levels == 0 {
            return Err(ConfigError::ZeroLevels);
        }
        if self.max_objects == 0 {
            return Err(ConfigError::ZeroObjects);
        }
        validate_bounds(bounds)
    }
}

/// Parameters of the [`LinearQuadtree`](crate::linear_quadtree::LinearQuadtree).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinearConfig {
    /// Number of levels in the skeleton, including the root.
    pub max_levels: u32,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self { max_levels: 5 }
    }
}

impl LinearConfig {
    pub fn new(max_levels: u32) -> Self {
        Self { max_levels }
    }

    pub fn validate<S: Scalar>(&self, bounds: &Rectangle<S>) -> Result<(), ConfigError> {
        if self.max_levels == 0 {
            return Err(ConfigError::ZeroLevels);
        }
        if self.max_levels > MAX_LINEAR_LEVELS {
            return Err(ConfigError::TooManyLevels {
                levels: self.max_levels,
                max: MAX_LINEAR_LEVELS,
            });
        }
        validate_bounds(bounds)
    }
}

fn validate_bounds<S: Scalar>(bounds: &Rectangle<S>) -> Result<(), ConfigError> {
    let zero = S::zero();
    // written so that NaN extents are rejected as well
    if !(bounds.width() > zero && bounds.height() > zero) {
        return Err(ConfigError::EmptyBounds {
            width: bounds.width().as_f64(),
            height: bounds.height().as_f64(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let bounds = Rectangle::new(0, 0, 1000, 1000);
        assert_eq!(QuadtreeConfig::default().validate(&bounds), Ok(()));
        assert_eq!(LinearConfig::default().validate(&bounds), Ok(()));
    }

    #[test]
    fn rejects_degenerate_parameters() {
        let bounds = Rectangle::new(0.0, 0.0, 10.0, 10.0);

        assert_eq!(
            QuadtreeConfig::new(0, 4).validate(&bounds),
            Err(ConfigError::ZeroLevels)
        );
        assert_eq!(
            QuadtreeConfig::new(4, 0).validate(&bounds),
            Err(ConfigError::ZeroObjects)
        );
        assert_eq!(
            LinearConfig::new(MAX_LINEAR_LEVELS + 1).validate(&bounds),
            Err(ConfigError::TooManyLevels {
                levels: MAX_LINEAR_LEVELS + 1,
                max: MAX_LINEAR_LEVELS
            })
        );

        let flat = Rectangle::new(0.0, 0.0, 10.0, 0.0);
        assert_eq!(
            LinearConfig::new(3).validate(&flat),
            Err(ConfigError::EmptyBounds {
                width: 10.0,
                height: 0.0
            })
        );
        let nan = Rectangle::new(0.0, 0.0, std::f64::NAN, 1.0);
        assert!(QuadtreeConfig::default().validate(&nan).is_err());
    }

    #[test]
    fn error_messages() {
        let err = ConfigError::TooManyLevels { levels: 20, max: 12 };
        assert_eq!(
            err.to_string(),
            "max_levels 20 exceeds the supported maximum of 12"
        );
    }
}
