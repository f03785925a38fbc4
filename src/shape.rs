//! What the trees need to know about the objects they store.
//!
use crate::geom::{max, min, Point, Rectangle, Scalar};

/// Position and, for rectangular objects, extent of a stored or queried object.
///
/// Point objects only implement `x` and `y`. Rectangular objects also override `extent`,
/// where `(x, y)` is the bottom-left corner of their axis aligned bounding box.
pub trait Spatial {
    type Scalar: Scalar;

    fn x(&self) -> Self::Scalar;
    fn y(&self) -> Self::Scalar;

    /// `(width, height)`, None for point objects.
    fn extent(&self) -> Option<(Self::Scalar, Self::Scalar)> {
        None
    }

    fn shape(&self) -> Shape<Self::Scalar> {
        let origin = Point::new(self.x(), self.y());
        match self.extent() {
            Some((width, height)) => Shape::Rect {
                origin,
                width,
                height,
            },
            None => Shape::Point(origin),
        }
    }
}

/// The two kinds of objects the trees classify differently.
///
/// A point always falls into exactly one quadrant, a rectangle may straddle several.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<S> {
    Point(Point<S>),
    Rect {
        origin: Point<S>,
        width: S,
        height: S,
    },
}

impl<S: Scalar> Shape<S> {
    /// Bottom-left corner of the bounding box
    pub fn min(&self) -> Point<S> {
        match *self {
            Shape::Point(p) => p,
            Shape::Rect { origin, .. } => origin,
        }
    }

    /// Top-right corner of the bounding box
    pub fn max(&self) -> Point<S> {
        match *self {
            Shape::Point(p) => p,
            Shape::Rect {
                origin,
                width,
                height,
            } => Point::new(origin.x() + width, origin.y() + height),
        }
    }

    /// Same order as [`Rectangle::corners`]. A point repeats itself 4 times.
    pub fn corners(&self) -> [Point<S>; 4] {
        let (lo, hi) = (self.min(), self.max());
        [
            lo,
            Point::new(lo.x(), hi.y()),
            Point::new(hi.x(), lo.y()),
            hi,
        ]
    }

    pub fn bounding_box(&self) -> Rectangle<S> {
        let (lo, hi) = (self.min(), self.max());
        Rectangle::new(lo.x(), lo.y(), hi.x() - lo.x(), hi.y() - lo.y())
    }

    /// Smallest shape covering both
    pub(crate) fn union(&self, other: &Self) -> Self {
        let (a, b) = (self.min(), other.min());
        let (c, d) = (self.max(), other.max());
        let origin = Point::new(min(a.x(), b.x()), min(a.y(), b.y()));
        let top_right = Point::new(max(c.x(), d.x()), max(c.y(), d.y()));
        Shape::Rect {
            origin,
            width: top_right.x() - origin.x(),
            height: top_right.y() - origin.y(),
        }
    }
}

impl<S: Scalar> Spatial for Point<S> {
    type Scalar = S;

    fn x(&self) -> S {
        Point::x(self)
    }

    fn y(&self) -> S {
        Point::y(self)
    }
}

impl<S: Scalar> Spatial for Rectangle<S> {
    type Scalar = S;

    fn x(&self) -> S {
        Rectangle::x(self)
    }

    fn y(&self) -> S {
        Rectangle::y(self)
    }

    fn extent(&self) -> Option<(S, S)> {
        Some((self.width(), self.height()))
    }
}

impl<S: Scalar> Spatial for Shape<S> {
    type Scalar = S;

    fn x(&self) -> S {
        self.min().x()
    }

    fn y(&self) -> S {
        self.min().y()
    }

    fn extent(&self) -> Option<(S, S)> {
        match *self {
            Shape::Point(_) => None,
            Shape::Rect { width, height, .. } => Some((width, height)),
        }
    }

    fn shape(&self) -> Shape<S> {
        *self
    }
}

impl<'a, T: Spatial> Spatial for &'a T {
    type Scalar = T::Scalar;

    fn x(&self) -> Self::Scalar {
        (**self).x()
    }

    fn y(&self) -> Self::Scalar {
        (**self).y()
    }

    fn extent(&self) -> Option<(Self::Scalar, Self::Scalar)> {
        (**self).extent()
    }

    fn shape(&self) -> Shape<Self::Scalar> {
        (**self).shape()
    }
}
