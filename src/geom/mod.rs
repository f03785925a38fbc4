//! Geometry primitives shared by both trees.
//!
mod orientation;
mod scalar;

pub use orientation::*;
pub use scalar::Scalar;

pub(crate) use scalar::{max, min};

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point<S> {
    x: S,
    y: S,
}

impl<S: Scalar> Point<S> {
    pub fn new(x: S, y: S) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::new(S::zero(), S::zero())
    }

    #[inline]
    pub fn x(&self) -> S {
        self.x
    }

    #[inline]
    pub fn y(&self) -> S {
        self.y
    }

    pub fn dot(&self, rhs: &Self) -> S {
        self.x * rhs.x + self.y * rhs.y
    }
}

impl<S: Scalar> AddAssign for Point<S> {
    fn add_assign(&mut self, p: Self) {
        self.x = self.x + p.x;
        self.y = self.y + p.y;
    }
}

impl<S: Scalar> Add for Point<S> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<S: Scalar> Sub for Point<S> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<S: Scalar> fmt::Display for Point<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<point x:{} y:{}>", self.x, self.y)
    }
}

/// A line segment between two end-points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineSegment<S> {
    p1: Point<S>,
    p2: Point<S>,
}

impl<S: Scalar> LineSegment<S> {
    pub fn new(p1: Point<S>, p2: Point<S>) -> Self {
        Self { p1, p2 }
    }

    #[inline]
    pub fn p1(&self) -> Point<S> {
        self.p1
    }

    #[inline]
    pub fn p2(&self) -> Point<S> {
        self.p2
    }

    #[inline]
    pub fn dx(&self) -> S {
        self.p2.x - self.p1.x
    }

    #[inline]
    pub fn dy(&self) -> S {
        self.p2.y - self.p1.y
    }

    pub fn distance_squared(&self) -> S {
        self.dx() * self.dx() + self.dy() * self.dy()
    }

    /// Euclidean length
    pub fn length(&self) -> f64 {
        self.distance_squared().as_f64().sqrt()
    }

    /// The segment perpendicular to this one, centered on the origin: `(-dy, dx) -> (dy, -dx)`.
    /// Its `p2` is the direction used to tell front from back in [`point_side`].
    pub fn normal(&self) -> Self {
        let (dx, dy) = (self.dx(), self.dy());
        Self::new(Point::new(-dy, dx), Point::new(dy, -dx))
    }

    /// Segment of unit length starting at `p1`, pointing towards `p2`.
    /// A zero length segment yields non-finite coordinates.
    pub fn normalize(&self) -> LineSegment<f64> {
        let d = self.length();
        let p1 = Point::new(self.p1.x.as_f64(), self.p1.y.as_f64());
        let p2 = Point::new(p1.x + self.dx().as_f64() / d, p1.y + self.dy().as_f64() / d);
        LineSegment::new(p1, p2)
    }

    pub fn unit_normal(&self) -> LineSegment<f64> {
        self.normal().normalize()
    }
}

impl<S: Scalar> fmt::Display for LineSegment<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<line_segment p1:{} p2:{}>", self.p1, self.p2)
    }
}

/// Axis aligned rectangle given by its bottom-left origin and its extent.
///
/// The 4 boundary edges are computed once on construction, line queries test against them
/// on every visited node.
///
/// Serialized as its origin and extent only, the edges are rebuilt on deserialization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle<S> {
    x: S,
    y: S,
    w: S,
    h: S,
    edges: [LineSegment<S>; 4],
}

impl<S: Scalar> Rectangle<S> {
    pub fn new(x: S, y: S, w: S, h: S) -> Self {
        let (r, t) = (x + w, y + h);
        let edges = [
            LineSegment::new(Point::new(x, y), Point::new(r, y)),
            LineSegment::new(Point::new(r, y), Point::new(r, t)),
            LineSegment::new(Point::new(r, t), Point::new(x, t)),
            LineSegment::new(Point::new(x, t), Point::new(x, y)),
        ];
        Self { x, y, w, h, edges }
    }

    /// Bounding box of two arbitrary corners.
    pub fn from_corners(p1: Point<S>, p2: Point<S>) -> Self {
        Self::new(
            min(p1.x, p2.x),
            min(p1.y, p2.y),
            (p2.x - p1.x).abs(),
            (p2.y - p1.y).abs(),
        )
    }

    #[inline]
    pub fn x(&self) -> S {
        self.x
    }

    #[inline]
    pub fn y(&self) -> S {
        self.y
    }

    #[inline]
    pub fn width(&self) -> S {
        self.w
    }

    #[inline]
    pub fn height(&self) -> S {
        self.h
    }

    #[inline]
    pub fn right(&self) -> S {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> S {
        self.y + self.h
    }

    /// The point where the rectangle is split into quadrants
    pub fn midpoint(&self) -> Point<S> {
        Point::new(self.x + self.w.half(), self.y + self.h.half())
    }

    /// Bottom, right, top and left edges, counter-clockwise.
    pub fn edges(&self) -> &[LineSegment<S>; 4] {
        &self.edges
    }

    /// Bottom-left, top-left, bottom-right, top-right
    pub fn corners(&self) -> [Point<S>; 4] {
        let (r, t) = (self.right(), self.top());
        [
            Point::new(self.x, self.y),
            Point::new(self.x, t),
            Point::new(r, self.y),
            Point::new(r, t),
        ]
    }

    /// Inclusive on every edge
    pub fn contains(&self, p: &Point<S>) -> bool {
        self.x <= p.x && p.x <= self.right() && self.y <= p.y && p.y <= self.top()
    }

    /// Inclusive on every edge, touching rectangles overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.right() < other.x
            || other.right() < self.x
            || self.top() < other.y
            || other.top() < self.y)
    }

    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        let x = max(self.x, other.x);
        let y = max(self.y, other.y);
        let r = min(self.right(), other.right());
        let t = min(self.top(), other.top());
        Some(Self::new(x, y, r - x, t - y))
    }

    /// Split into 4 quadrants: bottom-left, bottom-right, top-right, top-left.
    ///
    /// The left and bottom halves get `w / 2`, the right and top halves the remainder, so
    /// integer rectangles of odd extent are still tiled without gaps.
    pub fn quarter(&self) -> [Self; 4] {
        let (hw, hh) = (self.w.half(), self.h.half());
        let (rw, rh) = (self.w - hw, self.h - hh);
        let (mx, my) = (self.x + hw, self.y + hh);
        [
            Self::new(self.x, self.y, hw, hh),
            Self::new(mx, self.y, rw, hh),
            Self::new(mx, my, rw, rh),
            Self::new(self.x, my, hw, rh),
        ]
    }

    /// `true` if the segment crosses one of the edges or has an end-point inside.
    ///
    /// Long segments would produce huge bounding boxes, so line traversals descend by this
    /// test instead.
    pub fn crossed_by(&self, line: &LineSegment<S>) -> bool {
        self.edges.iter().any(|edge| has_intersect(line, edge))
            || self.contains(&line.p1)
            || self.contains(&line.p2)
    }
}

impl<S: Scalar> fmt::Display for Rectangle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<rectangle x:{} y:{} width:{} height:{}>",
            self.x, self.y, self.w, self.h
        )
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
#[serde(rename = "Rectangle")]
struct RawRectangle<S> {
    x: S,
    y: S,
    width: S,
    height: S,
}

#[cfg(feature = "serde")]
impl<S: Scalar + Serialize> Serialize for Rectangle<S> {
    fn serialize<Se>(&self, serializer: Se) -> Result<Se::Ok, Se::Error>
    where
        Se: serde::Serializer,
    {
        RawRectangle {
            x: self.x,
            y: self.y,
            width: self.w,
            height: self.h,
        }
        .serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, S: Scalar + Deserialize<'de>> Deserialize<'de> for Rectangle<S> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawRectangle::deserialize(deserializer)?;
        Ok(Self::new(raw.x, raw.y, raw.width, raw.height))
    }
}

impl<'a, S> IntoIterator for &'a Rectangle<S> {
    type Item = &'a LineSegment<S>;
    type IntoIter = std::slice::Iter<'a, LineSegment<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

// Parametric form of the line-line intersection. Returns `t` such that the crossing is at
// `l.p1 + t * (l.p2 - l.p1)`, rejecting crossings outside either segment.
// Only products of two coordinate differences are formed, in f64, so integer scalars
// cannot overflow.
#[inline(always)]
fn solve<S: Scalar>(l: &LineSegment<S>, r: &LineSegment<S>) -> Option<f64> {
    let (x1, y1) = (l.p1.x.as_f64(), l.p1.y.as_f64());
    let (x2, y2) = (l.p2.x.as_f64(), l.p2.y.as_f64());
    let (x3, y3) = (r.p1.x.as_f64(), r.p1.y.as_f64());
    let (x4, y4) = (r.p2.x.as_f64(), r.p2.y.as_f64());

    let mut d = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if S::negligible(d) {
        return None;
    }
    let mut t = (x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4);
    let mut u = (x1 - x3) * (y1 - y2) - (y1 - y3) * (x1 - x2);
    if d < 0.0 {
        d = -d;
        t = -t;
        u = -u;
    }

    // both parameters in [0, 1], written so that NaN is rejected as well
    if !(0.0 <= t && t <= d && 0.0 <= u && u <= d) {
        return None;
    }
    Some(t / d)
}

/// Intersection point of two line segments, if they intersect within both extents.
///
/// Parallel and collinear segments never intersect.
/// Integer coordinates of the point are floored.
pub fn intersect<S: Scalar>(l: &LineSegment<S>, r: &LineSegment<S>) -> Option<Point<S>> {
    let t = solve(l, r)?;
    let lerp = |a: S, b: S| a + S::floor_from_f64(t * (b - a).as_f64());
    Some(Point::new(lerp(l.p1.x, l.p2.x), lerp(l.p1.y, l.p2.y)))
}

/// Boolean form of [`intersect`], used on the traversal hot paths.
#[inline]
pub fn has_intersect<S: Scalar>(l: &LineSegment<S>, r: &LineSegment<S>) -> bool {
    solve(l, r).is_some()
}
