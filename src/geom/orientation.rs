use super::{LineSegment, Point, Scalar};
use std::fmt;

/// Which side of a line something lies on.
///
/// `Front` is the side the line's [normal](LineSegment::normal) points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Front,
    Back,
    Collinear,
    /// Some points lie in front and some behind
    Spanning,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Orientation::Front => "FRONT",
            Orientation::Back => "BACK",
            Orientation::Collinear => "COLLINEAR",
            Orientation::Spanning => "SPANNING",
        };
        f.write_str(s)
    }
}

/// Side of a single point. Incomparable values (NaN) count as collinear.
pub fn point_side<S: Scalar>(line: &LineSegment<S>, p: &Point<S>) -> Orientation {
    let d = (*p - line.p1()).dot(&line.normal().p2());

    if d.is_small() {
        Orientation::Collinear
    } else if d > S::zero() {
        Orientation::Front
    } else if d < S::zero() {
        Orientation::Back
    } else {
        Orientation::Collinear
    }
}

/// Classify a set of edges by testing both end-points of each one.
pub fn polygon_side<'a, S, I>(line: &LineSegment<S>, edges: I) -> Orientation
where
    S: Scalar,
    I: IntoIterator<Item = &'a LineSegment<S>>,
{
    let mut front = false;
    let mut back = false;

    for edge in edges {
        for p in [edge.p1(), edge.p2()].iter() {
            match point_side(line, p) {
                Orientation::Front => front = true,
                Orientation::Back => back = true,
                _ => {}
            }
        }
    }

    match (front, back) {
        (true, true) => Orientation::Spanning,
        (true, false) => Orientation::Front,
        (false, true) => Orientation::Back,
        (false, false) => Orientation::Collinear,
    }
}

pub fn line_side<S: Scalar>(line: &LineSegment<S>, other: &LineSegment<S>) -> Orientation {
    polygon_side(line, std::iter::once(other))
}
