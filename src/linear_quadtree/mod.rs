//! Linear Quadtree.
//!
//! The complete tree down to `max_levels` is laid out up front in a flat array, in breadth
//! first (and Morton) order. Nodes never move and are identified by their offset into that
//! array: the children of `offset` are `offset * 4 + 1 ..= offset * 4 + 4`. Objects live in a
//! hash multimap keyed by the [`LocatorCode`] of the smallest node that fully contains them.
//!
//! # Contracts:
//! - The skeleton is immutable after construction, only the object storage changes.
//! - Objects entirely outside of the root bounds are rejected by `insert`.
//!
pub mod locator;

pub use locator::{bin_fraction, LocatorCode};

use crate::config::{ConfigError, LinearConfig};
use crate::geom::{LineSegment, Point, Rectangle, Scalar};
use crate::shape::{Shape, Spatial};
use arrayvec::ArrayVec;
use locator::grid_cell;
use rayon::prelude::*;
use std::collections::HashMap;
use std::ops::{ControlFlow, Range};
use tracing::{debug, trace};

/// A cell of the skeleton
#[derive(Debug, Clone)]
pub struct QuadNode<S> {
    bounds: Rectangle<S>,
    parent: Option<usize>,
}

impl<S: Scalar> QuadNode<S> {
    pub fn bounds(&self) -> &Rectangle<S> {
        &self.bounds
    }

    /// Offset of the parent node, None for the root
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }
}

#[derive(Debug, Clone)]
pub struct LinearQuadtree<T: Spatial> {
    max_levels: u32,

    // ---- skeleton, parallel arrays indexed by node offset
    nodes: Vec<QuadNode<T::Scalar>>,
    codes: Vec<LocatorCode>,

    // number of objects stored in the subtree of each node
    occupancy: Vec<usize>,
    objects: HashMap<LocatorCode, Vec<T>>,
    len: usize,
}

/// Number of nodes in a complete quadtree of `levels` levels: `(4^levels - 1) / 3`
pub fn node_count(levels: u32) -> usize {
    ((1usize << (2 * levels)) - 1) / 3
}

impl<T: Spatial> LinearQuadtree<T> {
    /// Panics on invalid parameters, see [`LinearConfig::validate`].
    pub fn new(bounds: Rectangle<T::Scalar>, max_levels: u32) -> Self {
        Self::with_config(bounds, LinearConfig::new(max_levels))
    }

    pub fn with_config(bounds: Rectangle<T::Scalar>, config: LinearConfig) -> Self {
        Self::try_with_config(bounds, config)
            .unwrap_or_else(|err| panic!("invalid linear quadtree parameters: {}", err))
    }

    pub fn try_new(bounds: Rectangle<T::Scalar>, max_levels: u32) -> Result<Self, ConfigError> {
        Self::try_with_config(bounds, LinearConfig::new(max_levels))
    }

    pub fn try_with_config(
        bounds: Rectangle<T::Scalar>,
        config: LinearConfig,
    ) -> Result<Self, ConfigError> {
        config.validate(&bounds)?;

        let max_levels = config.max_levels;
        let len = node_count(max_levels);

        let mut nodes = Vec::with_capacity(len);
        let mut codes = Vec::with_capacity(len);
        nodes.push(QuadNode {
            bounds,
            parent: None,
        });
        codes.push(LocatorCode::ROOT);

        for level in 1..max_levels {
            for parent in node_count(level - 1)..node_count(level) {
                let code = codes[parent];
                for tag in 0..4 {
                    let child = code.child(tag);
                    nodes.push(QuadNode {
                        bounds: cell_bounds(&bounds, child),
                        parent: Some(parent),
                    });
                    codes.push(child);
                }
            }
        }
        debug_assert_eq!(nodes.len(), len);
        debug!(max_levels, nodes = len, "built linear quadtree skeleton");

        Ok(Self {
            max_levels,
            nodes,
            codes,
            occupancy: vec![0; len],
            objects: HashMap::new(),
            len: 0,
        })
    }

    pub fn max_levels(&self) -> u32 {
        self.max_levels
    }

    pub fn bounds(&self) -> &Rectangle<T::Scalar> {
        &self.nodes[0].bounds
    }

    /// Number of stored objects
    pub fn size(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The skeleton, in breadth first order
    pub fn nodes(&self) -> &[QuadNode<T::Scalar>] {
        &self.nodes
    }

    /// Location codes of the nodes, parallel to [`nodes`](Self::nodes) and sorted ascending
    pub fn codes(&self) -> &[LocatorCode] {
        &self.codes
    }

    pub fn parent(&self, offset: usize) -> Option<usize> {
        self.nodes[offset].parent
    }

    /// Offsets of the children of `offset`, empty for leaves.
    pub fn children(&self, offset: usize) -> Range<usize> {
        let first = offset * 4 + 1;
        if first < self.nodes.len() {
            first..first + 4
        } else {
            0..0
        }
    }

    /// Objects stored directly at the node at `offset`
    pub fn objects_at(&self, offset: usize) -> &[T] {
        self.objects
            .get(&self.codes[offset])
            .map(|items| items.as_slice())
            .unwrap_or(&[])
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        for count in self.occupancy.iter_mut() {
            *count = 0;
        }
        self.len = 0;
    }

    #[inline]
    fn leaf_depth(&self) -> u32 {
        self.max_levels - 1
    }

    fn normalize(&self, p: &Point<T::Scalar>) -> [f64; 2] {
        let root = self.bounds();
        [
            (p.x() - root.x()).as_f64() / root.width().as_f64(),
            (p.y() - root.y()).as_f64() / root.height().as_f64(),
        ]
    }

    /// Leaf level location code of a point, None if the point is out of bounds.
    ///
    /// Both coordinates are normalized to `[0, 1]` against the root bounds, truncated to a
    /// `max_levels - 1` digit binary fraction and interleaved. A point on the midpoint of a
    /// node belongs to its right/top half.
    pub fn locator(&self, p: &Point<T::Scalar>) -> Option<LocatorCode> {
        let [tx, ty] = self.normalize(p);
        let depth = self.leaf_depth();
        let x = grid_cell(tx, depth)?;
        let y = grid_cell(ty, depth)?;
        Some(LocatorCode::from_cell(x, y, depth))
    }

    /// Offset of the leaf containing `p`, None if the point is out of bounds.
    pub fn leaf_offset(&self, p: &Point<T::Scalar>) -> Option<usize> {
        let code = self.locator(p)?;
        self.codes.binary_search(&code).ok()
    }

    /// Leaf cell of a point known to be inside the bounds.
    /// Rounding may push such points a hair outside of `[0, 1]`, hence the clamping.
    fn leaf_cell_clamped(&self, p: &Point<T::Scalar>) -> [u32; 2] {
        let [tx, ty] = self.normalize(p);
        let depth = self.leaf_depth();
        let clamp = |t: f64| grid_cell(t.max(0.0).min(1.0), depth).unwrap_or(0);
        [clamp(tx), clamp(ty)]
    }

    /// Offset of the smallest node fully containing the shape. The shape is clipped to the
    /// bounds first, None if nothing remains.
    fn placement(&self, shape: &Shape<T::Scalar>) -> Option<usize> {
        let clipped = shape.bounding_box().intersection(self.bounds())?;
        let depth = self.leaf_depth();

        let mut offsets = ArrayVec::<[usize; 4]>::new();
        for corner in clipped.corners().iter() {
            let [x, y] = self.leaf_cell_clamped(corner);
            let code = LocatorCode::from_cell(x, y, depth);
            if let Ok(offset) = self.codes.binary_search(&code) {
                if !offsets.contains(&offset) {
                    offsets.push(offset);
                }
            }
        }

        // corners in different nodes: move up until they meet
        while offsets.len() > 1 {
            let mut parents = ArrayVec::<[usize; 4]>::new();
            for &offset in offsets.iter() {
                let parent = self.nodes[offset].parent.unwrap_or(0);
                if !parents.contains(&parent) {
                    parents.push(parent);
                }
            }
            offsets = parents;
        }
        offsets.first().copied()
    }

    fn store(&mut self, offset: usize, item: T) {
        self.objects
            .entry(self.codes[offset])
            .or_insert_with(Vec::new)
            .push(item);

        let mut cursor = Some(offset);
        while let Some(offset) = cursor {
            self.occupancy[offset] += 1;
            cursor = self.nodes[offset].parent;
        }
        self.len += 1;
    }

    /// Store the object in the smallest node that fully contains it.
    ///
    /// Objects partially outside of the bounds are placed by their part inside. Objects
    /// entirely outside are handed back.
    pub fn insert(&mut self, item: T) -> Result<(), T> {
        match self.placement(&item.shape()) {
            Some(offset) => {
                self.store(offset, item);
                Ok(())
            }
            None => {
                trace!("object out of the linear quadtree bounds, dropping it");
                Err(item)
            }
        }
    }

    /// Insert many objects at once, silently dropping the ones out of bounds.
    ///
    /// Placements are computed in parallel.
    pub fn extend<It>(&mut self, it: It)
    where
        It: IntoIterator<Item = T>,
        T: Send + Sync,
    {
        let items: Vec<T> = it.into_iter().collect();
        let placements: Vec<Option<usize>> = {
            let this = &*self;
            items
                .par_iter()
                .map(|item| this.placement(&item.shape()))
                .collect()
        };

        let mut dropped = 0usize;
        for (item, placement) in items.into_iter().zip(placements) {
            match placement {
                Some(offset) => self.store(offset, item),
                None => dropped += 1,
            }
        }
        trace!(dropped, size = self.len, "extended linear quadtree");
    }

    #[inline]
    fn visit<'a, F>(&'a self, offset: usize, f: &mut F)
    where
        F: FnMut(&'a T),
    {
        if let Some(items) = self.objects.get(&self.codes[offset]) {
            items.iter().for_each(f);
        }
    }

    /// Call `f` on every object that may overlap the query.
    ///
    /// Point queries walk from the containing leaf up to the root. Rectangle queries walk
    /// down from the root into every non-empty quadrant a corner of the query falls in.
    pub fn for_each_match<Q, F>(&self, query: &Q, mut f: F)
    where
        Q: Spatial<Scalar = T::Scalar>,
        F: FnMut(&T),
    {
        self.walk(&query.shape(), &mut f);
    }

    /// Collect the candidates of [`for_each_match`](Self::for_each_match) into `out`
    pub fn retrieve<'a, Q>(&'a self, query: &Q, out: &mut Vec<&'a T>)
    where
        Q: Spatial<Scalar = T::Scalar>,
    {
        self.walk(&query.shape(), &mut |item: &'a T| out.push(item));
    }

    fn walk<'a, F>(&'a self, query: &Shape<T::Scalar>, f: &mut F)
    where
        F: FnMut(&'a T),
    {
        match query {
            Shape::Point(p) => {
                let mut cursor = self.leaf_offset(p);
                while let Some(offset) = cursor {
                    self.visit(offset, f);
                    cursor = self.nodes[offset].parent;
                }
            }
            shape => {
                if let Some(corners) = self.query_cells(shape) {
                    self.walk_rect(0, &corners, f);
                }
            }
        }
    }

    /// Leaf cells of the corners of the query clipped to the bounds
    fn query_cells(&self, query: &Shape<T::Scalar>) -> Option<[[u32; 2]; 4]> {
        let clipped = query.bounding_box().intersection(self.bounds())?;
        let mut cells = [[0; 2]; 4];
        for (cell, corner) in cells.iter_mut().zip(clipped.corners().iter()) {
            *cell = self.leaf_cell_clamped(corner);
        }
        Some(cells)
    }

    fn walk_rect<'a, F>(&'a self, offset: usize, corners: &[[u32; 2]; 4], f: &mut F)
    where
        F: FnMut(&'a T),
    {
        let mask = self.quadrants(offset, corners);
        for tag in 0..4 {
            let child = offset * 4 + 1 + tag;
            if mask & (1 << tag) != 0 && self.occupancy[child] > 0 {
                self.walk_rect(child, corners, f);
            }
        }
        self.visit(offset, f);
    }

    /// Bitmask of the child tags the given leaf cells fall in, relative to the midpoint of
    /// the node. Cells on the midpoint belong to the right/top children. Leaves return 0.
    fn quadrants(&self, offset: usize, corners: &[[u32; 2]; 4]) -> u8 {
        let code = self.codes[offset];
        let depth = code.depth();
        if depth >= self.leaf_depth() {
            return 0;
        }
        let shift = self.leaf_depth() - depth - 1;
        let [cx, cy] = code.cell();
        let (mx, my) = (cx * 2 + 1, cy * 2 + 1);

        corners.iter().fold(0, |mask, &[x, y]| {
            let right = ((x >> shift) >= mx) as u32;
            let top = ((y >> shift) >= my) as u32;
            mask | 1u8 << (right | top << 1)
        })
    }

    /// Call `f` on the objects of every node the line passes through.
    pub fn line_intersect<F>(&self, line: &LineSegment<T::Scalar>, mut f: F)
    where
        F: FnMut(&T),
    {
        self.line_intersect_impl(0, line, &mut f);
    }

    fn line_intersect_impl<F>(&self, offset: usize, line: &LineSegment<T::Scalar>, f: &mut F)
    where
        F: FnMut(&T),
    {
        if !self.nodes[offset].bounds.crossed_by(line) {
            return;
        }
        for child in self.children(offset) {
            if self.occupancy[child] > 0 {
                self.line_intersect_impl(child, line, f);
            }
        }
        self.visit(offset, f);
    }

    /// Same traversal as [`line_intersect`](Self::line_intersect), stopping as soon as `f`
    /// breaks. Returns the break value, if any.
    pub fn first_line_intersect<B, F>(
        &self,
        line: &LineSegment<T::Scalar>,
        mut f: F,
    ) -> ControlFlow<B>
    where
        F: FnMut(&T) -> ControlFlow<B>,
    {
        self.first_line_intersect_impl(0, line, &mut f)
    }

    fn first_line_intersect_impl<B, F>(
        &self,
        offset: usize,
        line: &LineSegment<T::Scalar>,
        f: &mut F,
    ) -> ControlFlow<B>
    where
        F: FnMut(&T) -> ControlFlow<B>,
    {
        if !self.nodes[offset].bounds.crossed_by(line) {
            return ControlFlow::Continue(());
        }
        for child in self.children(offset) {
            if self.occupancy[child] == 0 {
                continue;
            }
            if let ControlFlow::Break(b) = self.first_line_intersect_impl(child, line, f) {
                return ControlFlow::Break(b);
            }
        }
        if let Some(items) = self.objects.get(&self.codes[offset]) {
            for item in items.iter() {
                if let ControlFlow::Break(b) = f(item) {
                    return ControlFlow::Break(b);
                }
            }
        }
        ControlFlow::Continue(())
    }
}

/// Bounds of the node with the given code.
///
/// Cells are cut at the exact binary fractions the locator uses, so a point located in a
/// cell is also within the cell's bounds. Integer coordinates are floored.
fn cell_bounds<S: Scalar>(root: &Rectangle<S>, code: LocatorCode) -> Rectangle<S> {
    let depth = code.depth();
    let [cx, cy] = code.cell();

    let x0 = split_at(root.x(), root.width(), cx, depth);
    let x1 = split_at(root.x(), root.width(), cx + 1, depth);
    let y0 = split_at(root.y(), root.height(), cy, depth);
    let y1 = split_at(root.y(), root.height(), cy + 1, depth);
    Rectangle::new(x0, y0, x1 - x0, y1 - y0)
}

fn split_at<S: Scalar>(origin: S, extent: S, i: u32, depth: u32) -> S {
    let n = 1u32 << depth;
    if i == 0 {
        origin
    } else if i == n {
        origin + extent
    } else {
        origin + S::floor_from_f64(extent.as_f64() * f64::from(i) / f64::from(n))
    }
}
