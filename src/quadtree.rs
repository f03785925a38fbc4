//! Adaptive quadtree.
//!
//! Nodes split into 4 quadrants once they hold more than `max_objects` objects, up to
//! `max_levels` deep. Objects that do not fit into a single quadrant stay on the node that was
//! splitting. Nodes are never merged.
//!
use crate::config::{ConfigError, QuadtreeConfig};
use crate::geom::{LineSegment, Point, Rectangle, Scalar};
use crate::shape::{Shape, Spatial};
use std::fmt;
use std::ops::ControlFlow;
use tracing::debug;

type Children<T> = Option<Box<[Quadtree<T>; 4]>>;

/// Id suffixes of the quadrants, in quadrant order
const SUFFIXES: [&str; 4] = ["00", "01", "10", "11"];

#[derive(Debug, Clone)]
pub struct Quadtree<T: Spatial> {
    // path of the node, for diagnostics only
    id: String,
    bounds: Rectangle<T::Scalar>,
    level: u32,
    config: QuadtreeConfig,

    children: Children<T>,

    items: Vec<T>,
}

impl<T: Spatial> Quadtree<T> {
    /// Panics on invalid parameters, see [`QuadtreeConfig::validate`].
    pub fn new(bounds: Rectangle<T::Scalar>, max_levels: u32, max_objects: usize) -> Self {
        Self::with_config(bounds, QuadtreeConfig::new(max_levels, max_objects))
    }

    pub fn with_config(bounds: Rectangle<T::Scalar>, config: QuadtreeConfig) -> Self {
        Self::try_with_config(bounds, config)
            .unwrap_or_else(|err| panic!("invalid quadtree parameters: {}", err))
    }

    pub fn try_new(
        bounds: Rectangle<T::Scalar>,
        max_levels: u32,
        max_objects: usize,
    ) -> Result<Self, ConfigError> {
        Self::try_with_config(bounds, QuadtreeConfig::new(max_levels, max_objects))
    }

    pub fn try_with_config(
        bounds: Rectangle<T::Scalar>,
        config: QuadtreeConfig,
    ) -> Result<Self, ConfigError> {
        config.validate(&bounds)?;
        Ok(Self::node("00".to_owned(), bounds, 0, config))
    }

    /// Build a tree over the minimum bounding box of the objects.
    ///
    /// Fails if that box has no area, e.g. for an empty iterator or a single point.
    pub fn from_iterator<It>(it: It, config: QuadtreeConfig) -> Result<Self, ConfigError>
    where
        It: IntoIterator<Item = T>,
    {
        let items: Vec<T> = it.into_iter().collect();
        let zero = <T::Scalar as num_traits::Zero>::zero();
        let bounds = items
            .iter()
            .map(|item| item.shape())
            .reduce(|a, b| a.union(&b))
            .map(|shape| shape.bounding_box())
            .unwrap_or_else(|| Rectangle::new(zero, zero, zero, zero));

        let mut tree = Self::try_with_config(bounds, config)?;
        tree.extend(items);
        Ok(tree)
    }

    fn node(id: String, bounds: Rectangle<T::Scalar>, level: u32, config: QuadtreeConfig) -> Self {
        Self {
            id,
            bounds,
            level,
            config,
            children: None,
            items: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bounds(&self) -> &Rectangle<T::Scalar> {
        &self.bounds
    }

    /// Depth of this node, the root is at level 0
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn config(&self) -> &QuadtreeConfig {
        &self.config
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// The 4 quadrants: bottom-left, bottom-right, top-right, top-left
    pub fn children(&self) -> Option<&[Quadtree<T>; 4]> {
        self.children.as_deref()
    }

    /// Objects held by this node itself
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of objects held by this node and all of its descendants
    pub fn size(&self) -> usize {
        let mut size = self.items.len();
        if let Some(children) = self.children.as_ref() {
            size += children.iter().map(Self::size).sum::<usize>();
        }
        size
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Remove every object, keeping the node structure.
    pub fn clear(&mut self) {
        self.items.clear();
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                child.clear();
            }
        }
    }

    pub fn extend<It>(&mut self, it: It)
    where
        It: IntoIterator<Item = T>,
    {
        for item in it {
            self.insert(item);
        }
    }

    /// Objects are pushed down into the quadrant they fit entirely, and stay on the first
    /// node where they straddle a quadrant boundary. Objects outside of the bounds end up on
    /// the root or on the closest node they still straddle.
    pub fn insert(&mut self, item: T) {
        if let Some(children) = self.children.as_mut() {
            if let Some(q) = quadrant_of(&self.bounds, &item.shape()) {
                children[q].insert(item);
                return;
            }
        }

        self.items.push(item);

        // a split node only holds straddlers, they never move down later
        if self.children.is_none()
            && self.items.len() > self.config.max_objects
            && self.level < self.config.max_levels
        {
            self.split();
            self.redistribute();
        }
    }

    fn split(&mut self) {
        debug_assert!(self.children.is_none());
        debug!(
            id = %self.id,
            level = self.level,
            items = self.items.len(),
            "splitting quadtree node"
        );

        let quarters = self.bounds.quarter();
        self.children = Some(Box::new([
            self.child(0, quarters[0]),
            self.child(1, quarters[1]),
            self.child(2, quarters[2]),
            self.child(3, quarters[3]),
        ]));
    }

    fn child(&self, quadrant: usize, bounds: Rectangle<T::Scalar>) -> Self {
        let id = format!("{}.{}", self.id, SUFFIXES[quadrant]);
        Self::node(id, bounds, self.level + 1, self.config)
    }

    /// Move every held object that fits a single quadrant down into it
    fn redistribute(&mut self) {
        let Self {
            bounds,
            children,
            items,
            ..
        } = self;
        let children = match children.as_mut() {
            Some(children) => children,
            None => return,
        };

        let mut kept = Vec::with_capacity(items.len());
        for item in items.drain(..) {
            match quadrant_of(bounds, &item.shape()) {
                Some(q) => children[q].insert(item),
                None => kept.push(item),
            }
        }
        *items = kept;
    }

    /// The single quadrant the object fits entirely, if any.
    ///
    /// Points always fit one. Quadrants are numbered counter-clockwise from the bottom-left.
    pub fn index<Q>(&self, object: &Q) -> Option<usize>
    where
        Q: Spatial<Scalar = T::Scalar>,
    {
        quadrant_of(&self.bounds, &object.shape())
    }

    /// Bitmask of every quadrant the object overlaps, bit `i` for quadrant `i`
    pub fn intersects<Q>(&self, object: &Q) -> u8
    where
        Q: Spatial<Scalar = T::Scalar>,
    {
        quadrant_mask(&self.bounds, &object.shape())
    }

    /// Call `f` on every object stored in a node the query overlaps.
    ///
    /// Descends into every overlapped quadrant, then visits the objects of the node itself.
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
        if let Some(children) = self.children.as_ref() {
            let mask = quadrant_mask(&self.bounds, query);
            for (i, child) in children.iter().enumerate() {
                if mask & (1u8 << i) != 0 {
                    child.walk(query, f);
                }
            }
        }
        self.items.iter().for_each(f);
    }

    /// [`for_each_match`](Self::for_each_match) with an explicit stack instead of recursion.
    pub fn for_each_match_iterative<Q, F>(&self, query: &Q, mut f: F)
    where
        Q: Spatial<Scalar = T::Scalar>,
        F: FnMut(&T),
    {
        let query = query.shape();
        let mut unvisited = vec![self];

        while let Some(current) = unvisited.pop() {
            if let Some(children) = current.children.as_ref() {
                let mask = quadrant_mask(&current.bounds, &query);
                for (i, child) in children.iter().enumerate() {
                    if mask & (1u8 << i) != 0 {
                        unvisited.push(child);
                    }
                }
            }
            for item in current.items.iter() {
                f(item);
            }
        }
    }

    /// Call `f` on the objects of every node the line passes through.
    ///
    /// A node is entered if the line crosses one of its edges or has an end-point inside it.
    /// Prefer this over a bounding box query for long lines, their boxes overlap far more
    /// nodes than the lines themselves.
    pub fn line_intersect<F>(&self, line: &LineSegment<T::Scalar>, mut f: F)
    where
        F: FnMut(&T),
    {
        self.line_intersect_impl(line, &mut f);
    }

    fn line_intersect_impl<F>(&self, line: &LineSegment<T::Scalar>, f: &mut F)
    where
        F: FnMut(&T),
    {
        if !self.bounds.crossed_by(line) {
            return;
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.line_intersect_impl(line, f);
            }
        }
        for item in self.items.iter() {
            f(item);
        }
    }

    /// [`line_intersect`](Self::line_intersect) with an explicit stack instead of recursion.
    ///
    /// All crossed nodes are collected first, their objects are visited afterwards.
    pub fn line_intersect_iterative<F>(&self, line: &LineSegment<T::Scalar>, mut f: F)
    where
        F: FnMut(&T),
    {
        let mut unvisited = vec![self];
        let mut intersected = Vec::new();

        while let Some(current) = unvisited.pop() {
            if !current.bounds.crossed_by(line) {
                continue;
            }
            intersected.push(current);
            if let Some(children) = current.children.as_ref() {
                unvisited.extend(children.iter());
            }
        }

        for node in intersected {
            for item in node.items.iter() {
                f(item);
            }
        }
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
        self.first_line_intersect_impl(line, &mut f)
    }

    fn first_line_intersect_impl<B, F>(
        &self,
        line: &LineSegment<T::Scalar>,
        f: &mut F,
    ) -> ControlFlow<B>
    where
        F: FnMut(&T) -> ControlFlow<B>,
    {
        if !self.bounds.crossed_by(line) {
            return ControlFlow::Continue(());
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                if let ControlFlow::Break(b) = child.first_line_intersect_impl(line, f) {
                    return ControlFlow::Break(b);
                }
            }
        }
        for item in self.items.iter() {
            if let ControlFlow::Break(b) = f(item) {
                return ControlFlow::Break(b);
            }
        }
        ControlFlow::Continue(())
    }
}

impl<T: Spatial> fmt::Display for Quadtree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<quadtree id:{}>", self.id)
    }
}

/// Quadrant of a point relative to the midpoint. Points on a midpoint line belong to the
/// right/top side.
fn point_quadrant<S: Scalar>(mid: &Point<S>, p: &Point<S>) -> usize {
    match (p.x() < mid.x(), p.y() < mid.y()) {
        (true, true) => 0,
        (false, true) => 1,
        (false, false) => 2,
        (true, false) => 3,
    }
}

fn quadrant_of<S: Scalar>(bounds: &Rectangle<S>, shape: &Shape<S>) -> Option<usize> {
    let mid = bounds.midpoint();
    match *shape {
        Shape::Point(p) => Some(point_quadrant(&mid, &p)),
        Shape::Rect {
            origin,
            width,
            height,
        } => {
            let (x, y) = (origin.x(), origin.y());
            let left = x < mid.x() && x + width < mid.x();
            let right = x >= mid.x();
            let bottom = y < mid.y() && y + height < mid.y();
            let top = y >= mid.y();

            match (left, right, bottom, top) {
                (true, _, true, _) => Some(0),
                (_, true, true, _) => Some(1),
                (_, true, _, true) => Some(2),
                (true, _, _, true) => Some(3),
                _ => None,
            }
        }
    }
}

fn quadrant_mask<S: Scalar>(bounds: &Rectangle<S>, shape: &Shape<S>) -> u8 {
    let mid = bounds.midpoint();
    match *shape {
        Shape::Point(p) => 1 << point_quadrant(&mid, &p),
        Shape::Rect { .. } => shape
            .corners()
            .iter()
            .fold(0, |mask, corner| mask | 1 << point_quadrant(&mid, corner)),
    }
}
