//! Match intervals and the ordered list that owns them.
//!
//! Intervals live in an arena and are addressed by [`IntervalId`]. The list threads them in
//! `start` order through `prev`/`next` slot indices, so neighbour lookup and removal are O(1)
//! and nothing holds a live reference into the list.
//!
//! Invariants maintained by [`IntervalList`]:
//!
//! - every interval has `start <= end`
//! - for adjacent intervals `a` before `b`, `a.end < b.start` (no overlap, no shared start)
//! - `head`/`tail` are the actual ends of the chain

use crate::error::IntervalError;
use crate::position::Position;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Colour assigned to an interval when the palette is empty.
pub const DEFAULT_COLOR: &str = "#8bc4ea";

/// A palette colour attached to an interval (any string the renderer understands).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorTag(pub String);

impl ColorTag {
    /// Create a colour tag.
    pub fn new(color: impl Into<String>) -> Self {
        Self(color.into())
    }

    /// The colour string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ColorTag {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR)
    }
}

/// Round-robin colour source.
///
/// Hands out the configured colours in order, wrapping around when exhausted. An empty palette
/// always yields the fallback colour.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<ColorTag>,
    fallback: ColorTag,
    next: usize,
}

impl Palette {
    /// Create a palette with [`DEFAULT_COLOR`] as fallback.
    pub fn new<I, S>(colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_fallback(colors, DEFAULT_COLOR)
    }

    /// Create a palette with an explicit fallback colour.
    pub fn with_fallback<I, S>(colors: I, fallback: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            colors: colors.into_iter().map(ColorTag::new).collect(),
            fallback: ColorTag::new(fallback),
            next: 0,
        }
    }

    /// Restart from the first colour.
    pub fn reset(&mut self) {
        self.next = 0;
    }

    /// Next colour in rotation.
    pub fn next_color(&mut self) -> ColorTag {
        if self.colors.is_empty() {
            return self.fallback.clone();
        }
        if self.next >= self.colors.len() {
            self.next = 0;
        }
        let color = self.colors[self.next].clone();
        self.next += 1;
        color
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

/// Which end of an interval a boundary refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    /// The first covered character.
    Start,
    /// The last covered character.
    End,
}

/// A matched span `[start, end]` (both endpoints inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// First covered character.
    pub start: Position,
    /// Last covered character.
    pub end: Position,
    /// Highlight colour.
    pub color: ColorTag,
}

impl Interval {
    /// Create an interval. Ordering of `start`/`end` is checked when inserted into a list.
    pub fn new(start: Position, end: Position, color: ColorTag) -> Self {
        Self { start, end, color }
    }

    /// The endpoint position named by `endpoint`.
    pub fn endpoint(&self, endpoint: Endpoint) -> Position {
        match endpoint {
            Endpoint::Start => self.start,
            Endpoint::End => self.end,
        }
    }

    /// Half-open flat character range covered by this interval.
    pub fn char_range(&self) -> Range<usize> {
        self.start.index..self.end.index + 1
    }

    /// Check if two intervals share at least one position.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.start, self.end)
    }
}

/// Stable handle to an interval in an [`IntervalList`].
///
/// Ids carry a generation, so an id whose interval was removed stays invalid even after its slot
/// is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntervalId {
    slot: u32,
    generation: u32,
}

/// Previous and next intervals of a list member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors {
    /// Interval immediately before, if any.
    pub prev: Option<IntervalId>,
    /// Interval immediately after, if any.
    pub next: Option<IntervalId>,
}

#[derive(Debug, Clone)]
struct Node {
    interval: Interval,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Ordered list of non-overlapping intervals.
#[derive(Debug, Clone, Default)]
pub struct IntervalList {
    slots: Vec<Slot>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl IntervalList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of intervals.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no intervals.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove every interval. All previously issued ids become stale.
    pub fn clear(&mut self) {
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(idx);
            }
        }
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Look up an interval.
    pub fn get(&self, id: IntervalId) -> Option<&Interval> {
        self.node(id).map(|n| &n.interval)
    }

    /// Returns `true` if `id` refers to a live interval.
    pub fn contains(&self, id: IntervalId) -> bool {
        self.node(id).is_some()
    }

    /// Id of the first interval.
    pub fn first(&self) -> Option<IntervalId> {
        self.head.map(|idx| self.id_at(idx))
    }

    /// Id of the last interval.
    pub fn last(&self) -> Option<IntervalId> {
        self.tail.map(|idx| self.id_at(idx))
    }

    /// Ids of the intervals immediately before and after `id`.
    pub fn neighbors(&self, id: IntervalId) -> Option<Neighbors> {
        let node = self.node(id)?;
        Some(Neighbors {
            prev: node.prev.map(|idx| self.id_at(idx)),
            next: node.next.map(|idx| self.id_at(idx)),
        })
    }

    /// Insert an interval at its ordered place.
    ///
    /// Fails with [`IntervalError::Overlap`] if it shares any position with an existing interval
    /// (including an identical `start`), and with [`IntervalError::Inverted`] if `start > end`.
    pub fn insert(&mut self, interval: Interval) -> Result<IntervalId, IntervalError> {
        if interval.start > interval.end {
            return Err(IntervalError::Inverted {
                start: interval.start,
                end: interval.end,
            });
        }

        let overlap = || IntervalError::Overlap {
            start: interval.start,
            end: interval.end,
        };

        let (prev, next) = match (self.head, self.tail) {
            (None, _) | (_, None) => (None, None),
            (Some(head), Some(tail)) => {
                if interval.end < self.interval_at(head).start {
                    (None, Some(head))
                } else if self.interval_at(tail).end < interval.start {
                    (Some(tail), None)
                } else {
                    // `interval` is not strictly before the head, so it can only fit in a gap
                    // that follows some existing interval.
                    let mut cursor = Some(head);
                    let mut gap = None;
                    while let Some(idx) = cursor {
                        let node = self.node_at(idx);
                        if node.interval.end < interval.start {
                            let fits_before_next = node
                                .next
                                .is_none_or(|n| interval.end < self.interval_at(n).start);
                            if fits_before_next {
                                gap = Some((Some(idx), node.next));
                                break;
                            }
                        } else {
                            break;
                        }
                        cursor = node.next;
                    }
                    gap.ok_or_else(overlap)?
                }
            }
        };

        let idx = self.alloc(Node {
            interval,
            prev,
            next,
        });
        match prev {
            Some(p) => self.node_at_mut(p).next = Some(idx),
            None => self.head = Some(idx),
        }
        match next {
            Some(n) => self.node_at_mut(n).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.len += 1;
        Ok(self.id_at(idx))
    }

    /// Detach and return an interval.
    pub fn remove(&mut self, id: IntervalId) -> Result<Interval, IntervalError> {
        if self.node(id).is_none() {
            return Err(IntervalError::Stale(id));
        }
        let idx = id.slot as usize;
        let slot = &mut self.slots[idx];
        let Some(node) = slot.node.take() else {
            return Err(IntervalError::Stale(id));
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(idx);

        match node.prev {
            Some(p) => self.node_at_mut(p).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.node_at_mut(n).prev = node.prev,
            None => self.tail = node.prev,
        }
        self.len -= 1;
        Ok(node.interval)
    }

    /// Move one endpoint of an interval.
    ///
    /// The new position must keep `start <= end` and must stay strictly between the neighbouring
    /// intervals. On failure the interval is left unchanged.
    pub fn set_endpoint(
        &mut self,
        id: IntervalId,
        endpoint: Endpoint,
        position: Position,
    ) -> Result<(), IntervalError> {
        let node = self.node(id).ok_or(IntervalError::Stale(id))?;
        let mut updated = node.interval.clone();
        match endpoint {
            Endpoint::Start => updated.start = position,
            Endpoint::End => updated.end = position,
        }

        if updated.start > updated.end {
            return Err(IntervalError::Inverted {
                start: updated.start,
                end: updated.end,
            });
        }
        let clear_of_prev = node
            .prev
            .is_none_or(|p| self.interval_at(p).end < updated.start);
        let clear_of_next = node
            .next
            .is_none_or(|n| updated.end < self.interval_at(n).start);
        if !clear_of_prev || !clear_of_next {
            return Err(IntervalError::Overlap {
                start: updated.start,
                end: updated.end,
            });
        }

        self.node_at_mut(id.slot as usize).interval = updated;
        Ok(())
    }

    /// Reassign colours from `palette` in list order, restarting the palette first.
    pub fn recolor(&mut self, palette: &mut Palette) {
        palette.reset();
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = self.node_at_mut(idx);
            node.interval.color = palette.next_color();
            cursor = node.next;
        }
    }

    /// Left-to-right traversal.
    ///
    /// The iterator borrows the list, so it cannot be mutated while a traversal is live. Call
    /// `iter()` again to restart.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Ids in list order.
    pub fn ids(&self) -> Vec<IntervalId> {
        self.iter().map(|(id, _)| id).collect()
    }

    fn alloc(&mut self, node: Node) -> usize {
        if let Some(idx) = self.free.pop() {
            self.slots[idx].node = Some(node);
            idx
        } else {
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            self.slots.len() - 1
        }
    }

    fn node(&self, id: IntervalId) -> Option<&Node> {
        let slot = self.slots.get(id.slot as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn id_at(&self, idx: usize) -> IntervalId {
        IntervalId {
            slot: idx as u32,
            generation: self.slots[idx].generation,
        }
    }

    // Slot indices reachable from `head`/`tail`/`prev`/`next` always hold a node.
    fn node_at(&self, idx: usize) -> &Node {
        match &self.slots[idx].node {
            Some(node) => node,
            None => unreachable!("linked slot {idx} is empty"),
        }
    }

    fn node_at_mut(&mut self, idx: usize) -> &mut Node {
        match &mut self.slots[idx].node {
            Some(node) => node,
            None => unreachable!("linked slot {idx} is empty"),
        }
    }

    fn interval_at(&self, idx: usize) -> &Interval {
        &self.node_at(idx).interval
    }
}

impl fmt::Display for IntervalList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(empty)");
        }
        for (i, (_, interval)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", interval)?;
        }
        Ok(())
    }
}

/// Iterator returned by [`IntervalList::iter`].
pub struct Iter<'a> {
    list: &'a IntervalList,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (IntervalId, &'a Interval);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = self.list.node_at(idx);
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((self.list.id_at(idx), &node.interval))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> IntoIterator for &'a IntervalList {
    type Item = (IntervalId, &'a Interval);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
