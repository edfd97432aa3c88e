// File: crates/candlescroll-core/src/buffer.rs
// Summary: Per-class geometry buffer: a ring of 9-vertex groups plus a parallel ring of keys.

use std::collections::VecDeque;

use crate::encode::{CandleFragment, CandleGroup, GROUP_CODES, GROUP_LEN};
use crate::error::ChartError;
use crate::geometry::{PathCode, Point, StrokePath};

/// Edge of a buffer that receives new groups during a slide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// Newer times; groups leave from the front.
    Back,
    /// Older times; groups leave from the back.
    Front,
}

/// Groups ascend by key; whole groups only, so vertex count is always a multiple of 9.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryBuffer {
    groups: VecDeque<CandleGroup>,
    keys: VecDeque<f64>,
}

impl GeometryBuffer {
    pub fn new() -> Self { Self::default() }

    /// Build from a fragment, failing if its groups are not strictly ascending.
    pub fn from_fragment(fragment: CandleFragment) -> Result<Self, ChartError> {
        check_fragment(&fragment)?;
        let keys = fragment.groups.iter().map(CandleGroup::key).collect();
        Ok(Self { groups: fragment.groups.into(), keys })
    }

    pub fn len(&self) -> usize { self.groups.len() }
    pub fn is_empty(&self) -> bool { self.groups.is_empty() }
    pub fn vertex_count(&self) -> usize { self.groups.len() * GROUP_LEN }
    pub fn first_key(&self) -> Option<f64> { self.keys.front().copied() }
    pub fn last_key(&self) -> Option<f64> { self.keys.back().copied() }
    pub fn keys(&self) -> impl Iterator<Item = f64> + '_ { self.keys.iter().copied() }

    /// Number of groups whose key lies in the closed range `[lo, hi]`.
    pub fn count_in_range(&self, lo: f64, hi: f64) -> usize {
        if lo > hi {
            return 0;
        }
        let start = self.keys.partition_point(|&k| k < lo);
        let end = self.keys.partition_point(|&k| k <= hi);
        end.saturating_sub(start)
    }

    /// Validate a slide without touching the buffer.
    pub fn check_slide(
        &self,
        edge: Edge,
        drop: usize,
        fragment: Option<&CandleFragment>,
    ) -> Result<(), ChartError> {
        if drop > self.groups.len() {
            return Err(ChartError::TrimOverflow { requested: drop, available: self.groups.len() });
        }
        let Some(fragment) = fragment else { return Ok(()) };
        check_fragment(fragment)?;
        if drop == self.groups.len() {
            return Ok(());
        }
        match edge {
            Edge::Back => {
                let last = self.keys[self.keys.len() - 1];
                match fragment.first_key() {
                    Some(first) if first <= last => {
                        Err(ChartError::SpliceOrder { edge: "back", key: first, neighbour: last })
                    }
                    _ => Ok(()),
                }
            }
            Edge::Front => {
                let first = self.keys[0];
                match fragment.last_key() {
                    Some(last) if last >= first => {
                        Err(ChartError::SpliceOrder { edge: "front", key: last, neighbour: first })
                    }
                    _ => Ok(()),
                }
            }
        }
    }

    /// Drop `drop` groups from the edge opposite `edge`, then splice `fragment` onto `edge`.
    /// Everything is validated before the buffer is touched.
    pub fn slide(
        &mut self,
        edge: Edge,
        drop: usize,
        fragment: Option<CandleFragment>,
    ) -> Result<(), ChartError> {
        self.check_slide(edge, drop, fragment.as_ref())?;
        let remaining = self.groups.len() - drop;
        match edge {
            Edge::Back => {
                self.groups.drain(..drop);
                self.keys.drain(..drop);
                if let Some(fragment) = fragment {
                    self.keys.extend(fragment.groups.iter().map(CandleGroup::key));
                    self.groups.extend(fragment.groups);
                }
            }
            Edge::Front => {
                self.groups.truncate(remaining);
                self.keys.truncate(remaining);
                if let Some(fragment) = fragment {
                    for group in fragment.groups.into_iter().rev() {
                        self.keys.push_front(group.key());
                        self.groups.push_front(group);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn vertices(&self) -> Vec<Point> {
        self.groups.iter().flat_map(|g| g.points).collect()
    }

    pub fn codes(&self) -> Vec<PathCode> {
        std::iter::repeat(GROUP_CODES).take(self.groups.len()).flatten().collect()
    }

    /// Renderer-facing copy; `None` when the buffer is empty.
    pub fn to_path(&self) -> Option<StrokePath> {
        if self.groups.is_empty() {
            return None;
        }
        Some(StrokePath { vertices: self.vertices(), codes: self.codes() })
    }

    /// True when keys ascend strictly and every group's first vertex carries its key.
    pub fn is_ordered(&self) -> bool {
        self.keys.len() == self.groups.len()
            && self.keys.iter().zip(self.keys.iter().skip(1)).all(|(a, b)| a < b)
            && self.groups.iter().zip(self.keys.iter()).all(|(g, k)| g.key() == *k)
    }
}

fn check_fragment(fragment: &CandleFragment) -> Result<(), ChartError> {
    for (index, pair) in fragment.groups.windows(2).enumerate() {
        if pair[0].key() >= pair[1].key() {
            return Err(ChartError::Unordered { index: index + 1, prev: pair[0].key(), next: pair[1].key() });
        }
    }
    Ok(())
}
