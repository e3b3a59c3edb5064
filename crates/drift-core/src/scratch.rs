use crate::geom::Point;
use crate::graph::NodeId;
use std::collections::BTreeMap;

/// Per-node scratch state for one session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionRecord {
    pub position: Point,
    /// Fixed coordinates overriding free movement (`fx`/`fy`).
    pub pinned: Option<Point>,
    /// The node's grabbable flag before the session locked it, if it did.
    pub was_grabbable: Option<bool>,
}

/// Session-owned side-table of [`PositionRecord`]s.
///
/// Records are created lazily on first touch and dropped with the session, so two sessions over
/// overlapping node sets never see each other's pins.
#[derive(Debug, Clone, Default)]
pub struct ScratchTable {
    records: BTreeMap<NodeId, PositionRecord>,
}

impl ScratchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&mut self, id: &NodeId) -> &mut PositionRecord {
        self.records.entry(id.clone()).or_default()
    }

    pub fn get(&self, id: &NodeId) -> Option<&PositionRecord> {
        self.records.get(id)
    }

    pub fn record_position(&mut self, id: &NodeId, position: Point) {
        self.entry(id).position = position;
    }

    pub fn pin(&mut self, id: &NodeId, at: Point) {
        let rec = self.entry(id);
        rec.position = at;
        rec.pinned = Some(at);
    }

    pub fn unpin(&mut self, id: &NodeId) {
        self.entry(id).pinned = None;
    }

    pub fn pinned(&self, id: &NodeId) -> Option<Point> {
        self.records.get(id).and_then(|r| r.pinned)
    }

    pub fn remember_grabbable(&mut self, id: &NodeId, grabbable: bool) {
        let rec = self.entry(id);
        if rec.was_grabbable.is_none() {
            rec.was_grabbable = Some(grabbable);
        }
    }

    /// Hands back every saved grabbable flag exactly once.
    pub fn take_grabbable_restores(&mut self) -> Vec<(NodeId, bool)> {
        self.records
            .iter_mut()
            .filter_map(|(id, rec)| rec.was_grabbable.take().map(|g| (id.clone(), g)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
