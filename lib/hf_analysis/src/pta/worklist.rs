use crate::pta::elements::PointerId;
use crate::pta::pts::PointsToSet;
use std::collections::VecDeque;

/// Pending points-to facts: objects that must flow into pointers.
#[derive(Debug, Default)]
pub(crate) struct Worklist {
    entries: VecDeque<(PointerId, PointsToSet)>,
}

impl Worklist {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, pointer: PointerId, pts: PointsToSet) {
        self.entries.push_back((pointer, pts));
    }

    pub(crate) fn pop(&mut self) -> Option<(PointerId, PointsToSet)> {
        self.entries.pop_front()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
