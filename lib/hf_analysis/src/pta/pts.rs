use crate::pta::elements::CsObjId;
use fixedbitset::FixedBitSet;

/// A set of context-qualified abstract objects, as a bitset over interned
/// object ids.
#[derive(Debug, Clone, Default)]
pub struct PointsToSet {
    bits: FixedBitSet,
}

impl PointsToSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn singleton(obj: CsObjId) -> Self {
        let mut pts = Self::new();
        pts.insert(obj);
        pts
    }

    /// Returns `true` if the object was not in the set.
    pub fn insert(&mut self, obj: CsObjId) -> bool {
        let idx = obj.idx();
        if idx >= self.bits.len() {
            self.bits.grow(idx + 1);
        }
        !self.bits.put(idx)
    }

    #[inline]
    pub fn contains(&self, obj: CsObjId) -> bool {
        self.bits.contains(obj.idx())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.ones().next().is_none()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = CsObjId> + '_ {
        self.bits.ones().map(CsObjId::from_idx)
    }

    /// Adds every object of `other` and returns those that were missing.
    pub fn union_delta(&mut self, other: &Self) -> Self {
        let mut delta = Self::new();
        for idx in other.bits.ones() {
            if !self.bits.contains(idx) {
                delta.insert(CsObjId::from_idx(idx));
            }
        }
        if !delta.is_empty() {
            if other.bits.len() > self.bits.len() {
                self.bits.grow(other.bits.len());
            }
            self.bits.union_with(&delta.bits);
        }
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(idx: usize) -> CsObjId {
        CsObjId::from_idx(idx)
    }

    #[test]
    fn insertion() {
        let mut pts = PointsToSet::new();
        assert!(pts.is_empty());
        assert!(pts.insert(obj(3)));
        assert!(!pts.insert(obj(3)));
        assert!(pts.insert(obj(70)));
        assert!(pts.contains(obj(70)));
        assert!(!pts.contains(obj(0)));
        assert!(!pts.contains(obj(500)));
        assert_eq!(pts.len(), 2);
        assert_eq!(pts.iter().collect::<Vec<_>>(), vec![obj(3), obj(70)]);
    }

    #[test]
    fn delta_union() {
        let mut pts = PointsToSet::singleton(obj(1));
        let mut other = PointsToSet::singleton(obj(1));
        other.insert(obj(2));
        other.insert(obj(100));

        let delta = pts.union_delta(&other);
        assert_eq!(delta.iter().collect::<Vec<_>>(), vec![obj(2), obj(100)]);
        assert_eq!(pts.len(), 3);

        let again = pts.union_delta(&other);
        assert!(again.is_empty());
        assert_eq!(pts.len(), 3);
    }
}
