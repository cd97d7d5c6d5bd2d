use std::collections::HashMap;

use strata_world::EditLookup;

/// Point-in-time copy of the edits a meshing job may consult.
///
/// Owned by the job; never aliased with the live `EditStore`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditSnapshot {
    edits: HashMap<(i32, i32, i32), bool>,
}

impl EditSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn insert(&mut self, pos: (i32, i32, i32), present: bool) {
        self.edits.insert(pos, present);
    }

    pub fn iter(&self) -> impl Iterator<Item = ((i32, i32, i32), bool)> + '_ {
        self.edits.iter().map(|(k, v)| (*k, *v))
    }
}

impl Extend<((i32, i32, i32), bool)> for EditSnapshot {
    fn extend<T: IntoIterator<Item = ((i32, i32, i32), bool)>>(&mut self, iter: T) {
        self.edits.extend(iter);
    }
}

impl FromIterator<((i32, i32, i32), bool)> for EditSnapshot {
    fn from_iter<T: IntoIterator<Item = ((i32, i32, i32), bool)>>(iter: T) -> Self {
        Self {
            edits: iter.into_iter().collect(),
        }
    }
}

impl EditLookup for EditSnapshot {
    #[inline]
    fn edit_at(&self, x: i32, y: i32, z: i32) -> Option<bool> {
        self.edits.get(&(x, y, z)).copied()
    }
}
