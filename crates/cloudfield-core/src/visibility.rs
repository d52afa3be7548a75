//! Line-of-sight invalidation for opaque clouds.

use crate::cloud::CloudType;
use crate::geometry::Coord;

/// The exterior visibility subsystem. Recomputation is its business; the
/// engine only says where something changed.
pub trait Visibility {
    fn invalidate_around(&mut self, pos: Coord);
}

/// Tell `vis` that a cloud of `kind` appeared at or left `pos`.
pub(crate) fn cloud_changed<V: Visibility + ?Sized>(vis: &mut V, kind: CloudType, pos: Coord) {
    if kind.is_opaque() {
        vis.invalidate_around(pos);
    }
}
