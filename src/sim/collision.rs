//! Collision detection for axis-aligned boxes
//!
//! Plain discrete overlap tests, evaluated once per tick. Fast bullets can
//! tunnel through thin targets at low frame rates; there is no swept test.

use glam::Vec2;

use super::entity::{Positioned, Rect};

/// Strict AABB overlap (touching edges do not collide)
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.pos.x < b.right() && a.right() > b.pos.x && a.pos.y < b.bottom() && a.bottom() > b.pos.y
}

/// Overlap test between two entities
#[inline]
pub fn collides<A: Positioned + ?Sized, B: Positioned + ?Sized>(a: &A, b: &B) -> bool {
    overlaps(&a.bounds(), &b.bounds())
}

/// Distance between box centres
#[inline]
pub fn center_distance<A: Positioned + ?Sized, B: Positioned + ?Sized>(a: &A, b: &B) -> f32 {
    a.center().distance(b.center())
}

/// Indices of entities whose centre lies within `radius` of `point` (inclusive)
pub fn within_radius<T: Positioned>(items: &[T], point: Vec2, radius: f32) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.center().distance(point) <= radius)
        .map(|(i, _)| i)
        .collect()
}
