//! Decoration placement: border rocks along the floor edge and flora on tile
//! surfaces.
//!
//! Both passes are greedy: take a point, place an entry there, then discard
//! the remaining points inside the placed entry's radius. All randomness is
//! drawn from the run's [`RandomBatch`].

use atoll_config::{FloraEntry, FloraSet};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::random_batch::RandomBatch;

/// Candidate points generated for one fully covered tile, before density.
pub const POINTS_PER_TILE: f32 = 16.0;

/// An axis-aligned box on a tile's walkable surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceVolume {
    pub name: String,
    pub center: Vec3,
    /// Half size along each axis.
    pub extents: Vec3,
}

impl SurfaceVolume {
    pub fn new(name: impl Into<String>, center: Vec3, extents: Vec3) -> Self {
        Self {
            name: name.into(),
            center,
            extents,
        }
    }

    /// Full size along each axis.
    pub fn size(&self) -> Vec3 {
        self.extents * 2.0
    }

    /// Footprint on the ground plane.
    pub fn area(&self) -> f32 {
        let size = self.size();
        size.x * size.z
    }

    pub fn contains(&self, point: Vec3) -> bool {
        let d = (point - self.center).abs();
        d.cmple(self.extents).all()
    }
}

/// One placed decoration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub prefab: String,
    pub radius: f32,
    pub position: Vec3,
    /// Euler angles in degrees.
    pub rotation: Vec3,
    pub scale: f32,
}

fn pick_from<'a>(list: &'a [FloraEntry], roll: f32) -> &'a FloraEntry {
    let index = ((roll * list.len() as f32) as usize).min(list.len() - 1);
    &list[index]
}

/// Weighted pick of a flora entry. Draws twice: the category value, then the
/// index roll within the category.
///
/// The category boundaries are `v < rock` and `v < rock + tree`, with `v`
/// scaled by the total weight. An empty category yields `None`.
pub fn pick_flora<'a>(set: &'a FloraSet, batch: &mut RandomBatch) -> Option<&'a FloraEntry> {
    let rock = set.rock_weight as f32;
    let tree = set.tree_weight as f32;
    let v = batch.next_f() * set.total_weight() as f32;
    let roll = batch.next_f();

    let (category, list) = if v < rock {
        ("rocks", &set.rocks)
    } else if v < rock + tree {
        ("trees", &set.trees)
    } else {
        ("grass", &set.grass)
    };

    if list.is_empty() {
        tracing::warn!(category, "flora category is empty, nothing placed");
        return None;
    }
    Some(pick_from(list, roll))
}

/// Uniform pick of a rock. Draws once.
pub fn pick_rock<'a>(set: &'a FloraSet, batch: &mut RandomBatch) -> Option<&'a FloraEntry> {
    let roll = batch.next_f();
    if set.rocks.is_empty() {
        return None;
    }
    Some(pick_from(&set.rocks, roll))
}

/// Append the candidate points of one tile's surface volumes to `out`.
///
/// Each volume contributes its centre plus a share of the tile's points
/// proportional to its footprint. Draws three times per generated point.
/// Returns `false` when the tile has no volumes and was skipped.
pub fn gather_tile_candidates(
    label: &str,
    volumes: &[SurfaceVolume],
    density: f32,
    batch: &mut RandomBatch,
    out: &mut Vec<Vec3>,
) -> bool {
    if volumes.is_empty() {
        tracing::warn!(tile = label, "tile has no surface volumes, skipping flora");
        return false;
    }

    let total_area: f32 = volumes.iter().map(SurfaceVolume::area).sum();
    for volume in volumes {
        let share = if total_area > 0.0 {
            volume.area() / total_area
        } else {
            0.0
        };
        let count = (share * POINTS_PER_TILE * density).round().max(0.0) as usize;
        let size = volume.size();
        let min = volume.center - volume.extents;

        out.push(volume.center);
        for _ in 0..count {
            let x = batch.next_f() * size.x;
            let y = batch.next_f() * size.y;
            let z = batch.next_f() * size.z;
            out.push(min + Vec3::new(x, y, z));
        }
    }
    true
}

/// Greedily place flora on the gathered candidates.
///
/// Per iteration: pick a candidate index, pick an entry, draw a yaw. The
/// chosen candidate and every candidate within the entry's radius of it
/// (inclusive) are removed.
pub fn place_surface_flora(
    mut candidates: Vec<Vec3>,
    set: &FloraSet,
    batch: &mut RandomBatch,
) -> Vec<Placement> {
    let mut placements = Vec::new();

    while !candidates.is_empty() {
        let index = batch.next_index(candidates.len());
        let chosen = candidates.remove(index);

        let Some(entry) = pick_flora(set, batch) else {
            continue;
        };
        let yaw = batch.next_f() * 360.0;

        placements.push(Placement {
            prefab: entry.prefab.clone(),
            radius: entry.radius,
            position: chosen,
            rotation: Vec3::new(0.0, yaw, 0.0),
            scale: 1.0,
        });
        candidates.retain(|p| p.distance(chosen) > entry.radius);
    }
    placements
}

/// Line the floor border with rocks.
///
/// Repeatedly takes the first remaining border point, places a rock at
/// `point + offset` with random Euler angles and a scale in `[0.5, 1.5)`,
/// then drops every remaining point closer than the rock's radius.
pub fn place_border_rocks(
    border: &[Vec3],
    offset: Vec3,
    set: &FloraSet,
    batch: &mut RandomBatch,
) -> Vec<Placement> {
    if set.rocks.is_empty() {
        if !border.is_empty() {
            tracing::warn!(points = border.len(), "no rocks configured, border left bare");
        }
        return Vec::new();
    }

    let mut remaining = border.to_vec();
    let mut placements = Vec::new();

    while !remaining.is_empty() {
        let point = remaining.remove(0);
        let Some(rock) = pick_rock(set, batch) else {
            break;
        };
        let rotation = Vec3::new(
            batch.next_f() * 360.0,
            batch.next_f() * 360.0,
            batch.next_f() * 360.0,
        );
        let scale = batch.next_f() + 0.5;

        placements.push(Placement {
            prefab: rock.prefab.clone(),
            radius: rock.radius,
            position: point + offset,
            rotation,
            scale,
        });
        remaining.retain(|p| p.distance(point) >= rock.radius);
    }

    tracing::info!(
        rocks = placements.len(),
        spots = border.len(),
        "placed border rocks"
    );
    placements
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A batch whose every draw is 0.
    fn zero_batch() -> RandomBatch {
        RandomBatch::new(1, 8, 0, 1)
    }

    fn ring(count: usize, radius: f32) -> Vec<Vec3> {
        (0..count)
            .map(|i| {
                let a = i as f32 / count as f32 * std::f32::consts::TAU;
                Vec3::new(a.cos() * radius, 0.0, a.sin() * radius)
            })
            .collect()
    }

    fn tile_volume() -> SurfaceVolume {
        SurfaceVolume::new("top", Vec3::new(0.0, 2.0, 0.0), Vec3::new(2.0, 0.0, 2.0))
    }

    #[test]
    fn test_zero_draws_pick_first_rock() {
        let set = FloraSet::default();
        let entry = pick_flora(&set, &mut zero_batch()).unwrap();
        assert_eq!(entry, &set.rocks[0]);
    }

    #[test]
    fn test_category_weights() {
        let set = FloraSet {
            rock_weight: 0,
            tree_weight: 0,
            grass_weight: 1,
            ..FloraSet::default()
        };
        let mut batch = RandomBatch::for_run(3);
        for _ in 0..50 {
            let entry = pick_flora(&set, &mut batch).unwrap();
            assert!(set.grass.contains(entry));
        }
    }

    #[test]
    fn test_empty_category_yields_none() {
        let set = FloraSet {
            rocks: Vec::new(),
            ..FloraSet::default()
        };
        assert!(pick_flora(&set, &mut zero_batch()).is_none());
        assert!(pick_rock(&set, &mut zero_batch()).is_none());
    }

    #[test]
    fn test_gather_counts_follow_area_share() {
        let mut out = Vec::new();
        let mut batch = RandomBatch::for_run(9);
        assert!(gather_tile_candidates("t", &[tile_volume()], 1.0, &mut batch, &mut out));
        assert_eq!(out.len(), 17, "centre plus 16 points");
        assert_eq!(out[0], tile_volume().center);
        assert!(out.iter().all(|p| tile_volume().contains(*p)));

        let left = SurfaceVolume::new("l", Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 2.0));
        let right = SurfaceVolume::new("r", Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 2.0));
        let mut out = Vec::new();
        gather_tile_candidates("t", &[left, right], 0.5, &mut batch, &mut out);
        assert_eq!(out.len(), 2 * (1 + 4));
    }

    #[test]
    fn test_tile_without_volumes_is_skipped() {
        let mut out = Vec::new();
        let mut batch = RandomBatch::for_run(9);
        assert!(!gather_tile_candidates("bare", &[], 1.0, &mut batch, &mut out));
        assert!(out.is_empty());
    }

    #[test]
    fn test_surface_flora_respects_placed_radius() {
        let set = FloraSet::default();
        let mut batch = RandomBatch::for_run(21);
        let mut candidates = Vec::new();
        gather_tile_candidates("t", &[tile_volume()], 1.0, &mut batch, &mut candidates);
        let placements = place_surface_flora(candidates, &set, &mut batch);
        assert!(!placements.is_empty());

        for (i, earlier) in placements.iter().enumerate() {
            for later in &placements[i + 1..] {
                assert!(
                    later.position.distance(earlier.position) > earlier.radius,
                    "{} placed inside {}",
                    later.prefab,
                    earlier.prefab
                );
            }
        }
        assert!(placements.iter().all(|p| (0.0..360.0).contains(&p.rotation.y)));
    }

    #[test]
    fn test_surface_flora_terminates_without_entries() {
        let set = FloraSet {
            rocks: Vec::new(),
            trees: Vec::new(),
            grass: Vec::new(),
            ..FloraSet::default()
        };
        let placements = place_surface_flora(ring(10, 1.0), &set, &mut RandomBatch::for_run(1));
        assert!(placements.is_empty());
    }

    #[test]
    fn test_border_rocks_cover_every_point() {
        let set = FloraSet::default();
        let border = ring(64, 10.0);
        let placements =
            place_border_rocks(&border, Vec3::ZERO, &set, &mut RandomBatch::for_run(8));
        assert!(placements.len() < border.len());
        for point in &border {
            assert!(
                placements
                    .iter()
                    .any(|p| p.position == *point || p.position.distance(*point) < p.radius),
                "{point} not covered"
            );
        }
        for p in &placements {
            assert!((0.5..1.5).contains(&p.scale));
        }
    }

    #[test]
    fn test_border_rocks_are_offset() {
        let set = FloraSet::default();
        let border = vec![Vec3::new(1.0, 0.0, 1.0)];
        let offset = Vec3::new(0.0, -4.0, 0.0);
        let placements = place_border_rocks(&border, offset, &set, &mut zero_batch());
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].position, Vec3::new(1.0, -4.0, 1.0));
        assert_eq!(placements[0].scale, 0.5);
    }

    #[test]
    fn test_border_without_rocks_is_bare() {
        let set = FloraSet {
            rocks: Vec::new(),
            ..FloraSet::default()
        };
        assert!(
            place_border_rocks(&ring(4, 1.0), Vec3::ZERO, &set, &mut zero_batch()).is_empty()
        );
    }

    #[test]
    fn test_placement_is_reproducible() {
        let set = FloraSet::default();
        let run = || {
            let mut batch = RandomBatch::for_run(77);
            let border = place_border_rocks(&ring(30, 6.0), Vec3::ZERO, &set, &mut batch);
            let mut candidates = Vec::new();
            gather_tile_candidates("t", &[tile_volume()], 1.0, &mut batch, &mut candidates);
            (border, place_surface_flora(candidates, &set, &mut batch))
        };
        assert_eq!(run(), run());
    }
}
