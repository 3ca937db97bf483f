//! Marching-squares tile resolution over a stepped heightfield.
//!
//! Every land cell is classified by the relative heights of its eight
//! neighbours. The 3×3 neighbourhood is sampled into codes (`0` lower or
//! outside, `1` equal, `2` higher), rotated in quarter turns, and matched
//! against a fixed template per [`TileKind`].
//!
//! Neighbourhood index `k` addresses offset `(dx, dy)` as
//! `k = (dx + 1) + (dy + 1) * 3`, so row 0 of a template is `y - 1`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::ramp::RampSpots;

/// Relative-height code of a sampled neighbour.
pub const LOWER: u8 = 0;
/// Neighbour at the centre's level.
pub const EQUAL: u8 = 1;
/// Neighbour above the centre's level.
pub const HIGHER: u8 = 2;

/// Template code that matches any sample.
const ANY: i8 = -1;

/// Sampled relative-height codes around one cell.
pub type Neighbourhood = [u8; 9];

/// Template codes: `-1` wildcard, `0` lower, `1` equal, `2` higher-or-equal.
pub type Template = [i8; 9];

/// Tile archetypes, in resolution priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    None,
    Full,
    /// Lower on all sides.
    Pillar,
    CornerInnerSingle,
    CornerInnerDoubleAdjacent,
    CornerInnerDoubleOpposite,
    CornerInnerTriple,
    CornerInnerQuadruple,
    EdgeSingle,
    /// Also covers one-wide bridges.
    EdgeDoubleOpposite,
    CornerInnerSingleEdgeSingle,
    CornerInnerSingleEdgeSingleMirrored,
    /// Also covers two adjacent edges.
    CornerOuterSingle,
    /// Also covers three edges.
    CornerOuterDouble,
    CornerInnerCornerOuter,
    /// Slope connecting two terraces. Never produced by template matching.
    RampFull,
}

impl TileKind {
    /// All archetypes in declaration order.
    pub const ALL: [TileKind; 16] = [
        TileKind::None,
        TileKind::Full,
        TileKind::Pillar,
        TileKind::CornerInnerSingle,
        TileKind::CornerInnerDoubleAdjacent,
        TileKind::CornerInnerDoubleOpposite,
        TileKind::CornerInnerTriple,
        TileKind::CornerInnerQuadruple,
        TileKind::EdgeSingle,
        TileKind::EdgeDoubleOpposite,
        TileKind::CornerInnerSingleEdgeSingle,
        TileKind::CornerInnerSingleEdgeSingleMirrored,
        TileKind::CornerOuterSingle,
        TileKind::CornerOuterDouble,
        TileKind::CornerInnerCornerOuter,
        TileKind::RampFull,
    ];

    /// Stable snake_case name, also used as the default prefab name.
    pub fn name(self) -> &'static str {
        match self {
            TileKind::None => "none",
            TileKind::Full => "full",
            TileKind::Pillar => "pillar",
            TileKind::CornerInnerSingle => "corner_inner_single",
            TileKind::CornerInnerDoubleAdjacent => "corner_inner_double_adjacent",
            TileKind::CornerInnerDoubleOpposite => "corner_inner_double_opposite",
            TileKind::CornerInnerTriple => "corner_inner_triple",
            TileKind::CornerInnerQuadruple => "corner_inner_quadruple",
            TileKind::EdgeSingle => "edge_single",
            TileKind::EdgeDoubleOpposite => "edge_double_opposite",
            TileKind::CornerInnerSingleEdgeSingle => "corner_inner_single_edge_single",
            TileKind::CornerInnerSingleEdgeSingleMirrored => {
                "corner_inner_single_edge_single_mirrored"
            }
            TileKind::CornerOuterSingle => "corner_outer_single",
            TileKind::CornerOuterDouble => "corner_outer_double",
            TileKind::CornerInnerCornerOuter => "corner_inner_corner_outer",
            TileKind::RampFull => "ramp_full",
        }
    }

    /// The archetype's matching template, if it has one.
    pub fn template(self) -> Option<&'static Template> {
        TEMPLATES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, template)| template)
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[rustfmt::skip]
static TEMPLATES: [(TileKind, Template); 15] = [
    (TileKind::None, [
        0, 0, 0,
        0, 0, 0,
        0, 0, 0,
    ]),
    (TileKind::Full, [
        2, 2, 2,
        2, 1, 2,
        2, 2, 2,
    ]),
    (TileKind::Pillar, [
        0, 0, 0,
        0, 1, 0,
        0, 0, 0,
    ]),
    (TileKind::CornerInnerSingle, [
        0, 1, 2,
        1, 1, 2,
        2, 2, 2,
    ]),
    (TileKind::CornerInnerDoubleAdjacent, [
        0, 1, 0,
        1, 1, 1,
        2, 2, 2,
    ]),
    (TileKind::CornerInnerDoubleOpposite, [
        0, 1, 2,
        1, 1, 1,
        2, 1, 0,
    ]),
    (TileKind::CornerInnerTriple, [
        0, 1, 0,
        1, 1, 1,
        2, 1, 0,
    ]),
    (TileKind::CornerInnerQuadruple, [
        0, 1, 0,
        1, 1, 1,
        0, 1, 0,
    ]),
    (TileKind::EdgeSingle, [
        ANY, 0, ANY,
        2,   1, 2,
        2,   2, 2,
    ]),
    (TileKind::EdgeDoubleOpposite, [
        2, 0, 2,
        2, 1, 2,
        2, 0, 2,
    ]),
    (TileKind::CornerInnerSingleEdgeSingle, [
        0, 2, ANY,
        1, 1, 0,
        2, 2, ANY,
    ]),
    (TileKind::CornerInnerSingleEdgeSingleMirrored, [
        2, 2, ANY,
        1, 1, 0,
        0, 2, ANY,
    ]),
    (TileKind::CornerOuterSingle, [
        ANY, 0, ANY,
        2,   1, 0,
        2,   2, ANY,
    ]),
    (TileKind::CornerOuterDouble, [
        ANY, 0, ANY,
        2,   1, 0,
        ANY, 0, ANY,
    ]),
    (TileKind::CornerInnerCornerOuter, [
        ANY, 0, ANY,
        1,   1, 0,
        0,   1, ANY,
    ]),
];

/// A quarter-turn count in `0..4`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rotation(u8);

impl Rotation {
    /// No rotation.
    pub const IDENTITY: Self = Self(0);

    /// Rotation by `quarter_turns` (taken modulo 4).
    pub const fn new(quarter_turns: u8) -> Self {
        Self(quarter_turns % 4)
    }

    /// Quarter turns in `0..4`.
    pub const fn quarter_turns(self) -> u8 {
        self.0
    }

    /// Index usable for per-rotation tables.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Yaw of a placed tile in degrees. Quarter turns map to negative yaw.
    pub fn yaw_degrees(self) -> f32 {
        -(self.0 as f32) * 90.0
    }

    /// The rotation that undoes this one.
    pub const fn inverse(self) -> Self {
        Self::new(4 - self.0)
    }

    /// All four rotations, ascending.
    pub fn all() -> [Rotation; 4] {
        [Self(0), Self(1), Self(2), Self(3)]
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved tile: archetype plus orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileLayout {
    pub kind: TileKind,
    pub rotation: Rotation,
}

impl TileLayout {
    pub const fn new(kind: TileKind, rotation: Rotation) -> Self {
        Self { kind, rotation }
    }

    /// Fallback for unmatched neighbourhoods.
    pub const FALLBACK: Self = Self::new(TileKind::None, Rotation::IDENTITY);
}

/// Sample the relative-height codes around `(x, y)`. Outside cells read as
/// [`LOWER`]; the centre is always [`EQUAL`].
pub fn sample_neighbourhood(grid: &Grid<u32>, x: usize, y: usize) -> Neighbourhood {
    let center = grid[(x, y)];
    let mut sample = [LOWER; 9];
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            let k = ((dx + 1) + (dy + 1) * 3) as usize;
            sample[k] = match grid.get(x as i64 + dx, y as i64 + dy) {
                _ if dx == 0 && dy == 0 => EQUAL,
                Some(&level) if level == center => EQUAL,
                Some(&level) if level > center => HIGHER,
                _ => LOWER,
            };
        }
    }
    sample
}

/// Map neighbourhood index `k` through `turns` applications of the
/// quarter turn `(dx, dy) -> (dy, -dx)`.
fn turn_index(k: usize, turns: u8) -> usize {
    let (mut dx, mut dy) = (k as i32 % 3 - 1, k as i32 / 3 - 1);
    for _ in 0..turns % 4 {
        (dx, dy) = (dy, -dx);
    }
    ((dx + 1) + (dy + 1) * 3) as usize
}

/// The sampled neighbourhood as seen after rotating it by `rotation`.
pub fn rotate_neighbourhood(sample: &Neighbourhood, rotation: Rotation) -> Neighbourhood {
    let back = rotation.inverse().quarter_turns();
    std::array::from_fn(|k| sample[turn_index(k, back)])
}

/// Whether `template` accepts `sample` cell by cell.
pub fn template_matches(template: &Template, sample: &Neighbourhood) -> bool {
    template.iter().zip(sample).all(|(&t, &s)| {
        t == ANY || (t >= 0 && t as u8 == s) || (t == HIGHER as i8 && s >= EQUAL)
    })
}

/// Outcome of matching one neighbourhood against every template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// First match in archetype order, lowest rotation first.
    pub layout: Option<TileLayout>,
    /// Every archetype that matched under some rotation, with its first
    /// matching rotation.
    pub matches: Vec<TileLayout>,
}

impl Resolution {
    /// More than one distinct archetype matched.
    pub fn is_ambiguous(&self) -> bool {
        self.matches.len() > 1
    }
}

/// Match a sampled neighbourhood against all templates.
pub fn match_neighbourhood(sample: &Neighbourhood) -> Resolution {
    let matches: Vec<TileLayout> = TEMPLATES
        .iter()
        .filter_map(|(kind, template)| {
            Rotation::all()
                .into_iter()
                .find(|&r| template_matches(template, &rotate_neighbourhood(sample, r)))
                .map(|r| TileLayout::new(*kind, r))
        })
        .collect();
    Resolution {
        layout: matches.first().copied(),
        matches,
    }
}

fn log_neighbourhood(sample: &Neighbourhood) {
    atoll_log::log_grid(2, "neighbourhood", 3, 3, |x, y| sample[x + y * 3]);
}

/// Resolve the tile for land cell `(x, y)`.
///
/// An ambiguous neighbourhood resolves to the first match; an unmatched one
/// to `(none, 0)`. Both are reported as warnings.
pub fn resolve_tile(grid: &Grid<u32>, x: usize, y: usize) -> TileLayout {
    let sample = sample_neighbourhood(grid, x, y);
    let resolution = match_neighbourhood(&sample);

    if resolution.is_ambiguous() {
        let kinds: Vec<&str> = resolution.matches.iter().map(|m| m.kind.name()).collect();
        tracing::warn!(x, y, matches = ?kinds, "several tiles match the same neighbourhood");
        log_neighbourhood(&sample);
    }

    match resolution.layout {
        Some(layout) => layout,
        None => {
            tracing::warn!(x, y, ?sample, "no tile matches neighbourhood, using none");
            log_neighbourhood(&sample);
            TileLayout::FALLBACK
        }
    }
}

/// Resolve `(x, y)`, letting a ramp spot override the template match.
pub fn resolve_layout(grid: &Grid<u32>, ramps: &RampSpots, x: usize, y: usize) -> TileLayout {
    match ramps.get(x, y) {
        Some(rotation) => TileLayout::new(TileKind::RampFull, rotation),
        None => resolve_tile(grid, x, y),
    }
}

/// Coverage report of the template table over every neighbourhood.
#[derive(Clone, Debug, Default)]
pub struct TemplateAudit {
    /// Neighbourhoods examined (3^8 with the centre fixed).
    pub total: usize,
    /// Neighbourhoods no template accepts.
    pub unmatched: Vec<Neighbourhood>,
    /// Neighbourhoods accepted by more than one archetype.
    pub ambiguous: Vec<(Neighbourhood, Vec<TileKind>)>,
}

/// Enumerate every neighbourhood with the centre fixed at [`EQUAL`] and
/// match it against the template table.
///
/// Not every enumerated neighbourhood occurs in a stepped heightfield, so a
/// non-empty `unmatched` list is expected; `ambiguous` flags overlapping
/// templates.
pub fn audit_templates() -> TemplateAudit {
    let mut audit = TemplateAudit::default();
    for code in 0..3usize.pow(8) {
        let mut rest = code;
        let mut sample = [EQUAL; 9];
        for k in (0..9).filter(|&k| k != 4) {
            sample[k] = (rest % 3) as u8;
            rest /= 3;
        }

        let resolution = match_neighbourhood(&sample);
        audit.total += 1;
        if resolution.layout.is_none() {
            audit.unmatched.push(sample);
        } else if resolution.is_ambiguous() {
            let kinds = resolution.matches.iter().map(|m| m.kind).collect();
            audit.ambiguous.push((sample, kinds));
        }
    }
    audit
}
