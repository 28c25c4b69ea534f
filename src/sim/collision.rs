//! Tile collision by corner sampling
//!
//! Instead of computing penetration depth, eight fixed points on the actor's
//! box are tested against the centers of the tiles it overlaps. A point
//! "touches" a tile when it lies closer to the tile center than the tile's
//! half-diagonal. The resulting flags gate movement: side hits stop (or turn)
//! walking, bottom contact means standing, a head contact cancels a jump.
//!
//! This is deliberately approximate. It misses sample points that sit exactly
//! between two diagonal neighbours and can report contacts near grid
//! intersections, which is what gives landings and ledges their forgiving feel.

use serde::{Deserialize, Serialize};

use super::actor::Direction;
use super::geometry::{Aabb, Point, distance};
use super::world::{Tile, TileMap};

/// Contact flags for one actor, recomputed from scratch every tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionFlags {
    pub top_left: bool,
    pub top_right: bool,
    pub bottom_left: bool,
    pub bottom_right: bool,
    pub mid_left: bool,
    pub mid_right: bool,
    pub top_middle: bool,
    pub bottom_middle: bool,
    pub on_ground: bool,
    pub hit_left: bool,
    pub hit_right: bool,
}

impl CollisionFlags {
    /// True if any flag is set
    pub fn any(&self) -> bool {
        *self != Self::default()
    }

    /// Whether the side faced by `direction` is against a wall
    pub fn blocked(&self, direction: Direction) -> bool {
        match direction {
            Direction::Left => self.hit_left,
            Direction::Right => self.hit_right,
        }
    }

    /// Forget wall contact on one side after moving away from it
    pub fn release(&mut self, side: Direction) {
        match side {
            Direction::Left => {
                self.hit_left = false;
                self.top_left = false;
                self.mid_left = false;
            }
            Direction::Right => {
                self.hit_right = false;
                self.top_right = false;
                self.mid_right = false;
            }
        }
    }

    /// Drop floor contact when a jump lifts off
    pub fn leave_ground(&mut self) {
        self.on_ground = false;
        self.bottom_left = false;
        self.bottom_right = false;
        self.bottom_middle = false;
    }
}

/// The eight sample points on a box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoints {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
    pub mid_left: Point,
    pub mid_right: Point,
    pub top_middle: Point,
    pub bottom_middle: Point,
}

impl SamplePoints {
    pub fn of(bounds: &Aabb) -> Self {
        let (l, r, t, b) = (bounds.left(), bounds.right(), bounds.top(), bounds.bottom());
        let mid_y = t + bounds.size.y / 2.0;
        let mid_x = l + bounds.size.x / 2.0;
        Self {
            top_left: Point::new(l, t),
            top_right: Point::new(r, t),
            bottom_left: Point::new(l, b),
            bottom_right: Point::new(r, b),
            mid_left: Point::new(l, mid_y),
            mid_right: Point::new(r, mid_y),
            top_middle: Point::new(mid_x, t),
            bottom_middle: Point::new(mid_x, b),
        }
    }
}

/// Result of a resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionOutcome {
    pub flags: CollisionFlags,
    /// Head hit a ceiling; the caller must end any rising jump
    pub ceiling_hit: bool,
}

/// Inclusive AABB overlap test
#[inline]
pub fn check_object_collision(a: &Aabb, b: &Aabb) -> bool {
    a.overlaps(b)
}

/// Distance under which a sample point counts as touching a tile: the tile's
/// half-diagonal (`sqrt(2) * size / 2` for square tiles)
#[inline]
pub fn expected_collision_distance(tile: &Tile) -> f32 {
    tile.bounds.size.length() / 2.0
}

/// Non-decoration tiles overlapping `bounds`
pub fn gather_colliding_tiles<'a>(bounds: &Aabb, map: &'a TileMap) -> Vec<&'a Tile> {
    map.solid_tiles()
        .filter(|tile| check_object_collision(bounds, &tile.bounds))
        .collect()
}

/// Compute the contact flags of a box facing `facing` against the given tiles
pub fn update_collisions(bounds: &Aabb, facing: Direction, tiles: &[&Tile]) -> CollisionOutcome {
    let p = SamplePoints::of(bounds);
    let mut f = CollisionFlags::default();

    for tile in tiles {
        let c = tile.bounds.center();
        let reach = expected_collision_distance(tile);
        let touches = |sample: Point| distance(sample, c) < reach;

        f.top_left |= touches(p.top_left);
        f.top_right |= touches(p.top_right);
        f.bottom_left |= touches(p.bottom_left);
        f.bottom_right |= touches(p.bottom_right);
        f.mid_left |= touches(p.mid_left);
        f.mid_right |= touches(p.mid_right);
        f.top_middle |= touches(p.top_middle);
        f.bottom_middle |= touches(p.bottom_middle);
    }

    // Head against a ceiling with no wall beside it. The top flags are cleared
    // before side hits are derived so the ceiling never reads as a wall.
    let ceiling_hit = f.top_middle && !f.mid_left && !f.mid_right;
    if ceiling_hit {
        f.top_left = false;
        f.top_right = false;
        f.top_middle = false;
    }

    f.hit_left = f.top_left || f.mid_left || (f.bottom_left && !f.bottom_middle);
    f.hit_right = f.top_right || f.mid_right || (f.bottom_right && !f.bottom_middle);

    // A lone bottom corner pressed into the wall being faced is not floor;
    // without this an actor sliding down a wall would stick to its edge.
    let wall_corner_left =
        facing == Direction::Left && f.bottom_left && f.hit_left && !f.bottom_middle;
    let wall_corner_right =
        facing == Direction::Right && f.bottom_right && f.hit_right && !f.bottom_middle;
    f.on_ground = (f.bottom_left || f.bottom_right || f.bottom_middle)
        && !wall_corner_left
        && !wall_corner_right;

    CollisionOutcome {
        flags: f,
        ceiling_hit,
    }
}
