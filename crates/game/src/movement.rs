use glam::IVec2;

use crate::grid::{Direction, max_origin};
use crate::topology::Adjacency;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    pub position: IVec2,
    pub crossed: bool,
}

/// Steps a cursor square across the local grid.
///
/// Leaving an edge with no neighbor clamps to that edge. Leaving an edge
/// that has a neighbor wraps to the opposite edge and reports a crossing;
/// the wrapped coordinate is the position on the neighbor's grid.
pub fn next_position(
    position: IVec2,
    direction: Direction,
    size: i32,
    step: i32,
    adjacency: &Adjacency,
) -> Movement {
    let limit = max_origin(size);
    let target = position + direction.delta() * step;
    let mut crossed = false;

    let y = if target.y < 0 {
        wrap_or_clamp(adjacency.up.is_some(), limit, 0, &mut crossed)
    } else if target.y > limit {
        wrap_or_clamp(adjacency.down.is_some(), 0, limit, &mut crossed)
    } else {
        target.y
    };

    let x = if target.x < 0 {
        wrap_or_clamp(adjacency.left.is_some(), limit, 0, &mut crossed)
    } else if target.x > limit {
        wrap_or_clamp(adjacency.right.is_some(), 0, limit, &mut crossed)
    } else {
        target.x
    };

    Movement {
        position: IVec2::new(x, y),
        crossed,
    }
}

fn wrap_or_clamp(has_neighbor: bool, wrapped: i32, clamped: i32, crossed: &mut bool) -> i32 {
    if has_neighbor {
        *crossed = true;
        wrapped
    } else {
        clamped
    }
}
