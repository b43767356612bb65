/// One of the 8 compass neighbors of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

use Direction::*;

/// Scan order used when ranking a set of directions for a clockwise walk.
pub const CLOCKWISE: [Direction; 8] = [
    NorthWest, North, NorthEast, East, SouthEast, South, SouthWest, West,
];

/// The compass ring in rotation order; turn candidates are contiguous runs
/// on this ring.
const RING: [Direction; 8] = [
    North, NorthEast, East, SouthEast, South, SouthWest, West, NorthWest,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// `(dy, dx)` offset of the neighbor in this direction.
    pub fn offset(self) -> (isize, isize) {
        match self {
            NorthWest => (-1, -1),
            North => (-1, 0),
            NorthEast => (-1, 1),
            East => (0, 1),
            SouthEast => (1, 1),
            South => (1, 0),
            SouthWest => (1, -1),
            West => (0, -1),
        }
    }

    /// Coordinates of the neighbor in this direction, or `None` when it
    /// falls outside a `width x height` frame.
    pub fn step(self, x: usize, y: usize, width: usize, height: usize) -> Option<(usize, usize)> {
        let (dy, dx) = self.offset();
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        if nx < 0 || ny < 0 {
            return None;
        }

        let (nxu, nyu) = (nx as usize, ny as usize);
        if nxu >= width || nyu >= height {
            return None;
        }

        Some((nxu, nyu))
    }

    pub fn opposite(self) -> Self {
        RING[(self.ring_index() + 4) & 7]
    }

    pub fn is_straight(self) -> bool {
        matches!(self, North | East | South | West)
    }

    pub fn is_diagonal(self) -> bool {
        !self.is_straight()
    }

    /// Up to two 45-degree turns to either side of the travel direction,
    /// ordered counter-clockwise to clockwise with straight continuation in
    /// the middle. Excludes the three directions that would reverse the walk.
    pub fn turn_candidates(self) -> [Direction; 5] {
        let i = self.ring_index();
        [
            RING[(i + 6) & 7],
            RING[(i + 7) & 7],
            self,
            RING[(i + 1) & 7],
            RING[(i + 2) & 7],
        ]
    }

    /// Narrow candidate fan used by the dead-end lookahead: one step to
    /// either side of the travel direction.
    pub fn lookahead_candidates(self) -> [Direction; 3] {
        let i = self.ring_index();
        [RING[(i + 7) & 7], self, RING[(i + 1) & 7]]
    }

    /// The two directions perpendicular to this one on the compass ring.
    pub fn side_directions(self) -> [Direction; 2] {
        let i = self.ring_index();
        [RING[(i + 6) & 7], RING[(i + 2) & 7]]
    }

    fn ring_index(self) -> usize {
        RING.iter()
            .position(|&d| d == self)
            .expect("direction present in ring")
    }

    fn scan_rank(self, orientation: Orientation) -> usize {
        let i = CLOCKWISE
            .iter()
            .position(|&d| d == self)
            .expect("direction present in scan order");
        match orientation {
            Orientation::Clockwise => i,
            Orientation::CounterClockwise => CLOCKWISE.len() - 1 - i,
        }
    }
}

/// True when `diagonal` points to the side of `straight` that is opposite
/// to the direction of travel, i.e. the diagonal's component along the
/// straight axis is the straight's reverse. Used to suppress a spurious
/// diagonal alternative that would cut the corner behind the walk.
pub fn side_and_corner_opposite(straight: Direction, diagonal: Direction) -> bool {
    debug_assert!(straight.is_straight() && diagonal.is_diagonal());

    let (sy, sx) = straight.offset();
    let (dy, dx) = diagonal.offset();
    if sx == 0 { dy == -sy } else { dx == -sx }
}

/// Sorts a direction set into the compass scan order for the given walk
/// orientation.
pub fn ordered(directions: &mut [Direction], orientation: Orientation) {
    directions.sort_by_key(|d| d.scan_rank(orientation));
}

/// Tie-break among multiple valid next directions.
///
/// With a clockwise walk the ordered candidate list is scanned from its end
/// and the last valid entry wins; counter-clockwise scans from the start.
/// This hugs the boundary on one fixed side of the walk.
pub fn choose_direction(
    candidates: &[Direction],
    valid: &[Direction],
    orientation: Orientation,
) -> Direction {
    debug_assert!(!valid.is_empty(), "tie-break needs at least one valid move");

    let found = match orientation {
        Orientation::Clockwise => candidates.iter().rev().find(|d| valid.contains(d)),
        Orientation::CounterClockwise => candidates.iter().find(|d| valid.contains(d)),
    };

    match found {
        Some(&d) => d,
        None => valid[0],
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CLOCKWISE, Direction, Orientation, choose_direction, ordered, side_and_corner_opposite,
    };
    use Direction::*;

    #[test]
    fn offsets_cover_eight_neighbors() {
        let mut seen = std::collections::HashSet::new();
        for d in CLOCKWISE {
            let (dy, dx) = d.offset();
            assert!((-1..=1).contains(&dy) && (-1..=1).contains(&dx));
            assert!((dy, dx) != (0, 0));
            seen.insert((dy, dx));
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn step_respects_bounds() {
        assert_eq!(NorthWest.step(0, 0, 5, 5), None);
        assert_eq!(East.step(4, 0, 5, 5), None);
        assert_eq!(South.step(0, 4, 5, 5), None);
        assert_eq!(SouthEast.step(2, 2, 5, 5), Some((3, 3)));
    }

    #[test]
    fn turn_candidates_match_compass_fan() {
        assert_eq!(East.turn_candidates(), [North, NorthEast, East, SouthEast, South]);
        assert_eq!(
            NorthWest.turn_candidates(),
            [SouthWest, West, NorthWest, North, NorthEast]
        );
        assert_eq!(South.lookahead_candidates(), [SouthEast, South, SouthWest]);
    }

    #[test]
    fn sides_and_opposites() {
        assert_eq!(North.opposite(), South);
        assert_eq!(SouthWest.opposite(), NorthEast);
        assert_eq!(East.side_directions(), [North, South]);
        assert_eq!(NorthEast.side_directions(), [NorthWest, SouthEast]);
    }

    #[test]
    fn corner_opposite_detects_backward_diagonals() {
        assert!(side_and_corner_opposite(North, SouthEast));
        assert!(side_and_corner_opposite(North, SouthWest));
        assert!(!side_and_corner_opposite(North, NorthEast));
        assert!(side_and_corner_opposite(East, NorthWest));
        assert!(!side_and_corner_opposite(East, SouthEast));
    }

    #[test]
    fn tie_break_depends_on_orientation() {
        let candidates = East.turn_candidates();
        let valid = [NorthEast, SouthEast];

        assert_eq!(
            choose_direction(&candidates, &valid, Orientation::Clockwise),
            SouthEast
        );
        assert_eq!(
            choose_direction(&candidates, &valid, Orientation::CounterClockwise),
            NorthEast
        );
    }

    #[test]
    fn ordering_follows_scan_order() {
        let mut dirs = vec![West, NorthEast, South];
        ordered(&mut dirs, Orientation::Clockwise);
        assert_eq!(dirs, vec![NorthEast, South, West]);

        ordered(&mut dirs, Orientation::CounterClockwise);
        assert_eq!(dirs, vec![West, South, NorthEast]);
    }
}
