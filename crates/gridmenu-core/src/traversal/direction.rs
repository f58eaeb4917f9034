use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the eight grid movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Upwards,
    Downwards,
    Right,
    Left,
    RightUpwards,
    LeftUpwards,
    RightDownwards,
    LeftDownwards,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Upwards,
        Direction::Downwards,
        Direction::Right,
        Direction::Left,
        Direction::RightUpwards,
        Direction::LeftUpwards,
        Direction::RightDownwards,
        Direction::LeftDownwards,
    ];

    /// Row and column delta of one step
    pub const fn delta(&self) -> (isize, isize) {
        match self {
            Direction::Upwards => (-1, 0),
            Direction::Downwards => (1, 0),
            Direction::Right => (0, 1),
            Direction::Left => (0, -1),
            Direction::RightUpwards => (-1, 1),
            Direction::LeftUpwards => (-1, -1),
            Direction::RightDownwards => (1, 1),
            Direction::LeftDownwards => (1, -1),
        }
    }

    /// Whether a step moves the linear index forward.
    ///
    /// Increasing directions stop past an upper end bound, decreasing
    /// directions stop below a lower one.
    pub const fn is_increasing(&self) -> bool {
        matches!(
            self,
            Direction::Downwards
                | Direction::Right
                | Direction::RightDownwards
                | Direction::LeftDownwards
        )
    }

    /// Whether `index` has moved past `end` in this direction's sense
    pub const fn is_past(&self, index: isize, end: isize) -> bool {
        if self.is_increasing() {
            index > end
        } else {
            index < end
        }
    }

    pub const fn opposite(&self) -> Direction {
        match self {
            Direction::Upwards => Direction::Downwards,
            Direction::Downwards => Direction::Upwards,
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
            Direction::RightUpwards => Direction::LeftDownwards,
            Direction::LeftUpwards => Direction::RightDownwards,
            Direction::RightDownwards => Direction::LeftUpwards,
            Direction::LeftDownwards => Direction::RightUpwards,
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "up" | "upwards" => Ok(Direction::Upwards),
            "down" | "downwards" => Ok(Direction::Downwards),
            "right" => Ok(Direction::Right),
            "left" => Ok(Direction::Left),
            "right_upwards" => Ok(Direction::RightUpwards),
            "left_upwards" => Ok(Direction::LeftUpwards),
            "right_downwards" => Ok(Direction::RightDownwards),
            "left_downwards" => Ok(Direction::LeftDownwards),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_cancels_delta() {
        for direction in Direction::ALL {
            let (dr, dc) = direction.delta();
            let (or, oc) = direction.opposite().delta();
            assert_eq!((dr + or, dc + oc), (0, 0));
            assert_ne!(direction.is_increasing(), direction.opposite().is_increasing());
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("up".parse::<Direction>(), Ok(Direction::Upwards));
        assert_eq!("LEFT_DOWNWARDS".parse::<Direction>(), Ok(Direction::LeftDownwards));
        assert!("sideways".parse::<Direction>().is_err());
    }
}
