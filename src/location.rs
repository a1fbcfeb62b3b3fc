use std::fmt::Display;

/// Topological location of a point relative to a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Interior,
    Boundary,
    Exterior,
    /// Not yet determined. Distinct from `Exterior`.
    Unknown,
}

impl Location {
    #[inline]
    pub fn is_known(self) -> bool {
        self != Location::Unknown
    }

    /// Index used by the intersection matrix (`Interior`, `Boundary`,
    /// `Exterior` in that order).
    #[inline]
    pub(crate) fn matrix_index(self) -> Option<usize> {
        match self {
            Location::Interior => Some(0),
            Location::Boundary => Some(1),
            Location::Exterior => Some(2),
            Location::Unknown => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Location::Interior => 'i',
            Location::Boundary => 'b',
            Location::Exterior => 'e',
            Location::Unknown => '-',
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Position relative to a directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    On,
    Left,
    Right,
}

impl Position {
    /// Swap `Left` and `Right`; `On` is fixed.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Position::On => Position::On,
            Position::Left => Position::Right,
            Position::Right => Position::Left,
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Position::On => 0,
            Position::Left => 1,
            Position::Right => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_opposite() {
        for pos in [Position::On, Position::Left, Position::Right] {
            assert_eq!(pos.opposite().opposite(), pos);
        }
        assert_eq!(Position::Left.opposite(), Position::Right);
        assert_eq!(Position::On.opposite(), Position::On);
    }

    #[test]
    fn test_unknown_is_not_exterior() {
        assert!(!Location::Unknown.is_known());
        assert_ne!(Location::Unknown, Location::Exterior);
        assert_eq!(Location::Unknown.matrix_index(), None);
    }
}
