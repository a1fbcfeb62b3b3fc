use std::{fmt::Display, str::FromStr};

use crate::{
    error::{OverlayError, Result},
    geometry::Dimension,
    Location,
};

use Dimension::*;

const I: usize = 0;
const B: usize = 1;
const E: usize = 2;

/// A DE-9IM matrix: the dimension of the intersection of the interior,
/// boundary and exterior of one geometry (rows) with those of another
/// (columns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntersectionMatrix {
    matrix: [[Dimension; 3]; 3],
}

impl Default for IntersectionMatrix {
    fn default() -> Self {
        IntersectionMatrix {
            matrix: [[Empty; 3]; 3],
        }
    }
}

fn pattern_chars(pattern: &str) -> Result<[char; 9]> {
    let chars: Vec<char> = pattern.chars().collect();
    chars.try_into().map_err(|_| {
        OverlayError::UnsupportedArgument(format!(
            "intersection matrix pattern must have 9 characters: {pattern:?}"
        ))
    })
}

fn is_true(dim: Dimension) -> bool {
    dim != Empty
}

fn matches_symbol(actual: Dimension, symbol: char) -> Result<bool> {
    Ok(match symbol.to_ascii_uppercase() {
        '*' => true,
        'T' => is_true(actual),
        'F' => actual == Empty,
        '0' => actual == ZeroDimensional,
        '1' => actual == OneDimensional,
        '2' => actual == TwoDimensional,
        c => {
            return Err(OverlayError::UnsupportedArgument(format!(
                "invalid intersection matrix symbol {c:?}"
            )))
        }
    })
}

fn dimension_of_symbol(symbol: char) -> Option<Dimension> {
    match symbol {
        'F' | 'f' => Some(Empty),
        '0' => Some(ZeroDimensional),
        '1' => Some(OneDimensional),
        '2' => Some(TwoDimensional),
        _ => None,
    }
}

impl IntersectionMatrix {
    #[inline]
    pub fn get(&self, row: Location, col: Location) -> Dimension {
        match (row.matrix_index(), col.matrix_index()) {
            (Some(r), Some(c)) => self.matrix[r][c],
            _ => Empty,
        }
    }

    pub fn set(&mut self, row: Location, col: Location, dim: Dimension) {
        if let (Some(r), Some(c)) = (row.matrix_index(), col.matrix_index()) {
            self.matrix[r][c] = dim;
        }
    }

    /// Raise an entry to at least `dim`. Entries with an unknown location
    /// are ignored.
    pub fn set_at_least(&mut self, row: Location, col: Location, dim: Dimension) {
        if let (Some(r), Some(c)) = (row.matrix_index(), col.matrix_index()) {
            let entry = &mut self.matrix[r][c];
            *entry = (*entry).max(dim);
        }
    }

    /// Raise every entry to at least the dimension in `pattern`; `F`, `T`
    /// and `*` leave an entry unchanged.
    pub fn set_at_least_pattern(&mut self, pattern: &str) -> Result<()> {
        let chars = pattern_chars(pattern)?;
        for (i, c) in chars.into_iter().enumerate() {
            if let Some(dim) = dimension_of_symbol(c) {
                let entry = &mut self.matrix[i / 3][i % 3];
                *entry = (*entry).max(dim);
            }
        }
        Ok(())
    }

    pub fn set_all(&mut self, dim: Dimension) {
        self.matrix = [[dim; 3]; 3];
    }

    /// Whether the matrix matches a 9 character pattern of `T`, `F`, `*`,
    /// `0`, `1` and `2`.
    pub fn matches(&self, pattern: &str) -> Result<bool> {
        let chars = pattern_chars(pattern)?;
        for (i, c) in chars.into_iter().enumerate() {
            if !matches_symbol(self.matrix[i / 3][i % 3], c)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The matrix of the relation with arguments swapped.
    pub fn transpose(&self) -> Self {
        let mut matrix = self.matrix;
        for (r, row) in self.matrix.iter().enumerate() {
            for (c, &dim) in row.iter().enumerate() {
                matrix[c][r] = dim;
            }
        }
        IntersectionMatrix { matrix }
    }

    pub fn is_disjoint(&self) -> bool {
        let m = &self.matrix;
        m[I][I] == Empty && m[I][B] == Empty && m[B][I] == Empty && m[B][B] == Empty
    }

    pub fn is_intersects(&self) -> bool {
        !self.is_disjoint()
    }

    /// `dim_a` and `dim_b` are the dimensions of the two geometries.
    pub fn is_touches(&self, dim_a: Dimension, dim_b: Dimension) -> bool {
        if dim_a > dim_b {
            return self.is_touches(dim_b, dim_a);
        }
        let m = &self.matrix;
        match (dim_a, dim_b) {
            (TwoDimensional, TwoDimensional)
            | (OneDimensional, OneDimensional)
            | (OneDimensional, TwoDimensional)
            | (ZeroDimensional, TwoDimensional)
            | (ZeroDimensional, OneDimensional) => {
                m[I][I] == Empty && (is_true(m[I][B]) || is_true(m[B][I]) || is_true(m[B][B]))
            }
            _ => false,
        }
    }

    pub fn is_crosses(&self, dim_a: Dimension, dim_b: Dimension) -> bool {
        let m = &self.matrix;
        match (dim_a, dim_b) {
            (ZeroDimensional, OneDimensional)
            | (ZeroDimensional, TwoDimensional)
            | (OneDimensional, TwoDimensional) => is_true(m[I][I]) && is_true(m[I][E]),
            (OneDimensional, ZeroDimensional)
            | (TwoDimensional, ZeroDimensional)
            | (TwoDimensional, OneDimensional) => is_true(m[I][I]) && is_true(m[E][I]),
            (OneDimensional, OneDimensional) => m[I][I] == ZeroDimensional,
            _ => false,
        }
    }

    pub fn is_within(&self) -> bool {
        let m = &self.matrix;
        is_true(m[I][I]) && m[I][E] == Empty && m[B][E] == Empty
    }

    pub fn is_contains(&self) -> bool {
        let m = &self.matrix;
        is_true(m[I][I]) && m[E][I] == Empty && m[E][B] == Empty
    }

    fn has_point_in_common(&self) -> bool {
        let m = &self.matrix;
        is_true(m[I][I]) || is_true(m[I][B]) || is_true(m[B][I]) || is_true(m[B][B])
    }

    pub fn is_covers(&self) -> bool {
        let m = &self.matrix;
        self.has_point_in_common() && m[E][I] == Empty && m[E][B] == Empty
    }

    pub fn is_covered_by(&self) -> bool {
        let m = &self.matrix;
        self.has_point_in_common() && m[I][E] == Empty && m[B][E] == Empty
    }

    pub fn is_equals(&self, dim_a: Dimension, dim_b: Dimension) -> bool {
        let m = &self.matrix;
        dim_a == dim_b
            && is_true(m[I][I])
            && m[I][E] == Empty
            && m[B][E] == Empty
            && m[E][I] == Empty
            && m[E][B] == Empty
    }

    pub fn is_overlaps(&self, dim_a: Dimension, dim_b: Dimension) -> bool {
        let m = &self.matrix;
        match (dim_a, dim_b) {
            (ZeroDimensional, ZeroDimensional) | (TwoDimensional, TwoDimensional) => {
                is_true(m[I][I]) && is_true(m[I][E]) && is_true(m[E][I])
            }
            (OneDimensional, OneDimensional) => {
                m[I][I] == OneDimensional && is_true(m[I][E]) && is_true(m[E][I])
            }
            _ => false,
        }
    }
}

impl Display for IntersectionMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.matrix {
            for dim in row {
                write!(f, "{}", dim.to_char())?;
            }
        }
        Ok(())
    }
}

impl FromStr for IntersectionMatrix {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self> {
        let chars = pattern_chars(s)?;
        let mut im = IntersectionMatrix::default();
        for (i, c) in chars.into_iter().enumerate() {
            im.matrix[i / 3][i % 3] = dimension_of_symbol(c).ok_or_else(|| {
                OverlayError::UnsupportedArgument(format!("invalid dimension symbol {c:?}"))
            })?;
        }
        Ok(im)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches() {
        let im: IntersectionMatrix = "212101212".parse().unwrap();
        assert_eq!(im.to_string(), "212101212");
        assert!(im.matches("T*T***T**").unwrap());
        assert!(im.matches("2121012*2").unwrap());
        assert!(!im.matches("FF*FF****").unwrap());
        assert!(im.matches("T*T").is_err());
        assert!(im.matches("T*T***T*X").is_err());
    }

    #[test]
    fn test_set_at_least() {
        let mut im = IntersectionMatrix::default();
        im.set(Location::Exterior, Location::Exterior, TwoDimensional);
        im.set_at_least_pattern("FFF0FFFF2").unwrap();
        im.set_at_least_pattern("1FFFFF1FF").unwrap();
        assert_eq!(im.to_string(), "1FF0FF1F2");

        im.set_at_least(Location::Interior, Location::Interior, ZeroDimensional);
        assert_eq!(im.get(Location::Interior, Location::Interior), OneDimensional);
        im.set_at_least(Location::Unknown, Location::Interior, TwoDimensional);
        assert_eq!(im.to_string(), "1FF0FF1F2");
    }

    #[test]
    fn test_transpose_and_predicates() {
        // A line crossing a polygon.
        let im: IntersectionMatrix = "101FF0212".parse().unwrap();
        assert_eq!(im.transpose().to_string(), "1F20F1102");
        assert!(im.is_crosses(OneDimensional, TwoDimensional));
        assert!(im.transpose().is_crosses(TwoDimensional, OneDimensional));
        assert!(!im.is_within());
        assert!(im.is_intersects());

        // Squares sharing an edge.
        let im: IntersectionMatrix = "FF2F11212".parse().unwrap();
        assert!(im.is_touches(TwoDimensional, TwoDimensional));
        assert!(!im.is_overlaps(TwoDimensional, TwoDimensional));

        let im: IntersectionMatrix = "2FFF1FFF2".parse().unwrap();
        assert!(im.is_equals(TwoDimensional, TwoDimensional));
        assert!(im.is_covers() && im.is_covered_by() && im.is_contains() && im.is_within());
    }
}
