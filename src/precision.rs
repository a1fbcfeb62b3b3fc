use geo::Coordinate;

/// Precision model applied to computed coordinates.
///
/// `Floating` keeps full double precision. `Fixed` rounds every computed
/// coordinate to a grid of `1 / scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrecisionModel {
    Floating,
    Fixed { scale: f64 },
}

impl Default for PrecisionModel {
    fn default() -> Self {
        PrecisionModel::Floating
    }
}

impl PrecisionModel {
    /// A fixed model with the given grid cell size.
    pub fn fixed_grid(grid_size: f64) -> Self {
        PrecisionModel::Fixed {
            scale: 1.0 / grid_size,
        }
    }

    #[inline]
    pub fn is_floating(&self) -> bool {
        matches!(self, PrecisionModel::Floating)
    }

    /// Grid cell size, or `0` for floating precision.
    pub fn grid_size(&self) -> f64 {
        match self {
            PrecisionModel::Floating => 0.0,
            PrecisionModel::Fixed { scale } => 1.0 / scale,
        }
    }

    /// Round a single ordinate.
    #[inline]
    pub fn make_precise_value(&self, val: f64) -> f64 {
        match *self {
            PrecisionModel::Floating => val,
            PrecisionModel::Fixed { scale } => {
                if val.is_nan() {
                    return val;
                }
                (val * scale).round() / scale
            }
        }
    }

    /// Round a coordinate to this model.
    #[inline]
    pub fn make_precise(&self, c: Coordinate<f64>) -> Coordinate<f64> {
        Coordinate {
            x: self.make_precise_value(c.x),
            y: self.make_precise_value(c.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_precise() {
        let pm = PrecisionModel::Fixed { scale: 10.0 };
        let c = pm.make_precise(Coordinate { x: 1.234, y: -5.678 });
        assert_eq!(c, Coordinate { x: 1.2, y: -5.7 });
        assert_eq!(pm.grid_size(), 0.1);

        let c = Coordinate { x: 1.234, y: 2.0 };
        assert_eq!(PrecisionModel::default().make_precise(c), c);
        assert_eq!(PrecisionModel::fixed_grid(0.5).make_precise(c).x, 1.0);
    }
}
