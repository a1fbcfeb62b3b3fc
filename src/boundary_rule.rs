/// Decides whether an endpoint of a linear geometry is on its boundary,
/// given the number of line endpoints incident on it (its valence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryNodeRule {
    /// Boundary iff the valence is odd (the OGC SFS rule).
    Mod2,
    /// Every endpoint is on the boundary.
    Endpoint,
    /// Boundary iff more than one endpoint is incident.
    MultivalentEndpoint,
    /// Boundary iff exactly one endpoint is incident.
    MonovalentEndpoint,
}

impl Default for BoundaryNodeRule {
    fn default() -> Self {
        BoundaryNodeRule::Mod2
    }
}

impl BoundaryNodeRule {
    #[inline]
    pub fn is_in_boundary(&self, valence: usize) -> bool {
        match self {
            BoundaryNodeRule::Mod2 => valence % 2 == 1,
            BoundaryNodeRule::Endpoint => valence > 0,
            BoundaryNodeRule::MultivalentEndpoint => valence > 1,
            BoundaryNodeRule::MonovalentEndpoint => valence == 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules() {
        use BoundaryNodeRule::*;
        assert!(Mod2.is_in_boundary(1));
        assert!(!Mod2.is_in_boundary(2));
        assert!(Mod2.is_in_boundary(3));
        assert!(Endpoint.is_in_boundary(2));
        assert!(!Endpoint.is_in_boundary(0));
        assert!(!MultivalentEndpoint.is_in_boundary(1));
        assert!(MultivalentEndpoint.is_in_boundary(2));
        assert!(MonovalentEndpoint.is_in_boundary(1));
        assert!(!MonovalentEndpoint.is_in_boundary(2));
    }
}
