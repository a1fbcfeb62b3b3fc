use std::f64::consts::PI;

use geo::{Coordinate, LineString, Polygon};

use rand::Rng;
use rand_distr::{Distribution, Standard, Uniform};

/// A star-shaped polygon around the origin: `steps` vertices at
/// increasing angles with radii in `[0.5, 1.5)`.
pub fn circular_polygon<R: Rng>(mut rng: R, steps: usize) -> Polygon<f64> {
    let ang_step = 2. * PI / steps as f64;
    let jitter = Uniform::new(0., ang_step / 2.);
    let radius = Uniform::new(0.5, 1.5);

    let ring: Vec<Coordinate<f64>> = (0..steps)
        .map(|i| {
            let angle = i as f64 * ang_step + jitter.sample(&mut rng);
            let r = radius.sample(&mut rng);
            Coordinate {
                x: r * angle.cos(),
                y: r * angle.sin(),
            }
        })
        .collect();
    Polygon::new(LineString(ring), vec![])
}

/// An x-monotone polygon of `steps` columns whose lower and upper chains
/// wander randomly.
pub fn steppy_polygon<R: Rng>(mut rng: R, steps: usize) -> Polygon<f64> {
    let mut lower = Vec::with_capacity(2 * steps + 2);
    let mut upper = Vec::with_capacity(steps + 1);

    let mut y = 0.;
    for i in 0..=steps {
        let x = i as f64;
        let half_height = 0.1 + rng.sample::<f64, _>(Standard);
        lower.push(Coordinate { x, y: y - half_height });
        upper.push(Coordinate { x, y: y + half_height });
        y += rng.sample::<f64, _>(Standard) - 0.5;
    }
    lower.extend(upper.into_iter().rev());
    Polygon::new(LineString(lower), vec![])
}

/// A fixed set of inputs handed out round-robin.
#[allow(dead_code)]
pub struct Samples<T>(Vec<T>);

#[allow(dead_code)]
impl<T> Samples<T> {
    pub fn from_fn<F: FnMut() -> T>(size: usize, mut proc: F) -> Self {
        Self((0..size).map(|_| proc()).collect())
    }

    pub fn sampler<'a>(&'a self) -> impl FnMut() -> &'a T {
        let mut curr = 0;
        move || {
            let rv = &self.0[curr];
            curr = (curr + 1) % self.0.len();
            rv
        }
    }
}
