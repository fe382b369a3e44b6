use glam::Vec3;
use rand::Rng;

/// A point in the target volume pulling growth toward itself.
///
/// Attractors carry no identity beyond their position. Once the tree
/// gets close enough (the kill distance) they are consumed: `alive`
/// flips to `false` and never back.
#[derive(Clone, Copy, Debug)]
pub struct Attractor {
    pub pos: Vec3,
    pub alive: bool,
}

#[derive(Clone, Debug, Default)]
pub struct AttractorSet {
    pub points: Vec<Attractor>,
}

impl AttractorSet {
    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        let points = positions
            .into_iter()
            .map(|pos| Attractor { pos, alive: true })
            .collect();

        Self { points }
    }

    /// Fills the set from a sampler over the given axis-aligned region.
    pub fn sampled(
        sampler: &mut impl PointSampler,
        region_min: Vec3,
        region_max: Vec3,
        count: usize,
    ) -> Self {
        Self::from_positions(sampler.sample(region_min, region_max, count))
    }

    pub fn alive_count(&self) -> usize {
        self.points.iter().filter(|a| a.alive).count()
    }
}

/// Source of attraction points inside a target volume.
///
/// Implementors guarantee every returned position lies inside the
/// volume they represent; the growth engine treats this as an opaque,
/// possibly expensive precomputation.
pub trait PointSampler {
    fn sample(&mut self, region_min: Vec3, region_max: Vec3, count: usize) -> Vec<Vec3>;
}

/// Uniform sampling over the whole axis-aligned region.
#[derive(Debug)]
pub struct BoxSampler<R: Rng> {
    pub rng: R,
}

impl<R: Rng> BoxSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> PointSampler for BoxSampler<R> {
    fn sample(&mut self, region_min: Vec3, region_max: Vec3, count: usize) -> Vec<Vec3> {
        (0..count)
            .map(|_| {
                Vec3::new(
                    self.rng.random_range(region_min.x..=region_max.x),
                    self.rng.random_range(region_min.y..=region_max.y),
                    self.rng.random_range(region_min.z..=region_max.z),
                )
            })
            .collect()
    }
}

/// Rejection sampling against an inside-volume predicate.
///
/// Draws uniform candidates in the region and keeps the ones for which
/// `inside` holds, until `count` hits are collected. The predicate
/// stands in for whatever containment test the host provides (e.g. a
/// closest-point-on-mesh query against a solid).
#[derive(Debug)]
pub struct RejectionSampler<R: Rng, F: Fn(Vec3) -> bool> {
    pub rng: R,
    pub inside: F,
}

impl<R: Rng, F: Fn(Vec3) -> bool> RejectionSampler<R, F> {
    pub fn new(rng: R, inside: F) -> Self {
        Self { rng, inside }
    }
}

impl<R: Rng, F: Fn(Vec3) -> bool> PointSampler for RejectionSampler<R, F> {
    fn sample(&mut self, region_min: Vec3, region_max: Vec3, count: usize) -> Vec<Vec3> {
        let mut hits = Vec::with_capacity(count);
        while hits.len() < count {
            let candidate = Vec3::new(
                self.rng.random_range(region_min.x..=region_max.x),
                self.rng.random_range(region_min.y..=region_max.y),
                self.rng.random_range(region_min.z..=region_max.z),
            );
            if (self.inside)(candidate) {
                hits.push(candidate);
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn from_positions_marks_everything_alive() {
        let set = AttractorSet::from_positions(vec![Vec3::ZERO, Vec3::ONE]);
        assert_eq!(set.points.len(), 2);
        assert_eq!(set.alive_count(), 2);
    }

    #[test]
    fn box_sampler_stays_inside_the_region() {
        let mut sampler = BoxSampler::new(StdRng::seed_from_u64(7));
        let min = Vec3::new(-1.0, 0.0, -2.0);
        let max = Vec3::new(1.0, 3.0, 2.0);
        let points = sampler.sample(min, max, 200);

        assert_eq!(points.len(), 200);
        for p in points {
            assert!(p.x >= min.x && p.x <= max.x);
            assert!(p.y >= min.y && p.y <= max.y);
            assert!(p.z >= min.z && p.z <= max.z);
        }
    }

    #[test]
    fn rejection_sampler_honors_the_predicate() {
        let center = Vec3::new(0.0, 1.0, 0.0);
        let radius = 0.8;
        let mut sampler = RejectionSampler::new(StdRng::seed_from_u64(7), |p: Vec3| {
            (p - center).length_squared() <= radius * radius
        });

        let points = sampler.sample(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0), 100);
        assert_eq!(points.len(), 100);
        for p in points {
            assert!((p - center).length_squared() <= radius * radius);
        }
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let min = Vec3::splat(-1.0);
        let max = Vec3::splat(1.0);
        let a = BoxSampler::new(StdRng::seed_from_u64(42)).sample(min, max, 50);
        let b = BoxSampler::new(StdRng::seed_from_u64(42)).sample(min, max, 50);
        assert_eq!(a, b);
    }
}
