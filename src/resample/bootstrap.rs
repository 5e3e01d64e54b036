use rand::Rng;

use crate::Sample;
use super::Re;

/// Nonparametric bootstrap: each resample draws `n` observations uniformly
/// with replacement. Observations are copied whole, so a weighted value keeps
/// its weight.
///
/// The RNG is cloned per [`Re::re`] call, so the same `Bootstrap` replays the
/// same stream. Seed a fresh one per estimate.
#[derive(Clone, Copy, Default)]
pub struct Bootstrap<R: Rng> {
    pub rng: R,
}

impl<R: Rng> Bootstrap<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<T: Copy, R: Rng + Clone> Re<Sample<T>> for Bootstrap<R> {
    type Item = Sample<T>;

    fn re(&self, sample: &Sample<T>) -> impl Iterator<Item = Self::Item> {
        BootstrapIter::new(&sample.data, self.rng.clone())
    }
}

pub struct BootstrapIter<'a, T, R: Rng> {
    data: &'a [T],
    rng: R,
}

impl<'a, T: Copy, R: Rng> BootstrapIter<'a, T, R> {
    fn new(data: &'a [T], rng: R) -> Self {
        Self { data, rng }
    }
}

impl<T: Copy, R: Rng> Iterator for BootstrapIter<'_, T, R> {
    type Item = Sample<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.data.len();
        if n == 0 {
            return None;
        }

        let mut buffer = Vec::with_capacity(n);
        for _ in 0..n {
            buffer.push(self.data[self.rng.gen_range(0..n)]);
        }
        Some(Sample::new(buffer))
    }
}
