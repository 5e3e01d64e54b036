mod bootstrap;
mod jackknife;

pub use bootstrap::{Bootstrap, BootstrapIter};
pub use jackknife::{Jackknife, JackknifeIter, LeaveOneOutMeans};

/// A resampling scheme: turns one sample into a stream of resamples.
pub trait Re<T> {
    type Item;
    fn re(&self, t: &T) -> impl Iterator<Item = Self::Item>;
}
