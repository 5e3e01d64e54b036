mod read;
mod value;
mod weighted;

use crate::statistics::Statistic;

pub use read::SampleError;
pub use value::{Row, Value};
pub use weighted::{Filtered, WeightedValue, indicator_values, numeric_values, row_weight};

/// A survey dataset: the rows handed over by the caller.
pub type Dataset = Sample<Row>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample<T> {
    pub data: Vec<T>,
}

impl<T> Sample<T> {
    /// Create a new sample from raw data
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Get the number of observations in the sample
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the sample contains no observations
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over the observations
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Estimate a statistic from the sample data
    pub fn estimate<Output>(&self, statistic: &impl Statistic<Self, Output>) -> Output {
        statistic.compute(self)
    }
}

impl<T> FromIterator<T> for Sample<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Sample::new(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for Sample<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Sample<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<T> AsRef<[T]> for Sample<T> {
    fn as_ref(&self) -> &[T] { &self.data }
}
