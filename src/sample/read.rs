use std::io;
use std::path::Path;

use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::Sample;

/// Errors raised while loading a dataset from delimited text.
#[derive(Debug, Error)]
pub enum SampleError {
    /// The file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A record could not be parsed.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
    /// Header present but no data records.
    #[error("CSV file contains no data records")]
    EmptyFile,
}

impl<T> Sample<T> {
    /// Read sample data from a CSV file with headers matching struct fields
    ///
    /// With `T = Row` every header becomes a field name and every cell a
    /// [`Value`](super::Value); blank cells load as `Null`.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, SampleError>
    where
        T: DeserializeOwned,
    {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Same as [`Sample::read`], from any byte source.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, SampleError>
    where
        T: DeserializeOwned,
    {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut records = Vec::new();
        for result in rdr.deserialize() {
            records.push(result?);
        }

        if records.is_empty() {
            return Err(SampleError::EmptyFile);
        }

        tracing::debug!(records = records.len(), "loaded CSV sample");
        Ok(Self { data: records })
    }
}
