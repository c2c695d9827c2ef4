//! File IO related tools.
//!
//! Anything serializable may opt into [`FileIO`], which saves and loads values in
//! the bincode format.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::GalResult;

/// Support for binary save and load of serializable objects.
pub trait FileIO: Serialize + DeserializeOwned {
    /// Save into a file, returning the number of bytes written.
    ///
    /// # Errors
    /// Fails if the file cannot be created or the object cannot be encoded.
    fn save(&self, filename: impl AsRef<Path>) -> GalResult<usize> {
        let mut f = BufWriter::new(File::create(filename)?);
        Ok(bincode::serde::encode_into_std_write(
            self,
            &mut f,
            bincode::config::legacy(),
        )?)
    }

    /// Load from a file.
    ///
    /// # Errors
    /// Fails if the file cannot be opened or its contents cannot be decoded.
    fn load(filename: impl AsRef<Path>) -> GalResult<Self> {
        let mut f = BufReader::new(File::open(filename)?);
        Ok(bincode::serde::decode_from_std_read(
            &mut f,
            bincode::config::legacy(),
        )?)
    }

    /// Save a slice of objects into a single file.
    ///
    /// # Errors
    /// Fails if the file cannot be created or any object cannot be encoded.
    fn save_vec(vec: &[Self], filename: impl AsRef<Path>) -> GalResult<usize> {
        let mut f = BufWriter::new(File::create(filename)?);
        Ok(bincode::serde::encode_into_std_write(
            vec,
            &mut f,
            bincode::config::legacy(),
        )?)
    }

    /// Load a vector of objects written by [`FileIO::save_vec`].
    ///
    /// # Errors
    /// Fails if the file cannot be opened or its contents cannot be decoded.
    fn load_vec(filename: impl AsRef<Path>) -> GalResult<Vec<Self>> {
        let mut f = BufReader::new(File::open(filename)?);
        Ok(bincode::serde::decode_from_std_read(
            &mut f,
            bincode::config::legacy(),
        )?)
    }
}
