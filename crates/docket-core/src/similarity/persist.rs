//! Saving and loading similarity matrices
//!
//! A matrix file is a bincode-encoded envelope carrying a magic tag, a format
//! version, the scorer name, the axis names and the packed upper triangle.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use bincode::Options;
use serde::{Deserialize, Serialize};

use super::matrix::SimilarityMatrix;
use crate::error::{DocketError, Result};

/// Suffix of default matrix file names
pub const MATRIX_FILE_SUFFIX: &str = "similarity.bin";

const MAGIC: [u8; 8] = *b"DKTSIMMX";
const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct MatrixEnvelope {
    magic: [u8; 8],
    version: u32,
    scorer: String,
    names: Vec<String>,
    values: Vec<f64>,
}

/// Write `matrix` to `path`
///
/// The data goes to a temporary sibling file first and is renamed into place
/// once fully written, so an interrupted save never leaves a partial matrix
/// under the final name.
pub fn save(matrix: &SimilarityMatrix, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let tmp = partial_path(path);

    let envelope = MatrixEnvelope {
        magic: MAGIC,
        version: FORMAT_VERSION,
        scorer: matrix.scorer_name().to_string(),
        names: matrix.names().to_vec(),
        values: matrix.packed_values().to_vec(),
    };

    let written = File::create(&tmp)
        .map_err(DocketError::from)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            codec()
                .serialize_into(&mut writer, &envelope)
                .map_err(|e| DocketError::Io(format!("{}: {}", tmp.display(), e)))?;
            writer.flush()?;
            Ok(())
        })
        .and_then(|_| fs::rename(&tmp, path).map_err(DocketError::from));

    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    } else {
        tracing::info!(
            "saved {}x{} similarity matrix to {}",
            matrix.len(),
            matrix.len(),
            path.display()
        );
    }
    written
}

/// Read a matrix written by [`save`]
///
/// Unreadable content, a foreign file, an unknown version or inconsistent
/// contents all fail with [`DocketError::MalformedPersistedMatrix`].
pub fn load(path: impl AsRef<Path>) -> Result<SimilarityMatrix> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| DocketError::Io(format!("{}: {}", path.display(), e)))?;
    let size = file.metadata()?.len();

    // Length prefixes can never claim more bytes than the file holds
    let envelope: MatrixEnvelope = codec()
        .with_limit(size)
        .deserialize_from(BufReader::new(file))
        .map_err(|e| DocketError::MalformedPersistedMatrix(format!("{}: {}", path.display(), e)))?;

    if envelope.magic != MAGIC {
        return Err(DocketError::MalformedPersistedMatrix(format!(
            "{} is not a similarity matrix file",
            path.display()
        )));
    }
    if envelope.version != FORMAT_VERSION {
        return Err(DocketError::MalformedPersistedMatrix(format!(
            "{}: unsupported format version {} (expected {})",
            path.display(),
            envelope.version,
            FORMAT_VERSION
        )));
    }

    let matrix = SimilarityMatrix::from_packed(envelope.names, envelope.values, envelope.scorer)?;
    tracing::info!(
        "loaded {}x{} similarity matrix ({}) from {}",
        matrix.len(),
        matrix.len(),
        matrix.scorer_name(),
        path.display()
    );
    Ok(matrix)
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding()
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}
