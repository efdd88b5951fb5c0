//! CSV writers for run outputs

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use docket_core::labeling::ANNOTATION_COLUMNS;
use docket_core::{AnnotatedRecord, ContingencyTable, DistinctCounts, Representative, SweepPoint};

use crate::reader::{IoError, IoResult};

/// Create `path` and hand a buffered writer to `write`
///
/// Any failure is reported as [`IoError::Write`] naming the path.
pub fn write_to_path<F>(path: impl AsRef<Path>, write: F) -> IoResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> IoResult<()>,
{
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| write_error(path, e))?;
    let mut out = BufWriter::new(file);
    write(&mut out).map_err(|e| write_error(path, e))?;
    out.flush().map_err(|e| write_error(path, e))?;

    tracing::info!("wrote {}", path.display());
    Ok(())
}

/// Source columns followed by the cleaned values and cluster labels
pub fn write_annotated<W: Write>(out: W, headers: &[String], rows: &[AnnotatedRecord<'_>]) -> IoResult<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(headers.iter().map(String::as_str).chain(ANNOTATION_COLUMNS))?;
    for row in rows {
        writer.write_record(row.fields())?;
    }
    writer.flush()?;
    Ok(())
}

/// `ClusterName,Clustered,<outcome...>`
pub fn write_crosstab<W: Write>(out: W, table: &ContingencyTable) -> IoResult<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(
        ["ClusterName", "Clustered"]
            .into_iter()
            .chain(table.outcomes().iter().map(String::as_str)),
    )?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(row.counts.len() + 2);
        record.push(row.cluster_name.clone());
        record.push(python_bool(row.clustered).to_string());
        record.extend(row.counts.iter().map(|c| c.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// `eps,clusters,core_points,clustered_names,noise_names`
pub fn write_sweep<W: Write>(out: W, points: &[SweepPoint]) -> IoResult<()> {
    let mut writer = csv::Writer::from_writer(out);
    for point in points {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}

/// `cluster_id,name,member_count,row_count`
pub fn write_representatives<W: Write>(out: W, representatives: &[Representative]) -> IoResult<()> {
    let mut writer = csv::Writer::from_writer(out);
    for rep in representatives {
        writer.serialize(rep)?;
    }
    writer.flush()?;
    Ok(())
}

/// Two-column frequency table in canonical order
pub fn write_counts<W: Write>(out: W, column: &str, counts: &DistinctCounts) -> IoResult<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([column, "Count"])?;
    for (value, count) in counts.iter() {
        writer.write_record([value, count.to_string().as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_error(path: &Path, err: impl std::fmt::Display) -> IoError {
    IoError::Write {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

fn python_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
