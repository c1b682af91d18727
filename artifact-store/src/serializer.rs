//! Dated scrape artifacts on local disk.

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use newsdesk_core::{ArtifactError, ArtifactFormat, CoreError, ForumPost};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

fn ensure_parent(path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn malformed(path: &Path, details: impl ToString) -> CoreError {
    ArtifactError::Malformed {
        path: path.display().to_string(),
        details: details.to_string(),
    }
    .into()
}

/// Writes `posts` to `path`, replacing any previous file.
///
/// CSV output always starts with the header row, so an empty slice still
/// yields a readable file.
pub fn write_posts(posts: &[ForumPost], path: &Path, format: ArtifactFormat) -> Result<(), CoreError> {
    ensure_parent(path)?;

    match format {
        ArtifactFormat::Csv => {
            let mut writer = WriterBuilder::new()
                .has_headers(false)
                .from_path(path)
                .map_err(io::Error::from)?;
            writer
                .write_record(ForumPost::FIELDS)
                .map_err(io::Error::from)?;
            for post in posts {
                writer.serialize(post).map_err(io::Error::from)?;
            }
            writer.flush()?;
        }
        ArtifactFormat::Json => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, posts)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
    }

    debug!("Wrote {} posts to {}", posts.len(), path.display());
    Ok(())
}

pub fn read_posts(path: &Path, format: ArtifactFormat) -> Result<Vec<ForumPost>, CoreError> {
    match format {
        ArtifactFormat::Csv => {
            let mut reader = ReaderBuilder::new()
                .from_path(path)
                .map_err(io::Error::from)?;
            reader
                .deserialize()
                .collect::<Result<Vec<ForumPost>, _>>()
                .map_err(|e| malformed(path, e))
        }
        ArtifactFormat::Json => {
            let reader = BufReader::new(File::open(path)?);
            serde_json::from_reader(reader).map_err(|e| malformed(path, e))
        }
    }
}

/// Header plus the first `rows` records of any CSV file, or the first `rows`
/// elements of a JSON array, rendered back as text.
pub fn preview(path: &Path, format: ArtifactFormat, rows: usize) -> Result<String, CoreError> {
    if fs::metadata(path)?.len() == 0 {
        return Err(ArtifactError::Empty {
            path: path.display().to_string(),
        }
        .into());
    }

    match format {
        ArtifactFormat::Csv => preview_csv(path, rows),
        ArtifactFormat::Json => preview_json(path, rows),
    }
}

fn preview_csv(path: &Path, rows: usize) -> Result<String, CoreError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(io::Error::from)?;
    let headers = reader.headers().map_err(|e| malformed(path, e))?.clone();

    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
    writer.write_record(&headers).map_err(io::Error::from)?;

    let mut record = StringRecord::new();
    for _ in 0..rows {
        if !reader.read_record(&mut record).map_err(|e| malformed(path, e))? {
            break;
        }
        writer.write_record(&record).map_err(io::Error::from)?;
    }

    let bytes = writer.into_inner().map_err(|e| CoreError::Internal {
        message: format!("could not finish preview of {}: {}", path.display(), e),
    })?;
    String::from_utf8(bytes).map_err(|e| malformed(path, e))
}

fn preview_json(path: &Path, rows: usize) -> Result<String, CoreError> {
    let reader = BufReader::new(File::open(path)?);
    let value: Value = serde_json::from_reader(reader).map_err(|e| malformed(path, e))?;

    match value {
        Value::Array(items) => {
            let head: Vec<Value> = items.into_iter().take(rows).collect();
            Ok(serde_json::to_string_pretty(&head)?)
        }
        _ => Err(malformed(path, "expected a JSON array")),
    }
}
