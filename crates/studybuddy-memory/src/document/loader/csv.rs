use std::path::Path;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, DocumentError, DocumentLoader, LoadFuture, Segment, decode_text,
    metadata_for, read_limited,
};

/// One segment per data row, rendered as `header: value` lines. `page` holds the
/// zero-based row index.
pub struct CsvLoader {
    pub max_file_size: u64,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for CsvLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let text = decode_text(read_limited(&path, max_size).await?);
            rows_to_segments(&path, &text)
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["csv"]
    }
}

fn rows_to_segments(path: &Path, text: &str) -> Result<Vec<Segment>, DocumentError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| DocumentError::load(path, e))?
        .clone();

    let mut segments = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| DocumentError::load(path, e))?;
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let lines: Vec<String> = record
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let header = headers
                    .get(i)
                    .map_or_else(|| format!("column_{}", i + 1), str::to_owned);
                format!("{}: {}", header.trim(), value.trim())
            })
            .collect();
        segments.push(Segment::new(
            lines.join("\n"),
            metadata_for(path).with_page(row),
        ));
    }
    Ok(segments)
}
