use std::path::Path;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, DocumentLoader, LoadCause, LoadFuture, Segment, decode_blocking,
    metadata_for, read_limited,
};
use super::ooxml;

/// Slide decks: one segment per slide with text. `page` is the zero-based slide
/// position.
pub struct PptxLoader {
    pub max_file_size: u64,
}

impl Default for PptxLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for PptxLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let bytes = read_limited(&path, max_size).await?;
            let slides = decode_blocking(&path, move || slide_texts(bytes)).await?;

            let base = metadata_for(&path);
            Ok(slides
                .into_iter()
                .enumerate()
                .filter(|(_, text)| !text.trim().is_empty())
                .map(|(slide, text)| Segment::new(text, base.clone().with_page(slide)))
                .collect())
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pptx"]
    }
}

/// Text of each slide in presentation order.
fn slide_texts(bytes: Vec<u8>) -> Result<Vec<String>, LoadCause> {
    let mut archive = ooxml::open(bytes)?;
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_owned())))
        .collect();
    slides.sort_by_key(|(n, _)| *n);

    slides
        .into_iter()
        .map(|(_, name)| {
            let xml = ooxml::read_entry(&mut archive, &name)?;
            ooxml::extract_text(&xml, &ooxml::DRAWING)
        })
        .collect()
}

fn slide_number(entry: &str) -> Option<u32> {
    entry
        .strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}
