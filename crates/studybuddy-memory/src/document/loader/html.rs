use std::path::Path;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, DocumentError, DocumentLoader, LoadCause, LoadFuture, decode_text,
    read_limited, whole_document,
};

const WRAP_WIDTH: usize = 100;

/// HTML pages: the `<title>` on the first line, then the rendered body text.
pub struct HtmlLoader {
    pub max_file_size: u64,
}

impl Default for HtmlLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for HtmlLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let html = decode_text(read_limited(&path, max_size).await?);
            let text = render(&html).map_err(|e| DocumentError::load(&path, e))?;
            Ok(whole_document(&path, text))
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }
}

fn render(html: &str) -> Result<String, LoadCause> {
    let soup = scrape_core::Soup::parse(html);

    let title = soup
        .find_all("title")
        .map_err(|e| LoadCause::Html(format!("invalid selector: {e}")))?
        .into_iter()
        .map(|t| t.text().trim().to_owned())
        .find(|t| !t.is_empty());
    let body = soup
        .find_all("body")
        .map_err(|e| LoadCause::Html(format!("invalid selector: {e}")))?
        .into_iter()
        .next()
        .map_or_else(|| html.to_owned(), |b| b.inner_html());

    let rendered = html2text::from_read(body.as_bytes(), WRAP_WIDTH)
        .map_err(|e| LoadCause::Html(e.to_string()))?;
    let rendered = rendered.trim();

    Ok(match title {
        Some(title) if !rendered.is_empty() => format!("{title}\n{rendered}"),
        Some(title) => title,
        None => rendered.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_then_body() {
        let text = render(
            "<html><head><title>Lecture 3</title></head><body><p>Enzymes lower activation energy.</p></body></html>",
        )
        .unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Lecture 3"));
        assert!(text.contains("Enzymes lower activation energy."));
    }

    #[test]
    fn body_without_title() {
        let text = render("<html><body><p>Only body</p></body></html>").unwrap();
        assert!(text.starts_with("Only body"));
    }

    #[tokio::test]
    async fn htm_extension_loads() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("page.htm");
        std::fs::write(&file, "<html><body><h1>Heading</h1><p>Para</p></body></html>").unwrap();

        let segments = HtmlLoader::default().load(&file).await.unwrap();
        assert_eq!(segments.len(), 1);
        assert!(segments[0].text.contains("Para"));
        assert_eq!(segments[0].metadata.file_type, "htm");
    }

    #[tokio::test]
    async fn empty_page_has_no_segments() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("blank.html");
        std::fs::write(&file, "<html><body>   </body></html>").unwrap();

        let segments = HtmlLoader::default().load(&file).await.unwrap();
        assert!(segments.is_empty());
    }
}
