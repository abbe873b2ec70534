mod csv;
mod json;
mod text;

#[cfg(feature = "office")]
mod docx;
#[cfg(feature = "html")]
mod html;
#[cfg(feature = "office")]
mod ooxml;
#[cfg(feature = "pdf")]
mod pdf;
#[cfg(feature = "office")]
mod pptx;
#[cfg(feature = "office")]
mod spreadsheet;

pub use self::csv::CsvLoader;
pub use json::JsonLoader;
pub use text::TextLoader;

#[cfg(feature = "office")]
pub use docx::DocxLoader;
#[cfg(feature = "html")]
pub use html::HtmlLoader;
#[cfg(feature = "pdf")]
pub use pdf::PdfLoader;
#[cfg(feature = "office")]
pub use pptx::PptxLoader;
#[cfg(feature = "office")]
pub use spreadsheet::SpreadsheetLoader;
