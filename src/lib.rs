pub mod config;
pub mod content_classifier;
pub mod error;
pub mod markdown_converter;
pub mod rich_text;

pub use config::{ConversionOptions, NormalizationMode, Thresholds, TsvDetection};
pub use content_classifier::{
    ClassifiedContent, ClipboardPayload, ContentSource, classify_clipboard, is_spreadsheet_content,
    looks_like_html,
};
pub use error::{ConversionError, ConversionResult};
pub use markdown_converter::{
    CellGrid, TableClassification, clean_markdown, convert_clipboard_to_markdown,
    convert_html_to_markdown_sync, normalize_structure, preprocess_html,
};
pub use rich_text::{looks_like_markdown, markdown_to_html, markdown_to_rich_text};
