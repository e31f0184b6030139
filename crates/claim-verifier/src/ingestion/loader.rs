//! Source document loading into ordered pages

use std::path::{Path, PathBuf};

use crate::config::LoadFailurePolicy;
use crate::error::{Error, Result};
use crate::types::{DocumentPage, FileType};

/// Typographic characters PDF fonts commonly emit, mapped to plain text.
/// Letters outside ASCII (æ, ø, å) are kept as they are.
const PDF_REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2010}', "-"),   // Hyphen
    ('\u{2011}', "-"),   // Non-breaking hyphen
    ('\u{2013}', "-"),   // En dash
    ('\u{2014}', "--"),  // Em dash
    ('\u{2018}', "'"),   // Left single quote
    ('\u{2019}', "'"),   // Right single quote
    ('\u{201C}', "\""),  // Left double quote
    ('\u{201D}', "\""),  // Right double quote
    ('\u{2022}', "* "),  // Bullet
    ('\u{2026}', "..."), // Ellipsis
    ('\u{00A0}', " "),   // Non-breaking space
    ('\u{00AD}', ""),    // Soft hyphen
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
];

/// Normalise text extracted from a PDF page
fn cleanup_pdf_text(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for c in text.chars() {
        match PDF_REPLACEMENTS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => cleaned.push_str(to),
            None if c == '\0' => {}
            None => cleaned.push(c),
        }
    }

    cleaned
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Loads source documents as page-level text
#[derive(Debug, Clone, Default)]
pub struct DocumentLoader {
    policy: LoadFailurePolicy,
}

impl DocumentLoader {
    /// Create a loader with the given batch failure policy
    pub fn new(policy: LoadFailurePolicy) -> Self {
        Self { policy }
    }

    /// Load all documents, preserving document order then page order
    ///
    /// Under `Abort` the first failure is returned. Under `Skip` failures are
    /// logged and skipped, but a batch where every file fails is still an error.
    pub fn load(&self, paths: &[PathBuf]) -> Result<Vec<DocumentPage>> {
        let mut pages = Vec::new();
        let mut failures = 0usize;

        for path in paths {
            tracing::info!("Processing document: {}", path.display());
            match Self::load_file(path) {
                Ok(doc_pages) => {
                    tracing::info!("  - Loaded {} pages", doc_pages.len());
                    pages.extend(doc_pages);
                }
                Err(e) => match self.policy {
                    LoadFailurePolicy::Abort => return Err(e),
                    LoadFailurePolicy::Skip => {
                        tracing::warn!("Skipping {}: {}", path.display(), e);
                        failures += 1;
                    }
                },
            }
        }

        if failures > 0 && failures == paths.len() {
            return Err(Error::load(
                &paths[0],
                format!("none of the {} documents could be loaded", failures),
            ));
        }

        Ok(pages)
    }

    /// Load one document based on its extension
    pub fn load_file(path: &Path) -> Result<Vec<DocumentPage>> {
        if !path.is_file() {
            return Err(Error::load(path, "file does not exist"));
        }

        match FileType::from_path(path) {
            FileType::Pdf => Self::load_pdf(path),
            FileType::Txt | FileType::Markdown => Self::load_text(path),
            FileType::Unknown => Err(Error::load(path, "unsupported file type")),
        }
    }

    /// Text files: form feeds separate pages
    fn load_text(path: &Path) -> Result<Vec<DocumentPage>> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::load(path, e.to_string()))?;
        let source = path.display().to_string();

        Ok(raw
            .split('\u{000C}')
            .enumerate()
            .map(|(i, text)| DocumentPage::new(source.clone(), i as u32 + 1, text.trim()))
            .collect())
    }

    /// PDF files: one page per PDF page, empty pages included
    fn load_pdf(path: &Path) -> Result<Vec<DocumentPage>> {
        let doc = lopdf::Document::load(path)
            .map_err(|e| Error::load(path, format!("Failed to load PDF: {}", e)))?;

        if doc.is_encrypted() {
            return Err(Error::load(path, "PDF is encrypted"));
        }

        let source = path.display().to_string();
        let pages = doc.get_pages();
        let mut result = Vec::with_capacity(pages.len());

        for (page_number, page_id) in pages {
            let text = match doc.extract_text(&[page_number]) {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!(
                        "lopdf text extraction failed on page {}: {}, scanning content stream",
                        page_number,
                        e
                    );
                    doc.get_page_content(page_id)
                        .map(|content| extract_text_from_content(&content))
                        .unwrap_or_default()
                }
            };

            let text = cleanup_pdf_text(&text);
            if text.is_empty() {
                tracing::debug!("Page {} of {} has no extractable text", page_number, source);
            }
            result.push(DocumentPage::new(source.clone(), page_number, text));
        }

        if result.is_empty() {
            return Err(Error::load(path, "PDF has no pages"));
        }

        Ok(result)
    }
}

/// Extract text shown by `Tj`/`TJ` operators from raw content stream bytes
fn extract_text_from_content(content: &[u8]) -> String {
    let content_str = String::from_utf8_lossy(content);
    let mut text = String::new();
    let mut in_text_block = false;

    for line in content_str.lines() {
        let line = line.trim();

        match line {
            "BT" => in_text_block = true,
            "ET" => {
                in_text_block = false;
                if !text.ends_with('\n') && !text.is_empty() {
                    text.push('\n');
                }
            }
            _ if in_text_block && (line.ends_with("Tj") || line.ends_with("TJ")) => {
                if let (Some(start), Some(end)) = (line.find('('), line.rfind(')')) {
                    if start < end {
                        let decoded = line[start + 1..end]
                            .replace("\\n", "\n")
                            .replace("\\(", "(")
                            .replace("\\)", ")")
                            .replace("\\\\", "\\");
                        text.push_str(&decoded);
                    }
                }
            }
            _ => {}
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use tempfile::TempDir;

    fn write_pdf(path: &Path, pages: &[&str]) {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_cleanup_keeps_norwegian_letters() {
        let cleaned = cleanup_pdf_text(
            "  Skatt p\u{00E5} \u{FB01}nans\u{2013}sektoren\0 \n\n  \u{201C}Ja\u{201D}  ",
        );
        assert_eq!(cleaned, "Skatt på finans-sektoren\n\"Ja\"");
    }

    #[test]
    fn test_pdf_pages_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("program.pdf");
        write_pdf(&path, &["Forste side", "Andre side", "Tredje side"]);

        let pages = DocumentLoader::load_file(&path).unwrap();
        let numbers: Vec<u32> = pages.iter().map(|p| p.page_number).collect();

        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(pages.iter().all(|p| p.source_path == path.display().to_string()));
    }

    #[test]
    fn test_text_file_pages_split_on_form_feed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("program.txt");
        std::fs::write(&path, "Side en.\u{000C}Side to.\n").unwrap();

        let pages = DocumentLoader::load_file(&path).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0], DocumentPage::new(path.display().to_string(), 1, "Side en."));
        assert_eq!(pages[1].text, "Side to.");
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let result = DocumentLoader::load_file(Path::new("/nonexistent/program.pdf"));
        assert!(matches!(result, Err(Error::Load { .. })));
    }

    #[test]
    fn test_corrupt_pdf_is_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        assert!(matches!(
            DocumentLoader::load_file(&path),
            Err(Error::Load { .. })
        ));
    }

    #[test]
    fn test_abort_policy_fails_batch() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("a.txt");
        std::fs::write(&good, "Partiet vil senke skatten.").unwrap();
        let missing = dir.path().join("missing.txt");

        let loader = DocumentLoader::new(LoadFailurePolicy::Abort);
        let result = loader.load(&[good, missing]);
        assert!(matches!(result, Err(Error::Load { .. })));
    }

    #[test]
    fn test_skip_policy_keeps_remaining_documents_in_order() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a.txt");
        let second = dir.path().join("b.md");
        std::fs::write(&first, "Første program.").unwrap();
        std::fs::write(&second, "Andre program.").unwrap();
        let missing = dir.path().join("missing.pdf");

        let loader = DocumentLoader::new(LoadFailurePolicy::Skip);
        let pages = loader
            .load(&[first.clone(), missing, second.clone()])
            .unwrap();

        let sources: Vec<_> = pages.iter().map(|p| p.source_path.clone()).collect();
        assert_eq!(
            sources,
            vec![first.display().to_string(), second.display().to_string()]
        );
    }

    #[test]
    fn test_skip_policy_still_fails_when_nothing_loads() {
        let loader = DocumentLoader::new(LoadFailurePolicy::Skip);
        let result = loader.load(&[PathBuf::from("/nonexistent/a.pdf")]);
        assert!(matches!(result, Err(Error::Load { .. })));
    }

    #[test]
    fn test_content_stream_fallback() {
        let stream = b"BT\n/F1 12 Tf\n(Velferd \\(NAV\\)) Tj\nET\n";
        assert_eq!(extract_text_from_content(stream), "Velferd (NAV)\n");
    }
}
