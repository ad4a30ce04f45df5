//! File categories and the extension classifier
//!
//! Every pulled file belongs to at most one of five fixed categories. A
//! category is defined entirely by its extension set; membership is a
//! case-insensitive suffix test against the lowercased path, not a parsed
//! filesystem extension. That means `archive.tar.gz` matches Archives via
//! its `.gz` suffix. Every entry carries the leading dot, so a name that
//! merely ends in the letters of an extension (e.g. `notazip`) never
//! matches.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Extensions considered photos
const PHOTO_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];

/// Extensions considered documents
const DOCUMENT_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".txt", ".xls", ".xlsx", ".ppt", ".pptx",
];

/// Extensions considered videos
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".avi", ".mov", ".mkv", ".flv", ".wmv"];

/// Extensions considered audio
const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".aac", ".flac", ".ogg", ".m4a"];

/// Extensions considered archives
const ARCHIVE_EXTENSIONS: &[&str] = &[
    ".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz", ".lzh", ".lha", ".ace", ".alz", ".cab",
    ".arj", ".cfs", ".dmg", ".xar", ".zst", ".wim", ".iso", ".shar", ".uue", ".b1", ".kgb", ".afa",
];

/// Semantic bucket a device file can be extracted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Category {
    /// JPEG/PNG still images
    Photos,
    /// Office documents, PDFs, plain text
    Documents,
    /// Video containers
    Videos,
    /// Audio files
    Audio,
    /// Compressed archives and disk images
    Archives,
}

impl Category {
    /// All categories, in classification priority order.
    ///
    /// `classify` returns the first category whose extension set matches.
    /// The fixed tables do not overlap today, so the order only matters if
    /// a future edit introduces a shared suffix.
    pub const ALL: &'static [Category] = &[
        Category::Photos,
        Category::Documents,
        Category::Videos,
        Category::Audio,
        Category::Archives,
    ];

    /// The extension set for this category (all entries lowercase, dotted)
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Photos => PHOTO_EXTENSIONS,
            Category::Documents => DOCUMENT_EXTENSIONS,
            Category::Videos => VIDEO_EXTENSIONS,
            Category::Audio => AUDIO_EXTENSIONS,
            Category::Archives => ARCHIVE_EXTENSIONS,
        }
    }

    /// Display name, also used as the staging subdirectory name
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Photos => "Photos",
            Category::Documents => "Documents",
            Category::Videos => "Videos",
            Category::Audio => "Audio",
            Category::Archives => "Archives",
        }
    }

    /// Check whether a path's lowercase suffix is in this category's set
    pub fn matches(&self, path: &str) -> bool {
        let lower = path.to_lowercase();
        self.extensions().iter().any(|ext| lower.ends_with(ext))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Classify a path into its category, if any.
///
/// First match in [`Category::ALL`] order wins.
pub fn classify(path: &str) -> Option<Category> {
    Category::ALL.iter().copied().find(|c| c.matches(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photos_case_insensitive() {
        assert!(Category::Photos.matches("IMG_0001.JPG"));
        assert!(Category::Photos.matches("/sdcard/DCIM/Camera/pic.jpeg"));
        assert_eq!(classify("IMG_0001.JPG"), Some(Category::Photos));
    }

    #[test]
    fn test_archives_match_trailing_suffix() {
        // Suffix semantics: the .gz suffix alone decides membership
        assert!(Category::Archives.matches("archive.tar.gz"));
        assert_eq!(classify("archive.tar.gz"), Some(Category::Archives));
    }

    #[test]
    fn test_documents() {
        assert_eq!(classify("notes.txt"), Some(Category::Documents));
        assert_eq!(classify("report.PDF"), Some(Category::Documents));
    }

    #[test]
    fn test_unclassified() {
        assert_eq!(classify("data.bin"), None);
        assert_eq!(classify("noextension"), None);
    }

    #[test]
    fn test_leading_dot_prevents_false_positives() {
        // "notazip" ends in "zip" but not ".zip"
        assert!(!Category::Archives.matches("notazip"));
        assert_eq!(classify("notazip"), None);
    }

    #[test]
    fn test_each_path_has_at_most_one_category() {
        let samples = [
            "a.jpg", "b.pdf", "c.mp4", "d.mp3", "e.zip", "f.mov", "g.wav", "h.7z",
        ];
        for path in samples {
            let count = Category::ALL.iter().filter(|c| c.matches(path)).count();
            assert_eq!(count, 1, "expected exactly one category for {}", path);
        }
    }

    #[test]
    fn test_extension_tables_are_dotted_lowercase() {
        for category in Category::ALL {
            for ext in category.extensions() {
                assert!(ext.starts_with('.'), "missing dot: {}", ext);
                assert_eq!(*ext, ext.to_lowercase(), "not lowercase: {}", ext);
            }
        }
    }
}
