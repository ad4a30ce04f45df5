//! Recursive directory-listing parser
//!
//! `ls -R` on Android emits a flat text stream: a directory header line
//! ending in `:`, then the names inside that directory, whitespace
//! separated, possibly several per line. This module turns that stream back
//! into absolute paths.
//!
//! The parser is deliberately lenient. Shell output is uncontrolled, so a
//! line that fits neither shape is treated as filenames in the current
//! directory rather than an error. A filename containing spaces therefore
//! splits into several bogus entries; those simply fail to pull later and
//! are skipped.

/// Parse recursive listing text into absolute remote file paths.
///
/// `root` seeds the current-directory cursor and applies to any names seen
/// before the first directory header.
///
/// Rules, in order per line:
/// - blank lines are skipped;
/// - a line ending in `:` replaces the cursor with the header (a leading
///   `/` is prefixed if the header lacks one);
/// - anything else is split on whitespace, each token yielding
///   `{cursor}/{token}`.
pub fn parse_recursive_listing(root: &str, text: &str) -> Vec<String> {
    let mut current_dir = root.to_string();
    let mut paths = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_suffix(':') {
            let header = header.trim();
            current_dir = if header.starts_with('/') {
                header.to_string()
            } else {
                format!("/{}", header)
            };
            continue;
        }

        for token in line.split_whitespace() {
            paths.push(format!("{}/{}", current_dir, token));
        }
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_follow_most_recent_header() {
        let text = "/sdcard/DCIM:\nimg1.jpg img2.png\n/sdcard/DCIM/Camera:\nvid1.mp4";
        let paths = parse_recursive_listing("/sdcard", text);
        assert_eq!(
            paths,
            vec![
                "/sdcard/DCIM/img1.jpg",
                "/sdcard/DCIM/img2.png",
                "/sdcard/DCIM/Camera/vid1.mp4",
            ]
        );
    }

    #[test]
    fn test_root_applies_before_first_header() {
        let text = "stray.txt\n/sdcard/Download:\nfile.pdf";
        let paths = parse_recursive_listing("/sdcard", text);
        assert_eq!(paths, vec!["/sdcard/stray.txt", "/sdcard/Download/file.pdf"]);
    }

    #[test]
    fn test_header_without_leading_slash_is_prefixed() {
        let text = "sdcard/Music:\nsong.mp3";
        let paths = parse_recursive_listing("/sdcard", text);
        assert_eq!(paths, vec!["/sdcard/Music/song.mp3"]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let text = "/sdcard/DCIM:\n\n\nimg.jpg\n\n";
        let paths = parse_recursive_listing("/sdcard", text);
        assert_eq!(paths, vec!["/sdcard/DCIM/img.jpg"]);
    }

    #[test]
    fn test_multiple_names_per_line() {
        let text = "/sdcard/Download:\na.pdf b.txt c.zip";
        let paths = parse_recursive_listing("/sdcard", text);
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[2], "/sdcard/Download/c.zip");
    }

    #[test]
    fn test_malformed_lines_are_treated_as_filenames() {
        // Lenient by design: an ls error message becomes bogus filenames,
        // never a parse failure.
        let text = "/sdcard/DCIM:\nls: ./secret: Permission denied";
        let paths = parse_recursive_listing("/sdcard", text);
        assert_eq!(
            paths,
            vec![
                "/sdcard/DCIM/ls:",
                "/sdcard/DCIM/./secret:",
                "/sdcard/DCIM/Permission",
                "/sdcard/DCIM/denied",
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_recursive_listing("/sdcard", "").is_empty());
    }
}
