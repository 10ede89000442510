//! Line-oriented `key = value` config file reader.
//!
//! Blank lines and lines starting with `#` (after trimming) are skipped.
//! Other lines split on the first `=`, both sides trimmed; lines without
//! `=` or with an empty key are dropped. Entries keep their source line
//! number so later stages can point at the offending line.

use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub line: usize,
    pub key: String,
    pub value: String,
}

/// Parse the text of a config file into ordered entries.
#[must_use]
pub fn parse_entries(content: &str) -> Vec<ConfigEntry> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some(ConfigEntry {
                line: idx + 1,
                key: key.to_string(),
                value: value.trim().to_string(),
            })
        })
        .collect()
}

/// Read and parse a config file. `None` means the file could not be read.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so
/// one bad byte only affects the line it sits on.
pub fn load_entries(path: &Path) -> Option<Vec<ConfigEntry>> {
    let bytes = std::fs::read(path).ok()?;
    Some(parse_entries(&String::from_utf8_lossy(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_blank_lines() {
        let entries = parse_entries("# comment\n\n   \n  # indented comment\nserver.port = 8080\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "server.port");
        assert_eq!(entries[0].value, "8080");
        assert_eq!(entries[0].line, 5);
    }

    #[test]
    fn splits_on_first_equals_only() {
        let entries = parse_entries("proxy.route = /a,h,1\nweird = a=b=c\n");
        assert_eq!(entries[1].key, "weird");
        assert_eq!(entries[1].value, "a=b=c");
    }

    #[test]
    fn drops_empty_keys_and_lines_without_equals() {
        let entries = parse_entries("= value\njust a line\nkey =\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "key");
        assert_eq!(entries[0].value, "");
    }

    #[test]
    fn trims_whitespace_and_crlf() {
        let entries = parse_entries("  server.host\t=  127.0.0.1  \r\n");
        assert_eq!(entries[0].key, "server.host");
        assert_eq!(entries[0].value, "127.0.0.1");
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_entries(&dir.path().join("missing.conf")).is_none());
    }

    #[test]
    fn invalid_utf8_only_affects_its_own_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"# caf\xe9 comment\nserver.port = 8088\nlog.file = edge\xff.log\n",
        )
        .unwrap();

        let entries = load_entries(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "server.port");
        assert_eq!(entries[0].value, "8088");
        assert_eq!(entries[0].line, 2);
        assert_eq!(entries[1].value, "edge\u{fffd}.log");
    }
}
