//! Parsing of `git status --short` output.

use serde::Serialize;

/// One changed file as reported by `git status --short`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    /// XY code with surrounding blanks removed (`M`, `A`, `??`, `RM`, ...).
    pub status: String,
    /// Path of the changed file; the destination for renames.
    pub file: String,
}

/// Parse every non-blank line of short-format status output.
///
/// Lines too short to carry a code and a path are skipped.
pub fn parse_short_status(output: &str) -> Vec<FileStatus> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_status_line)
        .collect()
}

fn parse_status_line(line: &str) -> Option<FileStatus> {
    let code = line.get(..2)?;
    let mut file = line.get(3..)?.trim();
    if file.is_empty() {
        return None;
    }
    if let Some((_, new)) = file.split_once(" -> ") {
        file = new.trim();
    }
    Some(FileStatus {
        status: code.trim().to_string(),
        file: file.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_untracked_line() {
        let files = parse_short_status("?? foo.txt\n");
        assert_eq!(
            files,
            vec![FileStatus {
                status: "??".to_string(),
                file: "foo.txt".to_string()
            }]
        );
    }

    #[test]
    fn parses_modified_line_and_trims_code() {
        let files = parse_short_status(" M src/main.rs");
        assert_eq!(files[0].status, "M");
        assert_eq!(files[0].file, "src/main.rs");
    }

    #[test]
    fn parses_rename_line_uses_new_path() {
        let files = parse_short_status("R  old.txt -> new.txt");
        assert_eq!(files[0].status, "R");
        assert_eq!(files[0].file, "new.txt");
    }

    #[test]
    fn clean_output_has_no_entries() {
        assert!(parse_short_status("").is_empty());
        assert!(parse_short_status("\n\n").is_empty());
    }

    #[test]
    fn skips_malformed_lines() {
        let files = parse_short_status("M\n A b.txt\n");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file, "b.txt");
    }
}
