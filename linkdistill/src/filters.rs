/// This module decides which walked files are fed to the extractor.
///
/// A candidate is a regular file whose name ends with the configured suffix
/// (`.log` by default) and that no ignore pattern excludes. The file type check
/// happens in the engine where the walker's `DirEntry` is available; the
/// functions here only look at the path.
use glob::Pattern;
use std::path::Path;

/// Checks if the file name ends with the given suffix
pub fn has_log_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(suffix))
        .unwrap_or(false)
}

/// Checks if a file should be ignored based on glob ignore patterns
pub fn should_ignore(path: &Path, ignore_patterns: &[Pattern]) -> bool {
    if ignore_patterns.is_empty() {
        return false;
    }

    let normalized_path = path.to_string_lossy().replace('\\', "/");
    ignore_patterns.iter().any(|p| p.matches(&normalized_path))
}

/// Compiles ignore patterns, reporting the first invalid one
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>, glob::PatternError> {
    patterns.iter().map(|p| Pattern::new(p)).collect()
}

/// Determines if a file should be handed to the extractor
pub fn is_candidate(path: &Path, suffix: &str, ignore_patterns: &[Pattern]) -> bool {
    has_log_suffix(path, suffix) && !should_ignore(path, ignore_patterns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_log_suffix() {
        assert!(has_log_suffix(Path::new("pass/foo_1.0-1.log"), ".log"));
        assert!(has_log_suffix(Path::new("/srv/logs/fail/bar_2.3.log"), ".log"));
        assert!(has_log_suffix(Path::new(".log"), ".log"));

        assert!(!has_log_suffix(Path::new("foo_1.0-1.log.gz"), ".log"));
        assert!(!has_log_suffix(Path::new("foo.LOG"), ".log")); // Suffix is case sensitive
        assert!(!has_log_suffix(Path::new("logs"), ".log"));
        assert!(!has_log_suffix(Path::new("/"), ".log"));
    }

    #[test]
    fn test_should_ignore() {
        let ignore_patterns = compile_patterns(&[
            "**/bts/*".to_string(),
            "**/reserved/**".to_string(),
            "**/*-dbgsym_*.log".to_string(),
        ])
        .unwrap();

        // Should ignore
        assert!(should_ignore(Path::new("logs/bts/foo.log"), &ignore_patterns));
        assert!(should_ignore(
            Path::new("srv/logs/reserved/a/b.log"),
            &ignore_patterns
        ));
        assert!(should_ignore(
            Path::new("pass/foo-dbgsym_1.0.log"),
            &ignore_patterns
        ));

        // Should not ignore
        assert!(!should_ignore(Path::new("logs/pass/foo.log"), &ignore_patterns));
        assert!(!should_ignore(Path::new("logs/btsx/foo.log"), &ignore_patterns));
        assert!(!should_ignore(Path::new("logs/pass/foo.log"), &[]));
    }

    #[test]
    fn test_compile_patterns_rejects_invalid() {
        assert!(compile_patterns(&["**/ok/*".to_string()]).is_ok());
        assert!(compile_patterns(&["[unclosed".to_string()]).is_err());
    }

    #[test]
    fn test_is_candidate() {
        let ignore_patterns = compile_patterns(&["**/fail/*".to_string()]).unwrap();

        assert!(is_candidate(
            Path::new("logs/pass/foo.log"),
            ".log",
            &ignore_patterns
        ));

        // Wrong suffix
        assert!(!is_candidate(
            Path::new("logs/pass/foo.txt"),
            ".log",
            &ignore_patterns
        ));

        // Matches ignore pattern
        assert!(!is_candidate(
            Path::new("logs/fail/foo.log"),
            ".log",
            &ignore_patterns
        ));

        // Custom suffix
        assert!(is_candidate(
            Path::new("logs/pass/foo.txt"),
            ".txt",
            &ignore_patterns
        ));
    }
}
