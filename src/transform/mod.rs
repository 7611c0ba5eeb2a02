//! Pure file name transformations used by the naming strategies.

use once_cell::sync::Lazy;
use regex::Regex;

// Anything outside [A-Za-z0-9_.] becomes an underscore
static DISALLOWED_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.]").unwrap());

static UNDERSCORE_RUN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{2,}").unwrap());

/// Split a file name into `(stem, extension)`.
///
/// The extension is the final `.xxx` segment including its dot. A dot in
/// first position does not start an extension, so `.bashrc` has none.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Canonicalize a file name.
///
/// Disallowed characters in the stem are replaced with `_`, underscore runs
/// collapse to one, and leading/trailing underscores are stripped. The
/// extension is reattached byte-for-byte. A name whose stem would come out
/// empty is returned unchanged (see [`cleaned_stem_is_empty`]).
pub fn clean_name(name: &str) -> String {
    let (stem, ext) = split_extension(name);

    let replaced = DISALLOWED_REGEX.replace_all(stem, "_");
    let collapsed = UNDERSCORE_RUN_REGEX.replace_all(&replaced, "_");
    let trimmed = collapsed.trim_matches('_');

    if trimmed.is_empty() {
        return name.to_string();
    }

    format!("{}{}", trimmed, ext)
}

/// True when cleaning `name` would leave nothing of its stem.
pub fn cleaned_stem_is_empty(name: &str) -> bool {
    let (stem, _) = split_extension(name);
    let replaced = DISALLOWED_REGEX.replace_all(stem, "_");
    replaced.trim_matches('_').is_empty()
}

/// Prefix `name` with `index` zero-padded to at least `digits` digits.
///
/// Indexes wider than `digits` are written in full, never truncated.
pub fn number_name(name: &str, digits: usize, index: usize) -> String {
    format!("{:0width$}_{}", index, name, width = digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("photo.jpg"), ("photo", ".jpg"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
        assert_eq!(split_extension("trailing."), ("trailing", "."));
    }

    #[test]
    fn test_clean_scenario_names() {
        assert_eq!(clean_name("IMG 2023 01 01.JPG"), "IMG_2023_01_01.JPG");
        assert_eq!(clean_name("_MyFile__.txt"), "MyFile.txt");
        assert_eq!(clean_name("Special$$File!.docx"), "Special_File.docx");
    }

    #[test]
    fn test_clean_keeps_dots_in_stem() {
        assert_eq!(clean_name("v1.2 final.tar.gz"), "v1.2_final.tar.gz");
    }

    #[test]
    fn test_clean_replaces_non_ascii_per_character() {
        assert_eq!(clean_name("café crème.txt"), "caf_cr_me.txt");
        assert_eq!(clean_name("写真.png"), "写真.png");
        assert!(cleaned_stem_is_empty("写真.png"));
    }

    #[test]
    fn test_clean_extension_is_untouched() {
        assert_eq!(clean_name("my file.T X T"), "my_file.T X T");
    }

    #[test]
    fn test_clean_without_extension() {
        assert_eq!(clean_name("  hello  world  "), "hello_world");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let inputs = [
            "IMG 2023 01 01.JPG",
            "_MyFile__.txt",
            "Special$$File!.docx",
            "__.a.b",
            "_.txt",
            "_..",
            "x_.",
            ".hidden file",
            "a-b-c",
            "",
            "$$$",
            "$.a b",
            "résumé (final) [v2].pdf",
        ];

        for input in inputs {
            let once = clean_name(input);
            assert_eq!(clean_name(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_clean_preserves_extension() {
        for input in ["a b.JPG", "x$y.tar.gz", "__.md", "name.with space"] {
            let (_, ext) = split_extension(input);
            assert!(clean_name(input).ends_with(ext), "input: {:?}", input);
        }
    }

    #[test]
    fn test_clean_leaves_names_with_empty_stem_alone() {
        assert_eq!(clean_name("$.a b"), "$.a b");
        assert_eq!(clean_name("___.txt"), "___.txt");
        assert_eq!(clean_name("$$$"), "$$$");
    }

    #[test]
    fn test_cleaned_stem_is_empty() {
        assert!(cleaned_stem_is_empty("$$$"));
        assert!(cleaned_stem_is_empty("___.txt"));
        assert!(cleaned_stem_is_empty(""));
        assert!(!cleaned_stem_is_empty("a$.txt"));
        assert!(!cleaned_stem_is_empty(".bashrc"));
    }

    #[test]
    fn test_number_name_padding() {
        assert_eq!(number_name("a.txt", 3, 1), "001_a.txt");
        assert_eq!(number_name("x.txt", 2, 12), "12_x.txt");
        assert_eq!(number_name("README", 4, 7), "0007_README");
    }

    #[test]
    fn test_number_name_exact_width() {
        for digits in 1..=5 {
            for index in [0usize, 1, 9, 10usize.pow(digits as u32) - 1] {
                let name = number_name("f.txt", digits, index);
                let prefix = name.split('_').next().unwrap();
                assert_eq!(prefix.len(), digits);
                assert!(prefix.chars().all(|c| c.is_ascii_digit()));
            }
        }
    }

    #[test]
    fn test_number_name_never_truncates() {
        assert_eq!(number_name("a.txt", 2, 1234), "1234_a.txt");
    }
}
