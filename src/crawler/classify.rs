//! Language label to file extension mapping

/// Extension used for languages missing from the table
pub const DEFAULT_EXTENSION: &str = "c";

/// Known language labels as shown on solution pages
const LANGUAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("C", "c"),
    ("C++14", "cpp"),
    ("C++17", "cpp"),
    ("C++20", "cpp"),
    ("PYTH 3", "py"),
    ("PYPY3", "py"),
    ("JAVA", "java"),
];

/// File extension for a language label
///
/// Unknown labels fall back to [`DEFAULT_EXTENSION`] rather than failing.
pub fn language_extension(label: &str) -> &'static str {
    let label = label.trim();
    LANGUAGE_EXTENSIONS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, ext)| *ext)
        .unwrap_or(DEFAULT_EXTENSION)
}
