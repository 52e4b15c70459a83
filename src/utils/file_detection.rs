//! Extension handling and file-type lookups used by the analyzer and sources.

/// Extensions whose content is read when the file is below the content ceiling.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".js", ".jsx", ".ts", ".tsx", ".py", ".java", ".cpp", ".c", ".h", ".css", ".scss", ".html",
    ".xml", ".json", ".md", ".txt", ".php", ".rb", ".go", ".rs", ".swift", ".kt", ".dart", ".vue",
    ".svelte",
];

/// Plain-text extensions that are always read while small.
const SMALL_TEXT_EXTENSIONS: &[&str] = &[".bat", ".cmd", ".sh", ".ps1", ".gitignore", ".env", ".sql"];

/// Returns the extension of `file_name` including the leading dot.
///
/// A dot in first position does not start an extension, so `.gitignore`
/// yields an empty string while `app.test.js` yields `.js`. The result is
/// case-preserving.
pub fn file_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[idx..],
        _ => "",
    }
}

/// `true` if the extension belongs to the supported source/text set.
pub fn is_supported_extension(extension: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension)
}

/// `true` if the extension belongs to the small plain-text allow-list.
pub fn is_small_text_extension(extension: &str) -> bool {
    SMALL_TEXT_EXTENSIONS.contains(&extension)
}

/// Guesses a MIME type from the file name, defaulting to `text/plain`.
pub fn mime_type_for(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or("text/plain")
        .to_string()
}
