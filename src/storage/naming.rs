//! Entry name validation and collision-free name probing

use super::filesystem::FilesystemError;

/// Upper bound on `(n)` candidates tried before giving up
pub const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// Check that `name` is a single, ordinary path segment
pub fn validate_name(name: &str) -> Result<&str, FilesystemError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if invalid {
        return Err(FilesystemError::InvalidName(name.to_string()));
    }
    Ok(name)
}

/// Split a file name into stem and extension (`archive.tar.gz` -> `archive.tar`, `gz`).
/// Dot-files and names ending in a dot have no extension.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < name.len() => (&name[..pos], Some(&name[pos + 1..])),
        _ => (name, None),
    }
}

/// Drop a trailing `(n)` counter from a stem
pub fn strip_copy_suffix(stem: &str) -> &str {
    let Some(inner) = stem.strip_suffix(')') else {
        return stem;
    };
    let Some(open) = inner.rfind('(') else {
        return stem;
    };

    let digits = &inner[open + 1..];
    if open == 0 || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return stem;
    }
    &inner[..open]
}

/// Build `stem(n).ext`
pub fn numbered_name(stem: &str, n: u32, ext: Option<&str>) -> String {
    match ext {
        Some(ext) => format!("{}({}).{}", stem, n, ext),
        None => format!("{}({})", stem, n),
    }
}

/// Find a name that `taken` reports as free.
///
/// With `keep_original` the name itself is tried first. Otherwise (and after
/// it) any `(n)` counter is stripped from the stem and `(1)`, `(2)`, ... are
/// tried with the original extension. Returns `None` once
/// [`MAX_NAME_ATTEMPTS`] candidates are exhausted.
pub fn free_name<F>(
    name: &str,
    keep_original: bool,
    mut taken: F,
) -> Result<Option<String>, FilesystemError>
where
    F: FnMut(&str) -> Result<bool, FilesystemError>,
{
    if keep_original && !taken(name)? {
        return Ok(Some(name.to_string()));
    }

    let (stem, ext) = split_extension(name);
    let base = strip_copy_suffix(stem);

    for n in 1..=MAX_NAME_ATTEMPTS {
        let candidate = numbered_name(base, n, ext);
        if !taken(&candidate)? {
            return Ok(Some(candidate));
        }
    }

    log::warn!("No free name found for '{}' after {} attempts", name, MAX_NAME_ATTEMPTS);
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("notes.txt").is_ok());
        assert!(validate_name(".hidden").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a\\b").is_err());
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("photo.jpg"), ("photo", Some("jpg")));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", Some("gz")));
        assert_eq!(split_extension(".bashrc"), (".bashrc", None));
        assert_eq!(split_extension("README"), ("README", None));
        assert_eq!(split_extension("trailing."), ("trailing.", None));
    }

    #[test]
    fn test_strip_copy_suffix() {
        assert_eq!(strip_copy_suffix("photo(3)"), "photo");
        assert_eq!(strip_copy_suffix("photo"), "photo");
        assert_eq!(strip_copy_suffix("(3)"), "(3)");
        assert_eq!(strip_copy_suffix("v(2)(7)"), "v(2)");
    }

    #[test]
    fn test_free_name_skips_existing() {
        let existing = set(&["photo.jpg", "photo(1).jpg"]);
        let name = free_name("photo.jpg", false, |n| Ok(existing.contains(n))).unwrap();
        assert_eq!(name.as_deref(), Some("photo(2).jpg"));
    }

    #[test]
    fn test_free_name_restarts_from_stripped_base() {
        let existing = set(&["photo(3).jpg"]);
        let name = free_name("photo(3).jpg", false, |n| Ok(existing.contains(n))).unwrap();
        assert_eq!(name.as_deref(), Some("photo(1).jpg"));
    }

    #[test]
    fn test_free_name_keeps_original_when_free() {
        let name = free_name("new.txt", true, |_| Ok(false)).unwrap();
        assert_eq!(name.as_deref(), Some("new.txt"));

        let existing = set(&["new.txt"]);
        let name = free_name("new.txt", true, |n| Ok(existing.contains(n))).unwrap();
        assert_eq!(name.as_deref(), Some("new(1).txt"));
    }

    #[test]
    fn test_free_name_exhausted() {
        let name = free_name("x", false, |_| Ok(true)).unwrap();
        assert!(name.is_none());
    }
}
