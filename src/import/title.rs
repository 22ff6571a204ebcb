//! Title derivation from file names

/// Strip the last extension from a file name
///
/// Only a final `.ext` with at least one character is removed, so
/// `"a.b.md"` gives `"a.b"`, `".md"` gives `""` and `"draft."` is unchanged.
/// An extension never contains a `/`.
pub fn derive_title(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot + 1 < file_name.len() && !file_name[dot + 1..].contains('/') => {
            &file_name[..dot]
        }
        _ => file_name,
    }
}

/// `None` when the file must be skipped for lack of a usable title
pub fn usable_title(file_name: &str) -> Option<&str> {
    let title = derive_title(file_name);
    if title.trim().is_empty() {
        None
    } else {
        Some(title)
    }
}
