//! Naming of companion files (label ↔ table).

/// Replaces the suffix of a URL or path, keeping query and fragment.
///
/// Index files on PDS servers are sometimes named in upper case; the new
/// suffix follows the case of the old one.
pub fn replace_url_suffix(url: &str, new_suffix: &str) -> String {
    let path_end = url.find(|c| c == '?' || c == '#').unwrap_or(url.len());
    let (path, rest) = url.split_at(path_end);

    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    let stem_end = match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => name_start + dot,
        _ => path.len(),
    };
    let old_suffix = &path[stem_end..];

    let is_upper = old_suffix.chars().any(|c| c.is_ascii_alphabetic())
        && !old_suffix.chars().any(|c| c.is_ascii_lowercase());
    let suffix = if is_upper {
        new_suffix.to_ascii_uppercase()
    } else {
        new_suffix.to_string()
    };

    format!("{}{}{}", &path[..stem_end], suffix, rest)
}
