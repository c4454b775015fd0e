use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Slug used when a title is missing or has no usable characters.
pub const EMPTY_TITLE_SLUG: &str = "sem-titulo";

/// Turn a title into a URL fragment.
///
/// Lower-cases, strips diacritics (NFD, then drop combining marks), collapses
/// every run of characters outside `[a-z0-9]` into one hyphen and trims
/// hyphens from both ends. Already-slugified input is returned unchanged.
///
/// A title that leaves nothing behind, because it is empty or made only of
/// punctuation, whitespace or non-Latin script, yields [`EMPTY_TITLE_SLUG`].
///
/// ```rust
/// use mapa_search::slugify;
///
/// assert_eq!(slugify("Policlínica Aparecida"), "policlinica-aparecida");
/// assert_eq!(slugify("  Café & Cia.  "), "cafe-cia");
/// assert_eq!(slugify(""), "sem-titulo");
/// assert_eq!(slugify("!!!"), "sem-titulo");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
    {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        EMPTY_TITLE_SLUG.to_string()
    } else {
        slug
    }
}
