//! URL slugs derived from names and titles.

use unicode_normalization::UnicodeNormalization;

/// Turn arbitrary text into a lowercase, hyphen-separated ASCII token.
///
/// Text is NFKD-decomposed and anything left outside ASCII is dropped, which
/// strips diacritics (`"Café"` becomes `"cafe"`). Every run of other ASCII
/// characters becomes a single hyphen, and hyphens never lead or trail.
/// The output is a fixed point: `slugify(&slugify(x)) == slugify(x)`.
///
/// Uniqueness is not guaranteed here; the store rejects collisions.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut separator = false;

    for c in text.nfkd() {
        if c.is_ascii_alphanumeric() {
            if separator && !slug.is_empty() {
                slug.push('-');
            }
            separator = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_ascii() {
            separator = true;
        }
    }

    slug
}
