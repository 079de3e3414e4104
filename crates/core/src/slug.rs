//! URL slugs derived from survey titles.

use std::sync::LazyLock;

use regex::Regex;

/// Slug used when a title has no letters or digits at all.
pub const FALLBACK_SLUG: &str = "survey";

/// Longest slug produced before a uniqueness suffix is added.
pub const MAX_SLUG_LEN: usize = 200;

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("valid regex"));

/// Turn a title into a lowercase, dash-separated slug.
///
/// # Examples
///
/// ```
/// use websurvey_core::slug::slugify;
///
/// assert_eq!(slugify("Q1 Feedback"), "q1-feedback");
/// assert_eq!(slugify("  What's next?!  "), "what-s-next");
/// assert_eq!(slugify("***"), "survey");
/// ```
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let dashed = NON_WORD_RE.replace_all(&lowered, "-");
    let mut slug: String = dashed.trim_matches('-').chars().take(MAX_SLUG_LEN).collect();
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// The `n`-th candidate for a unique slug: `base`, `base-2`, `base-3`, ...
pub fn candidate(base: &str, n: u32) -> String {
    if n <= 1 {
        base.to_string()
    } else {
        format!("{base}-{n}")
    }
}
