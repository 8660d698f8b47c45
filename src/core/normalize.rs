/// Returns true when the topic has nothing left after trimming. Generation must not run for
/// such input.
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Trims the topic and title-cases every space-separated word.
///
/// Runs of interior spaces are kept as-is (each empty segment survives the split/join) unless
/// `collapse_spaces` is set, in which case they are folded into a single space.
pub fn normalize_topic(raw: &str, collapse_spaces: bool) -> String {
    let trimmed = raw.trim();
    if collapse_spaces {
        trimmed
            .split(' ')
            .filter(|word| !word.is_empty())
            .map(capitalize_word)
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        trimmed
            .split(' ')
            .map(capitalize_word)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}
