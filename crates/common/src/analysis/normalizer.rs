//! Brand name canonicalization
//!
//! Produces the comparison form used by every fuzzy match in the engine:
//! lower-cased, corporate-entity suffixes removed, punctuation stripped,
//! whitespace collapsed.

/// Corporate-entity suffixes removed as whole words
pub const CORPORATE_SUFFIXES: &[&str] = &[
    "inc",
    "llc",
    "pvt",
    "ltd",
    "limited",
    "corp",
    "corporation",
    "company",
    "co",
    "gmbh",
    "pty",
];

fn is_suffix(word: &str) -> bool {
    CORPORATE_SUFFIXES.contains(&word)
}

/// Canonicalize a brand name (or any text) for comparison.
///
/// `normalize(normalize(x)) == normalize(x)` holds for every input.
pub fn normalize(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    let lowered = name.to_lowercase();
    let without_suffixes = strip_suffix_words(&lowered);

    let stripped: String = without_suffixes
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    // Removing punctuation can fuse a token like "c.o" into a suffix word;
    // drop those too so the result is a fixed point.
    stripped
        .split_whitespace()
        .filter(|word| !is_suffix(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove suffix words delimited by non-alphanumeric characters, together
/// with one trailing period.
fn strip_suffix_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if !c.is_alphanumeric() {
            out.push(c);
            continue;
        }

        let mut end = start + c.len_utf8();
        while let Some(&(idx, next)) = chars.peek() {
            if !next.is_alphanumeric() {
                break;
            }
            end = idx + next.len_utf8();
            chars.next();
        }

        let word = &text[start..end];
        if is_suffix(word) {
            if let Some(&(_, '.')) = chars.peek() {
                chars.next();
            }
        } else {
            out.push_str(word);
        }
    }

    out
}
