//! Display labels for cost columns

/// Turn a snake-case column name into a display label.
///
/// Separators become spaces, every word is title-cased and a trailing
/// `Costs` is dropped: `child_care_costs` becomes `Child Care`.
#[must_use]
pub fn display_label(column: &str) -> String {
    let mut words: Vec<String> = column
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect();

    if words.len() > 1 && words.last().is_some_and(|w| w == "Costs") {
        words.pop();
    }

    words.join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
