//! Fixed topic and suggestion catalog

/// Subjects offered in the sidebar
pub const TOPICS: [&str; 6] = [
    "Algebra & Calculus",
    "Physics & Mechanics",
    "World History",
    "Computer Science",
    "Chemistry",
    "Critical Writing",
];

/// Starter problems offered on the welcome view
pub const INITIAL_SUGGESTIONS: [&str; 4] = [
    "Solve for x in $2x + 5 = 15$",
    "Explain the significance of the Magna Carta",
    "How do I write a binary search algorithm?",
    "Calculate the force of gravity between two objects",
];

/// Text actually sent when a suggestion is picked: math delimiters removed
pub fn suggestion_text(suggestion: &str) -> String {
    suggestion.replace('$', "")
}

/// Suggestion by zero-based index, ready to send
pub fn suggestion(index: usize) -> Option<String> {
    INITIAL_SUGGESTIONS.get(index).map(|s| suggestion_text(s))
}

pub fn topic(index: usize) -> Option<&'static str> {
    TOPICS.get(index).copied()
}
