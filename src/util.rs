pub fn short_text(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_owned();
    }

    let mut shortened = trimmed
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    shortened.push('…');
    shortened
}

pub fn format_score(value: f32) -> String {
    if value.is_finite() {
        format!("{value:+.2}")
    } else {
        "n/a".to_owned()
    }
}
