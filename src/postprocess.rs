//! Deterministic cleanup of generated title candidates
//!
//! Backends hand back free-form text that may carry wrapping quotes, trailing
//! periods or a repeated ticket prefix. `process` normalizes all of that into
//! a final title and is idempotent: running it on its own output changes
//! nothing.

/// Normalize a raw title candidate into the final title.
///
/// Steps, in order: strip wrapping quotes/backticks, collapse whitespace,
/// strip trailing sentence punctuation, capitalize the first letter,
/// re-apply the ticket prefix when missing, truncate at a word boundary to
/// `max_length` (no ellipsis).
pub fn process(candidate: &str, ticket: Option<&str>, max_length: usize) -> String {
    // Quote pairs and trailing punctuation can nest ("Fix thing". ), so both
    // strips run to a fixpoint.
    let mut title = candidate.trim().to_string();
    loop {
        let stripped = strip_wrapping_quotes(&title)
            .trim_end_matches(['.', '!', '?'])
            .trim()
            .to_string();
        if stripped == title {
            break;
        }
        title = stripped;
    }

    // Collapse internal whitespace runs.
    title = title.split_whitespace().collect::<Vec<_>>().join(" ");

    title = capitalize_first(&title);

    if let Some(ticket) = ticket {
        title = inject_ticket(&title, ticket);
    }

    if title.chars().count() > max_length {
        title = truncate_at_word_boundary(&title, max_length);

        // Truncation may have dropped a mid-title ticket mention; re-inject
        // at the front, where the cut cannot reach it, and cut again.
        if let Some(ticket) = ticket {
            if !contains_ignore_case(&title, ticket) {
                title = inject_ticket(&title, ticket);
                if title.chars().count() > max_length {
                    title = truncate_at_word_boundary(&title, max_length);
                }
            }
        }
    }

    title
}

/// Prepend `"<ticket>: "` unless the title already mentions the ticket
/// (case-insensitive).
fn inject_ticket(title: &str, ticket: &str) -> String {
    if contains_ignore_case(title, ticket) {
        title.to_string()
    } else if title.is_empty() {
        ticket.to_string()
    } else {
        format!("{}: {}", ticket, title)
    }
}

/// Strip matched wrapping quote/backtick pairs, repeatedly.
fn strip_wrapping_quotes(text: &str) -> &str {
    let mut current = text;
    loop {
        let stripped = current
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .or_else(|| current.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')))
            .or_else(|| current.strip_prefix('`').and_then(|t| t.strip_suffix('`')));
        match stripped {
            Some(inner) if !inner.is_empty() => current = inner.trim(),
            _ => return current,
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Uppercase the first letter, leaving the rest of the casing alone so proper
/// nouns and identifiers survive.
fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Cut to at most `max_length` characters without ever splitting a word, then
/// drop any separator punctuation the cut left dangling.
fn truncate_at_word_boundary(title: &str, max_length: usize) -> String {
    let boundary = title
        .char_indices()
        .nth(max_length)
        .map(|(i, _)| i)
        .unwrap_or(title.len());
    let head = &title[..boundary];

    let cut = if boundary == title.len() || title[boundary..].starts_with(' ') {
        head
    } else {
        match head.rfind(' ') {
            Some(pos) => &head[..pos],
            // The first word alone exceeds the budget; an empty cut is the
            // only result that does not emit a word fragment.
            None => "",
        }
    };
    // Also sentence punctuation: the cut may end on a word like "etc." and
    // the final title never carries trailing punctuation.
    cut.trim_end_matches([' ', ',', ';', ':', '-', '.', '!', '?'])
        .to_string()
}
