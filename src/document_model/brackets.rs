//! Bracket pairing over plain text. Offsets are byte offsets.

fn is_opening(ch: char) -> bool {
    matches!(ch, '(' | '[' | '{' | '<')
}

fn partner(ch: char) -> Option<char> {
    match ch {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '<' => Some('>'),
        ')' => Some('('),
        ']' => Some('['),
        '}' => Some('{'),
        '>' => Some('<'),
        _ => None,
    }
}

/// Offset of the bracket paired with the one just before `cursor`.
///
/// At the start of the text the character at `cursor` itself is used. Only
/// brackets of the same kind affect the nesting count.
pub fn matching_bracket(text: &str, cursor: usize) -> Option<usize> {
    let (at, ch) = if cursor == 0 {
        text.chars().next().map(|ch| (0, ch))?
    } else {
        text.get(..cursor)?.char_indices().next_back()?
    };
    let target = partner(ch)?;
    let mut level = 1usize;

    if is_opening(ch) {
        for (offset, c) in text[at + ch.len_utf8()..].char_indices() {
            if c == ch {
                level += 1;
            } else if c == target {
                level -= 1;
                if level == 0 {
                    return Some(at + ch.len_utf8() + offset);
                }
            }
        }
    } else {
        for (offset, c) in text[..at].char_indices().rev() {
            if c == ch {
                level += 1;
            } else if c == target {
                level -= 1;
                if level == 0 {
                    return Some(offset);
                }
            }
        }
    }
    None
}

/// Nesting level of every `()[]{}` character, as `(offset, level)`.
///
/// Openers report the level they open; closers report the level they close.
pub fn bracket_depths(text: &str) -> Vec<(usize, usize)> {
    let mut depths = Vec::new();
    let mut level = 0usize;
    for (offset, ch) in text.char_indices() {
        match ch {
            '(' | '[' | '{' => {
                level += 1;
                depths.push((offset, level));
            }
            ')' | ']' | '}' => {
                depths.push((offset, level));
                level = level.saturating_sub(1);
            }
            _ => {}
        }
    }
    depths
}
