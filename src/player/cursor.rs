//! Index arithmetic for cursors over ordered lists.

/// Index after `cursor`, wrapping to the head. From "nothing selected" the
/// head is next. `None` only for an empty list.
pub fn next_index(cursor: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match cursor {
        Some(i) if i < len => (i + 1) % len,
        _ => 0,
    })
}

/// Index before `cursor`, wrapping to the tail. From "nothing selected" the
/// tail is previous. `None` only for an empty list.
pub fn previous_index(cursor: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match cursor {
        Some(i) if i > 0 && i < len => i - 1,
        _ => len - 1,
    })
}

/// Where a cursor ends up after the item at `removed` is taken out.
///
/// Removing the current item clears the cursor. Removing an earlier item
/// shifts it down by one so it keeps pointing at the same item.
pub fn after_removal(cursor: Option<usize>, removed: usize) -> Option<usize> {
    match cursor {
        Some(c) if c == removed => None,
        Some(c) if removed < c => Some(c - 1),
        other => other,
    }
}
