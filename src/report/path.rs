//! Bounded-width file names for table cells

pub const DEFAULT_MAX_PATH_LEN: usize = 50;

const ELLIPSIS: &str = "..";

/// Shorten `path` to at most `max_len` characters by dropping leading
/// directories and marking the cut with `..`.
///
/// The file name is always kept, so a single segment longer than the
/// budget comes back whole.
pub fn shorten_path(path: &str, max_len: usize) -> String {
    let segments: Vec<&str> = path.split(['/', '\\']).collect();

    if segments.len() == 1 {
        return path.to_string();
    }

    if char_len(&segments.join("/")) <= max_len {
        return segments.join("/");
    }

    // Deepest first; the marker and its separator count against the budget.
    let mut reversed = segments.iter().rev();
    let Some(file_name) = reversed.next() else {
        return path.to_string();
    };

    let mut kept = vec![*file_name];
    let mut used = char_len(file_name) + ELLIPSIS.len() + 1;

    for segment in reversed {
        let cost = char_len(segment) + 1;
        if used + cost > max_len {
            break;
        }
        used += cost;
        kept.push(segment);
    }

    kept.push(ELLIPSIS);
    kept.reverse();
    kept.join("/")
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
