use notethread_core::models::{Note, NoteLookup};
use notethread_core::thread_index::ThreadTree;

/// Format unix milliseconds as a UTC date-time
pub fn format_timestamp(millis: u64) -> String {
    chrono::DateTime::from_timestamp_millis(millis as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Indented listing, children in index order
pub fn print_tree<L: NoteLookup<Note = Note>>(tree: &ThreadTree, lookup: &L) {
    for (id, level) in tree.display_order() {
        let indent = "  ".repeat(level);
        let title = lookup
            .get_note(id)
            .map(|note| note.title.as_str())
            .filter(|title| !title.is_empty())
            .unwrap_or("(untitled)");
        let replies = tree
            .node(id)
            .map(|node| node.descendant_count)
            .unwrap_or(0);
        if replies > 0 {
            println!("{}{} {} [{}]", indent, id, title, replies);
        } else {
            println!("{}{} {}", indent, id, title);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00");
        assert_eq!(format_timestamp(86_400_000), "1970-01-02 00:00");
    }
}
