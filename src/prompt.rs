//! Prompt assembly for release-note generation

use crate::types::{NoteItem, SourceType};

const COMMITS_INSTRUCTION: &str = "Given these git commits, generate concise and friendly release notes. \
Use appropriate emojis for different types of changes. Group similar changes together:";

const DIFFS_INSTRUCTION: &str = "Given these git commits and their corresponding diffs, analyze both \
the commit messages and the actual code changes to generate detailed release notes. Use the commit \
messages for context and the diffs to understand the specific changes made. Use appropriate emojis \
for different types of changes. Group similar changes together.";

const FORMAT_INSTRUCTION: &str = "Format the response in markdown.";

/// Build the instruction string sent to the model.
///
/// Items keep their order. For `commits` only messages are used even if an
/// item carries a diff; for `diffs` a missing diff renders as empty.
pub fn build(source_type: SourceType, items: &[NoteItem]) -> String {
    let body = match source_type {
        SourceType::Commits => {
            let messages: Vec<&str> = items.iter().map(|item| item.message.as_str()).collect();
            format!("{COMMITS_INSTRUCTION}\n\n{}", messages.join("\n"))
        }
        SourceType::Diffs => {
            let blocks: Vec<String> = items.iter().map(diff_block).collect();
            format!("{DIFFS_INSTRUCTION}\n\n{}", blocks.join("\n"))
        }
    };

    format!("{body}\n\n{FORMAT_INSTRUCTION}")
}

fn diff_block(item: &NoteItem) -> String {
    format!(
        "Commit Message: {}\n\nCode Changes:\n{}\n---\n",
        item.message,
        item.diff.as_deref().unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commits_prompt_lists_messages_in_order() {
        let items = vec![NoteItem::message("fix: null check"), NoteItem::message("feat: add X")];
        let prompt = build(SourceType::Commits, &items);

        assert!(prompt.starts_with("Given these git commits, generate concise and friendly release notes."));
        assert!(prompt.contains("Group similar changes together:\n\nfix: null check\nfeat: add X"));
        assert!(prompt.ends_with("\n\nFormat the response in markdown."));
    }

    #[test]
    fn test_commits_prompt_never_includes_diffs() {
        let items = vec![NoteItem::with_diff("fix: null check", "+if (x) {")];
        let prompt = build(SourceType::Commits, &items);

        assert!(!prompt.contains("+if (x) {"));
        assert!(!prompt.contains("Code Changes:"));
    }

    #[test]
    fn test_diffs_prompt_builds_blocks() {
        let items = vec![
            NoteItem::with_diff("feat: add X", "+x"),
            NoteItem::with_diff("fix: Y", "-y"),
        ];
        let prompt = build(SourceType::Diffs, &items);

        assert!(prompt.starts_with("Given these git commits and their corresponding diffs"));
        assert!(prompt.contains(
            "Commit Message: feat: add X\n\nCode Changes:\n+x\n---\n\nCommit Message: fix: Y\n\nCode Changes:\n-y\n---\n"
        ));
        assert!(prompt.ends_with("---\n\n\nFormat the response in markdown."));
    }

    #[test]
    fn test_empty_items_still_produce_instructions() {
        let prompt = build(SourceType::Commits, &[]);
        assert!(prompt.contains("Group similar changes together:"));
        assert!(prompt.ends_with("Format the response in markdown."));
    }

    #[test]
    fn test_build_is_deterministic() {
        let items = vec![NoteItem::with_diff("feat: add X", "+x")];
        assert_eq!(build(SourceType::Diffs, &items), build(SourceType::Diffs, &items));
    }
}
