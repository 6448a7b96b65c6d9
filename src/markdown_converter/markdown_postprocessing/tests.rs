//! Tests for the combined Markdown cleanup.

use proptest::prelude::*;

use super::{clean_markdown, post_process};
use crate::config::ConversionOptions;

#[test]
fn test_typical_renderer_output() {
    let rendered = "**\n\n# Title\n\nSome \\- text  \nnext line \n\n\n\n\n●Item\n1. \n\n| a | b |\n| --- | --- |\n| 1 | 2 |\n\n**";
    assert_eq!(
        clean_markdown(rendered),
        "# Title\n\nSome - text  \nnext line\n\n\n- Item\n\n| a | b |\n| --- | --- |\n| 1 | 2 |"
    );
}

#[test]
fn test_rules_expose_each_other() {
    // Dropping the empty item leaves an orphaned opener at the start
    assert_eq!(clean_markdown("1. \n**Title\n\nbody"), "Title\n\nbody");
}

#[test]
fn test_year_paragraph_is_not_a_list_item() {
    assert_eq!(clean_markdown("Founded in\n\n1998."), "Founded in\n\n1998.");
    assert_eq!(clean_markdown("1. first\n2.\n3. third"), "1. first\n3. third");
}

#[test]
fn test_post_process_respects_flags() {
    let md = "![x](a.png)\n\n\n\n\ntext ";

    let off = ConversionOptions::minimal();
    assert_eq!(post_process(md, &off), md);

    let plain = ConversionOptions::plain();
    assert_eq!(post_process(md, &plain), "text");
}

#[test]
fn test_code_blocks_survive() {
    let md = "```\n\\- keep  \n**\n```";
    assert_eq!(clean_markdown(md), md);
}

proptest! {
    #[test]
    fn prop_cleanup_is_idempotent(
        input in prop::collection::vec(
            prop::sample::select(vec!["*", "**", "_", "-", "\\", " ", "  ", "\t", "\n", "a", "1", ".", "●", "`", "#"]),
            0..60,
        ).prop_map(|parts| parts.concat())
    ) {
        let once = clean_markdown(&input);
        let twice = clean_markdown(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_no_trailing_single_space(input in "[a-z \\n]{0,80}") {
        let cleaned = clean_markdown(&input);
        for line in cleaned.lines() {
            let trailing = line.len() - line.trim_end().len();
            prop_assert!(trailing == 0 || trailing == 2, "{:?}", line);
        }
    }
}
