//! Property-based tests for iCalendar text handling

use integration_caldav::ics::{escape_text, fold_line, unescape_text, unfold_document};
use proptest::prelude::*;

proptest! {
    #[test]
    fn folded_lines_respect_octet_limit(text in "[a-zA-Zäöü€😀 ,;]{0,400}", limit in 20usize..120) {
        let line = format!("SUMMARY:{text}");
        let folded = fold_line(&line, limit);
        for (idx, part) in folded.split("\r\n").enumerate() {
            prop_assert!(part.len() <= limit);
            if idx > 0 {
                prop_assert!(part.starts_with(' '));
            }
        }
    }

    #[test]
    fn unfolding_restores_folded_line(text in "[a-zA-Z0-9äöü€ ]{0,300}") {
        let line = format!("DESCRIPTION:{text}");
        let unfolded = unfold_document(&fold_line(&line, 75));
        prop_assert_eq!(unfolded, format!("{line}\r\n"));
    }

    #[test]
    fn escaped_text_unescapes_to_original(text in r"[a-z\\;,\n ]{0,80}") {
        prop_assert_eq!(unescape_text(&escape_text(&text)), text);
    }
}
