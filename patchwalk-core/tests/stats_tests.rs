// Tests for diffstat output parsing

use patchwalk_core::stats::{DIFFSTAT_HEADER, PatchStats, parse_diffstat};
use patchwalk_scanner::ScanError;

fn parse_error_message(raw: &str) -> String {
    match parse_diffstat(raw) {
        Err(ScanError::ParseError(msg)) => msg,
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn test_parse_sums_rows() {
    let stats = parse_diffstat("INSERTED,DELETED,MODIFIED,FILENAME\n0,4,0,a.cpp\n1,2,0,b.h\n\n").unwrap();
    assert_eq!(
        stats,
        PatchStats {
            insertions: 1,
            deletions: 6,
            files_changed: 0,
        }
    );
}

#[test]
fn test_parse_modified_column() {
    let raw = format!(
        "{}\n3,0,1,dom/base/Element.cpp\n10,2,1,dom/xul/nsXULElement.h\n\n",
        DIFFSTAT_HEADER
    );
    let stats = parse_diffstat(&raw).unwrap();
    assert_eq!(stats.insertions, 13);
    assert_eq!(stats.deletions, 2);
    assert_eq!(stats.files_changed, 2);
    assert_eq!(stats.net_lines(), 11);
}

#[test]
fn test_parse_no_rows() {
    let stats = parse_diffstat("INSERTED,DELETED,MODIFIED,FILENAME\n\n").unwrap();
    assert_eq!(stats, PatchStats::default());
}

#[test]
fn test_parse_filename_with_commas() {
    let stats = parse_diffstat("INSERTED,DELETED,MODIFIED,FILENAME\n2,1,0,odd,name.txt\n\n").unwrap();
    assert_eq!(stats.insertions, 2);
    assert_eq!(stats.deletions, 1);
}

#[test]
fn test_parse_crlf_lines() {
    let stats = parse_diffstat("INSERTED,DELETED,MODIFIED,FILENAME\r\n5,5,0,a.c\r\n\r\n").unwrap();
    assert_eq!(stats.insertions, 5);
    assert_eq!(stats.deletions, 5);
}

#[test]
fn test_parse_missing_trailing_blank_line() {
    let msg = parse_error_message("INSERTED,DELETED,MODIFIED,FILENAME\n0,4,0,a.cpp\n1,2,0,b.h\n");
    assert!(msg.contains("1,2,0,b.h"), "message should name the content: {}", msg);
}

#[test]
fn test_parse_header_only() {
    let msg = parse_error_message("INSERTED,DELETED,MODIFIED,FILENAME\n");
    assert!(msg.contains("trailing blank line"));
}

#[test]
fn test_parse_wrong_header() {
    let msg = parse_error_message("INSERTED,DELETED,FILENAME\n0,4,a.cpp\n\n");
    assert!(msg.contains("INSERTED,DELETED,FILENAME"));
}

#[test]
fn test_parse_human_readable_output_is_rejected() {
    let raw = " a.cpp |    4 ----\n 1 file changed, 0 insertions(+), 4 deletions(-)\n";
    assert!(matches!(parse_diffstat(raw), Err(ScanError::ParseError(_))));
}

#[test]
fn test_parse_empty_input() {
    assert!(matches!(parse_diffstat(""), Err(ScanError::ParseError(_))));
}

#[test]
fn test_parse_non_empty_last_line() {
    let msg = parse_error_message("INSERTED,DELETED,MODIFIED,FILENAME\n1,1,0,a.c\n\n2,2,0,b.c");
    assert!(msg.contains("2,2,0,b.c"), "{}", msg);

    let msg = parse_error_message("INSERTED,DELETED,MODIFIED,FILENAME\n1,1,0,a.c");
    assert!(msg.contains("1,1,0,a.c"), "{}", msg);
}

#[test]
fn test_parse_blank_line_between_rows() {
    let msg = parse_error_message("INSERTED,DELETED,MODIFIED,FILENAME\n1,1,0,a.c\n\n2,2,0,b.c\n\n");
    assert!(msg.contains("row ''"), "{}", msg);
}

#[test]
fn test_parse_non_numeric_column() {
    let msg = parse_error_message("INSERTED,DELETED,MODIFIED,FILENAME\n1,x,0,a.c\n\n");
    assert!(msg.contains("DELETED"));
    assert!(msg.contains("1,x,0,a.c"));
}

#[test]
fn test_parse_short_row() {
    let msg = parse_error_message("INSERTED,DELETED,MODIFIED,FILENAME\n1,2,3\n\n");
    assert!(msg.contains("FILENAME"));
}

#[test]
fn test_patch_stats_add_assign() {
    let mut total = PatchStats::default();
    total += PatchStats {
        insertions: 3,
        deletions: 10,
        files_changed: 1,
    };
    total += PatchStats {
        insertions: 2,
        deletions: 0,
        files_changed: 2,
    };
    assert_eq!(total.insertions, 5);
    assert_eq!(total.deletions, 10);
    assert_eq!(total.files_changed, 3);
    assert_eq!(total.net_lines(), -5);
}
