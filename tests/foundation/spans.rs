//! Integration tests for spans and arena handles

use weft_foundation::{DeclId, FileId, Span, TypeId};

#[test]
fn span_keeps_its_file_and_position() {
    let span = Span::new(FileId::new(2), 6, 9, 1, 7);
    assert_eq!(span.file, FileId::new(2));
    assert_eq!((span.start, span.end), (6, 9));
    assert_eq!((span.line, span.column), (1, 7));
}

#[test]
fn handles_round_trip_their_index() {
    assert_eq!(DeclId::new(7).index(), 7);
    assert_eq!(TypeId::from_len(12).index(), 12);
    assert_eq!(format!("{:?}", FileId::new(2)), "FileId(2)");
}

#[test]
fn handles_order_by_index() {
    assert!(DeclId::new(1) < DeclId::new(2));
}
