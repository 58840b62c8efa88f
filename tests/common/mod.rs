#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use phpcursor::invocation::{Invocation, ScanOptions, resolve_invocation};
use phpcursor::parser::parse_php;
use phpcursor::scope_chain::resolve_scope_chain;

/// Marks the cursor position in test sources.
pub const CURSOR: &str = "<|>";

/// Strip the cursor marker and return the source with the marker's byte
/// offset.
pub fn split_cursor(marked: &str) -> (String, u32) {
    let offset = marked
        .find(CURSOR)
        .expect("test source must contain a <|> cursor marker");
    let source = marked.replacen(CURSOR, "", 1);
    (source, offset as u32)
}

/// Scope chain labels at the marked cursor.
pub fn scope_labels(marked: &str) -> Vec<String> {
    let (source, offset) = split_cursor(marked);
    let tree = parse_php(&source);
    resolve_scope_chain(tree.roots(), offset)
        .items()
        .iter()
        .map(|item| item.kind.clone())
        .collect()
}

/// Scope chain selector at the marked cursor.
pub fn scope_selector(marked: &str) -> String {
    let (source, offset) = split_cursor(marked);
    let tree = parse_php(&source);
    resolve_scope_chain(tree.roots(), offset).selector()
}

/// Invocation at the marked cursor, with strict scanning.
pub fn invocation_at(marked: &str) -> Option<Invocation> {
    let (source, offset) = split_cursor(marked);
    let tree = parse_php(&source);
    resolve_invocation(tree.roots(), &source, offset, ScanOptions::default())
        .expect("source text should be consistent with the tree")
}

/// Byte offset just past the first occurrence of `needle` in the source
/// (after the cursor marker is removed).
pub fn offset_after(marked: &str, needle: &str) -> u32 {
    let (source, _) = split_cursor(marked);
    let start = source.find(needle).expect("needle not found in source");
    (start + needle.len()) as u32
}

/// Write a PHP file into a fresh temp directory.
pub fn write_php(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("input.php");
    fs::write(&path, contents).expect("failed to write PHP file");
    (dir, path)
}
