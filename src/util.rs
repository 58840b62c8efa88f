//! Offset helpers.
//!
//! Positions coming from editors may be character-based while the parser
//! reports byte offsets.  These helpers convert between the two without
//! ever splitting a multi-byte character, and compute 1-based line numbers
//! for diagnostics.

/// Convert a character offset into a byte offset.
///
/// The result is the byte length of the first `char_offset` characters of
/// `content`.  Offsets past the end clamp to `content.len()`.
pub fn byte_offset_from_char_offset(content: &str, char_offset: u32) -> u32 {
    content
        .char_indices()
        .nth(char_offset as usize)
        .map(|(idx, _)| idx)
        .unwrap_or(content.len()) as u32
}

/// Convert a byte offset into a character offset.
///
/// A byte offset that lands inside a multi-byte character is rounded down
/// to that character's start, so the result is always less than or equal
/// to `byte_offset`.
pub fn char_offset_from_byte_offset(content: &str, byte_offset: u32) -> u32 {
    let mut end = (byte_offset as usize).min(content.len());
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    content[..end].chars().count() as u32
}

/// The 1-based line number the given byte offset is located on.
pub fn line_of_offset(content: &str, byte_offset: u32) -> u32 {
    let end = (byte_offset as usize).min(content.len());
    memchr::memchr_iter(b'\n', &content.as_bytes()[..end]).count() as u32 + 1
}
