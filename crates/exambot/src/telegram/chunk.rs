/// Telegram's limit for a single text message, in characters.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Splits `text` into consecutive pieces of at most `max_chars` characters.
///
/// Always returns at least one piece, so an empty text still yields one
/// (empty) message. Cuts land on character boundaries only.
pub fn split_message(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut remaining = text;

    loop {
        let split_at = remaining
            .char_indices()
            .nth(max_chars)
            .map_or(remaining.len(), |(index, _)| index);
        let (chunk, rest) = remaining.split_at(split_at);
        chunks.push(chunk);
        if rest.is_empty() {
            break;
        }
        remaining = rest;
    }

    chunks
}
