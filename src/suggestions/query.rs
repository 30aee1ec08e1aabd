/// Percent-encodes `query` so that no literal character survives.
///
/// `urlencoding::encode` leaves letters, digits and `- _ . ~` literal, and a
/// browser's `encodeURIComponent` additionally leaves `! * ' ( )`. Every
/// character left literal by either is escaped here as `%xx` (lowercase hex),
/// so the search backend never sees query syntax in the term.
pub fn encode_query_strict(query: &str) -> String {
    let standard = urlencoding::encode(query);
    let mut encoded = String::with_capacity(standard.len() * 3);
    let mut chars = standard.chars();
    while let Some(ch) = chars.next() {
        if ch == '%' {
            encoded.push(ch);
            encoded.extend(chars.by_ref().take(2));
        } else {
            // Only ASCII remains after component encoding.
            encoded.push_str(&format!("%{:02x}", ch as u32));
        }
    }
    encoded
}

/// Search term sent as the `q` parameter: the strictly encoded query followed
/// by a trailing wildcard.
pub fn wildcard_query(query: &str) -> String {
    format!("{}*", encode_query_strict(query))
}
