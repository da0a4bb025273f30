use super::header::Header;

/// The decoded body of a message, as produced by the Reader loop.
#[derive(Debug, Clone)]
pub enum Body {
    /// A reply (or error) body: the raw payload bytes, trailing NUL included.
    Reply(Vec<u8>),
    /// A `WATCH_EVENT` payload, already split into its NUL-terminated strings.
    /// Conventionally `[0] = path`, `[1] = token`, but extra elements must be
    /// tolerated and forwarded verbatim.
    WatchEvent(Vec<String>),
}

/// A fully decoded unit of work handed from the Reader to either the reply
/// queue or the event FIFO.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub header: Header,
    pub body: Body,
}

impl StoredMessage {
    pub fn reply(header: Header, mut payload: Vec<u8>) -> Self {
        payload.push(0);
        Self {
            header,
            body: Body::Reply(payload),
        }
    }

    pub fn watch_event(header: Header, payload: &[u8]) -> Self {
        Self {
            header,
            body: Body::WatchEvent(split_nul_strings(payload)),
        }
    }
}

/// Splits a buffer of concatenated NUL-terminated strings into owned
/// `String`s.
///
/// Only the trailing run of NUL bytes is dropped — not every empty chunk —
/// so an empty part in the *middle* of the buffer (e.g. from
/// `join_nul_parts(&[b"a", b"", b"b"])`) round-trips as an empty string
/// rather than vanishing. The trailing run can be more than one byte: a
/// reply body already ends in its own NUL per the wire convention (see
/// `StoredMessage::reply`'s sentinel), so e.g. a two-entry `DIRECTORY`
/// reply decodes as exactly two entries, not two entries plus a stray
/// empty one.
pub fn split_nul_strings(buf: &[u8]) -> Vec<String> {
    let trailing_nuls = buf.iter().rev().take_while(|&&b| b == 0).count();
    let body = &buf[..buf.len() - trailing_nuls];
    if body.is_empty() {
        return Vec::new();
    }
    body.split(|&b| b == 0)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect()
}

/// Joins payload parts with NUL separators the way a request body is built
/// on the wire: each part becomes NUL-terminated.
pub fn join_nul_parts(parts: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(parts.iter().map(|p| p.len() + 1).sum());
    for part in parts {
        out.extend_from_slice(part);
        out.push(0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_join_round_trips_when_parts_have_no_nul() {
        let parts: &[&[u8]] = &[b"/local/domain/0", b"TOKEN-1"];
        let joined = join_nul_parts(parts);
        let split = split_nul_strings(&joined);
        assert_eq!(split, vec!["/local/domain/0".to_string(), "TOKEN-1".to_string()]);
    }

    #[test]
    fn split_tolerates_extra_trailing_elements() {
        let joined = join_nul_parts(&[b"/x", b"TOKEN", b"extra1", b"extra2"]);
        let split = split_nul_strings(&joined);
        assert_eq!(split.len(), 4);
        assert_eq!(split[2], "extra1");
        assert_eq!(split[3], "extra2");
    }

    #[test]
    fn split_empty_buffer_yields_empty_vec() {
        assert!(split_nul_strings(&[]).is_empty());
    }

    #[test]
    fn split_preserves_an_empty_part_in_the_middle() {
        let joined = join_nul_parts(&[b"a", b"", b"b"]);
        let split = split_nul_strings(&joined);
        assert_eq!(split, vec!["a".to_string(), String::new(), "b".to_string()]);
    }

    #[test]
    fn split_tolerates_a_reply_bodys_stacked_sentinel() {
        // A DIRECTORY reply's own entries are already NUL-terminated on the
        // wire; `StoredMessage::reply` then appends one more sentinel NUL on
        // top, so the decoded buffer ends in two NULs, not one.
        let mut wire_payload = join_nul_parts(&[b"name", b"domid"]);
        wire_payload.push(0);
        let split = split_nul_strings(&wire_payload);
        assert_eq!(split, vec!["name".to_string(), "domid".to_string()]);
    }
}
