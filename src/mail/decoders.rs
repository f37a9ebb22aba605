use crate::domain::email::Decoded;

/// Decode a raw header value (RFC 2047 encoded-words, each with its own
/// charset). Absent headers decode to empty text; if the value cannot be
/// parsed the raw bytes are returned lossily with `exact = false`.
pub fn decode_header_value(raw: Option<&[u8]>) -> Decoded {
    let Some(raw) = raw else {
        return Decoded::exact("");
    };

    // mailparse expects a full "Key: value" header line
    let mut line = b"X: ".to_vec();
    line.extend_from_slice(raw);
    line.extend_from_slice(b"\r\n");

    match mailparse::parse_header(&line) {
        Ok((h, _idx)) => {
            let text = h.get_value();
            // an encoded-word mailparse could not decode is left in place
            if text.contains("=?") {
                Decoded::fallback(text)
            } else {
                Decoded::exact(text)
            }
        }
        Err(e) => {
            log::debug!("header decode failed, keeping raw value: {e}");
            Decoded::fallback(String::from_utf8_lossy(raw).into_owned())
        }
    }
}
