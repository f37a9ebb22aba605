use std::sync::LazyLock;

use charset::Charset;
use mailparse::{DispositionType, MailHeaderMap, ParsedMail};
use regex::Regex;

use crate::domain::email::{Decoded, MailRecord};
use crate::mail::decoders::decode_header_value;

static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>").unwrap()
});
static BR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static P_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</p\s*>").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static HSPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\u{00A0}]+").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Parse a raw RFC 822 message into a record. `None` if it cannot be parsed.
pub fn normalize_message(raw_rfc822: &[u8]) -> Option<MailRecord> {
    let parsed = match mailparse::parse_mail(raw_rfc822) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("unparseable message skipped: {e}");
            return None;
        }
    };

    let subject = decode_header_value(
        parsed
            .headers
            .get_first_header("Subject")
            .map(|h| h.get_value_raw()),
    );
    let from = decode_header_value(
        parsed
            .headers
            .get_first_header("From")
            .map(|h| h.get_value_raw()),
    );
    let body = extract_body(&parsed);

    if !(subject.exact && from.exact && body.exact) {
        log::debug!("message decoded with fallbacks");
    }

    Some(MailRecord {
        subject: subject.text.trim().to_string(),
        from: from.text.trim().to_string(),
        body: body.text,
    })
}

/// Pick the readable body: first inline text/plain wins, first inline
/// text/html is the fallback, attachments are never read.
pub fn extract_body(parsed: &ParsedMail) -> Decoded {
    let mut leaves = Vec::new();
    collect_leaves(parsed, &mut leaves);

    let mut plain: Option<Decoded> = None;
    let mut html: Option<Decoded> = None;

    for part in leaves {
        if part.get_content_disposition().disposition == DispositionType::Attachment {
            continue;
        }
        match part.ctype.mimetype.to_ascii_lowercase().as_str() {
            "text/plain" if plain.is_none() => plain = Some(decode_part(part)),
            "text/html" if html.is_none() => html = Some(decode_part(part)),
            _ => {}
        }
    }

    if let Some(p) = plain {
        let text = p.text.trim();
        if !text.is_empty() {
            return Decoded {
                text: text.to_string(),
                exact: p.exact,
            };
        }
    }

    match html {
        Some(h) => Decoded {
            text: html_to_text(&h.text),
            exact: h.exact,
        },
        None => Decoded::exact(""),
    }
}

fn collect_leaves<'a, 'b>(p: &'b ParsedMail<'a>, out: &mut Vec<&'b ParsedMail<'a>>) {
    if p.subparts.is_empty() {
        out.push(p);
        return;
    }
    for sp in &p.subparts {
        collect_leaves(sp, out);
    }
}

/// Decode one part with its declared charset. Undeclared, ASCII, UTF-8 and
/// unrecognised labels are read as lossy UTF-8; a payload that cannot be
/// transfer-decoded falls back to its encoded text.
fn decode_part(part: &ParsedMail) -> Decoded {
    let bytes = match part.get_body_raw() {
        Ok(bytes) => bytes,
        Err(e) => {
            log::debug!("part payload not decodable ({e}); using encoded text");
            return Decoded::fallback(encoded_payload(part));
        }
    };

    let label = part.ctype.charset.trim().to_ascii_lowercase();
    if matches!(label.as_str(), "" | "us-ascii" | "ascii" | "utf-8" | "utf8") {
        return Decoded::exact(String::from_utf8_lossy(&bytes).into_owned());
    }

    match Charset::for_label(label.as_bytes()) {
        Some(cs) => {
            let (text, _, malformed) = cs.decode(&bytes);
            Decoded {
                text: text.into_owned(),
                exact: !malformed,
            }
        }
        None => {
            log::debug!("unknown charset {label:?}; reading as UTF-8");
            Decoded::fallback(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

fn encoded_payload(part: &ParsedMail) -> String {
    use mailparse::body::Body;
    let raw = match part.get_body_encoded() {
        Body::Base64(b) | Body::QuotedPrintable(b) => b.get_raw().to_vec(),
        Body::SevenBit(b) | Body::EightBit(b) => b.get_raw().to_vec(),
        Body::Binary(b) => b.get_raw().to_vec(),
    };
    String::from_utf8_lossy(&raw).into_owned()
}

/// Crude de-tagging for speech. Not an HTML parser: broken markup may
/// leave stray characters.
pub fn html_to_text(html: &str) -> String {
    let s = html.replace("\r\n", "\n").replace('\r', "\n");
    let s = SCRIPT_STYLE.replace_all(&s, "");
    let s = BR.replace_all(&s, "\n");
    let s = P_CLOSE.replace_all(&s, "\n\n");
    let s = TAG.replace_all(&s, "");
    let s = decode_entities(&s);
    let s = HSPACE.replace_all(&s, " ");
    let s = BLANK_LINES.replace_all(&s, "\n\n");
    s.trim().to_string()
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(lines: &[&str]) -> Vec<u8> {
        lines.join("\r\n").into_bytes()
    }

    fn body_of(raw: &[u8]) -> String {
        normalize_message(raw).expect("parse").body
    }

    #[test]
    fn plain_wins_over_html() {
        let raw = msg(&[
            "Subject: hi",
            "MIME-Version: 1.0",
            "Content-Type: multipart/alternative; boundary=\"b1\"",
            "",
            "--b1",
            "Content-Type: text/plain; charset=utf-8",
            "",
            "Hello",
            "--b1",
            "Content-Type: text/html; charset=utf-8",
            "",
            "<p>Hi</p>",
            "--b1--",
            "",
        ]);
        assert_eq!(body_of(&raw), "Hello");
    }

    #[test]
    fn html_only_is_detagged() {
        let raw = msg(&[
            "Subject: hi",
            "Content-Type: text/html; charset=utf-8",
            "",
            "<b>Hi</b><br>there",
        ]);
        let body = body_of(&raw);
        assert!(body.contains("Hi\nthere"), "got {body:?}");
        assert!(!body.contains('<'));
    }

    #[test]
    fn blank_plain_part_falls_back_to_html() {
        let raw = msg(&[
            "Content-Type: multipart/alternative; boundary=\"b1\"",
            "",
            "--b1",
            "Content-Type: text/plain",
            "",
            "   ",
            "--b1",
            "Content-Type: text/html",
            "",
            "<p>From html</p>",
            "--b1--",
            "",
        ]);
        assert_eq!(body_of(&raw), "From html");
    }

    #[test]
    fn attachment_only_gives_empty_body() {
        let raw = msg(&[
            "Subject: report",
            "Content-Type: multipart/mixed; boundary=\"b2\"",
            "",
            "--b2",
            "Content-Type: text/plain; name=\"report.txt\"",
            "Content-Disposition: attachment; filename=\"report.txt\"",
            "",
            "quarterly numbers",
            "--b2",
            "Content-Type: application/pdf",
            "Content-Disposition: attachment; filename=\"a.pdf\"",
            "Content-Transfer-Encoding: base64",
            "",
            "JVBERi0xLjQ=",
            "--b2--",
            "",
        ]);
        assert_eq!(body_of(&raw), "");
    }

    #[test]
    fn nested_multipart_finds_inline_text() {
        let raw = msg(&[
            "Content-Type: multipart/mixed; boundary=\"outer\"",
            "",
            "--outer",
            "Content-Type: multipart/alternative; boundary=\"inner\"",
            "",
            "--inner",
            "Content-Type: text/plain; charset=utf-8",
            "",
            "inner text",
            "--inner--",
            "--outer",
            "Content-Type: text/plain",
            "Content-Disposition: attachment; filename=\"x.txt\"",
            "",
            "attached",
            "--outer--",
            "",
        ]);
        assert_eq!(body_of(&raw), "inner text");
    }

    #[test]
    fn declared_charset_is_honoured() {
        let raw = msg(&[
            "Content-Type: text/plain; charset=Shift_JIS",
            "Content-Transfer-Encoding: base64",
            "",
            "grGC8YLJgr+CzQ==",
        ]);
        assert_eq!(body_of(&raw), "こんにちは");
    }

    #[test]
    fn unknown_charset_reads_as_utf8() {
        let raw = msg(&[
            "Content-Type: text/plain; charset=x-bogus-charset",
            "",
            "こんにちは",
        ]);
        assert_eq!(body_of(&raw), "こんにちは");
    }

    #[test]
    fn undecodable_payload_keeps_encoded_text() {
        let raw = msg(&[
            "Content-Type: text/plain; charset=utf-8",
            "Content-Transfer-Encoding: base64",
            "",
            "!!!not*base64",
        ]);
        let parsed = mailparse::parse_mail(&raw).unwrap();
        let body = extract_body(&parsed);
        assert_eq!(body.text, "!!!not*base64");
        assert!(!body.exact);
    }

    #[test]
    fn undeclared_charset_reads_as_utf8() {
        let raw = msg(&["Subject: x", "", "こんにちは 世界"]);
        assert_eq!(body_of(&raw), "こんにちは 世界");
    }

    #[test]
    fn headers_are_decoded() {
        let raw = msg(&[
            "Subject: =?UTF-8?B?5Lu25ZCN44OG44K544OI?=",
            "From: =?UTF-8?B?5bGx55Sw?= <yamada@example.jp>",
            "",
            "body",
        ]);
        let rec = normalize_message(&raw).unwrap();
        assert_eq!(rec.subject, "件名テスト");
        assert!(rec.from.starts_with("山田"));
        assert!(!rec.from.contains("=?"));
    }

    #[test]
    fn missing_headers_are_empty() {
        let rec = normalize_message(&msg(&["X-Other: 1", "", "text"])).unwrap();
        assert_eq!(rec.subject, "");
        assert_eq!(rec.from, "");
        assert_eq!(rec.body, "text");
    }

    #[test]
    fn html_script_and_style_removed() {
        let html = "<style>p{color:red}</style><SCRIPT type=\"x\">alert(1)</SCRIPT><p>Safe</p>";
        assert_eq!(html_to_text(html), "Safe");
    }

    #[test]
    fn html_paragraphs_and_whitespace() {
        let html = "<p>One   \t two</p><p>Three</p>\n\n\n\n<div>Four</div>";
        assert_eq!(html_to_text(html), "One two\n\nThree\n\nFour");
    }

    #[test]
    fn html_entities_decoded() {
        assert_eq!(html_to_text("Tom &amp; Jerry&nbsp;&lt;3"), "Tom & Jerry <3");
    }

    #[test]
    fn html_empty() {
        assert_eq!(html_to_text(""), "");
    }
}
