use crate::domain::email::MailRecord;
use crate::speech::sanitize::sanitize_for_speech;

const AD_ONLY_BODY: &str = "広告";

/// Sentence read aloud for one record, already sanitized.
pub fn compose_utterance(record: &MailRecord) -> String {
    let sender = sender_name(&record.from);
    let subject = record.subject.trim();
    let body = record.body.trim();

    let sentence = match (subject.is_empty(), body.is_empty()) {
        (_, true) => format!("{sender}さんから、{subject}と送られました。"),
        (true, false) => format!("{sender}さんから、{body}と送られました。"),
        (false, false) => format!("{sender}さんから、{subject}。{body}と送られました。"),
    };
    sanitize_for_speech(&sentence)
}

/// Messages whose whole body is the ad marker are shown, never spoken.
pub fn is_ad_only(record: &MailRecord) -> bool {
    record.body.trim() == AD_ONLY_BODY
}

/// Display name when the From header has one, else the bare address.
fn sender_name(from: &str) -> String {
    let parsed = mailparse::addrparse(from).ok();
    let first = parsed.as_ref().and_then(|list| list.first());
    match first {
        Some(mailparse::MailAddr::Single(info)) => info
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(info.addr.as_str())
            .to_string(),
        Some(mailparse::MailAddr::Group(group)) => group.group_name.clone(),
        None => from.trim().to_string(),
    }
}
