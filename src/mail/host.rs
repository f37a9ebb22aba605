pub const GMAIL_IMAP_HOST: &str = "imap.gmail.com";

/// Guess the IMAP host for an address. Never fails: Gmail domains and
/// unparseable addresses map to the Gmail host, anything else to `imap.<domain>`.
pub fn resolve_imap_host(address: &str) -> String {
    let domain = match address.trim().rsplit_once('@') {
        Some((_, d)) => d.trim().to_ascii_lowercase(),
        None => return GMAIL_IMAP_HOST.to_string(),
    };

    if domain.is_empty() || domain.ends_with("gmail.com") {
        GMAIL_IMAP_HOST.to_string()
    } else {
        format!("imap.{domain}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gmail_subdomain_maps_to_gmail() {
        assert_eq!(resolve_imap_host("user@sub.gmail.com"), GMAIL_IMAP_HOST);
        assert_eq!(resolve_imap_host("User@GMail.com"), GMAIL_IMAP_HOST);
    }

    #[test]
    fn other_domain_gets_imap_prefix() {
        assert_eq!(resolve_imap_host("user@example.org"), "imap.example.org");
        assert_eq!(resolve_imap_host("a@b@Example.ORG"), "imap.example.org");
    }

    #[test]
    fn missing_domain_falls_back() {
        assert_eq!(resolve_imap_host("no-at-sign"), GMAIL_IMAP_HOST);
        assert_eq!(resolve_imap_host("trailing@"), GMAIL_IMAP_HOST);
        assert_eq!(resolve_imap_host(""), GMAIL_IMAP_HOST);
    }
}
