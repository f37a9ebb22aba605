use anyhow::Result;
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::Duration,
};

use crate::domain::email::{FetchOutcome, FetchRequest};
use crate::mail::imap_client::fetch_mail;
use crate::speech::{Speaker, compose_utterance, is_ad_only};

pub const DEFAULT_INTERVAL_SECS: u64 = 5;

pub struct WatchConfig {
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
        }
    }
}

/// Remembers the last sentence spoken so a refresh does not repeat it.
#[derive(Debug, Default)]
pub struct Announcer {
    last_spoken: Option<String>,
}

impl Announcer {
    /// Utterance for the newest record, or `None` if there is nothing new to say.
    pub fn next_utterance(&mut self, outcome: &FetchOutcome) -> Option<String> {
        let newest = outcome.records.first()?;
        if is_ad_only(newest) {
            return None;
        }
        let utterance = compose_utterance(newest);
        if utterance.is_empty() || self.last_spoken.as_deref() == Some(utterance.as_str()) {
            return None;
        }
        self.last_spoken = Some(utterance.clone());
        Some(utterance)
    }
}

/// Re-run the whole fetch cycle every interval until Ctrl-C.
pub fn run_watch(req: &FetchRequest, speaker: &dyn Speaker, cfg: WatchConfig) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r2 = running.clone();
    ctrlc::set_handler(move || {
        r2.store(false, Ordering::SeqCst);
    })?;

    let mut announcer = Announcer::default();

    while running.load(Ordering::SeqCst) {
        let outcome = fetch_mail(req);

        if let Some(err) = &outcome.error {
            eprintln!("{err}");
        } else if outcome.is_empty() {
            log::info!("no mail yet");
        } else if let Some(text) = announcer.next_utterance(&outcome) {
            if let Err(e) = speaker.speak(&text) {
                eprintln!("Speech error: {e}");
            }
        }

        thread::sleep(Duration::from_secs(cfg.interval_secs));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::email::MailRecord;

    fn outcome(from: &str, subject: &str, body: &str) -> FetchOutcome {
        FetchOutcome::found(vec![MailRecord {
            subject: subject.into(),
            from: from.into(),
            body: body.into(),
        }])
    }

    #[test]
    fn speaks_new_mail_once() {
        let mut a = Announcer::default();
        let first = outcome("A <a@x.jp>", "件名", "本文");
        assert!(a.next_utterance(&first).is_some());
        assert!(a.next_utterance(&first).is_none());

        let second = outcome("B <b@x.jp>", "別件", "");
        assert_eq!(
            a.next_utterance(&second).as_deref(),
            Some("Bさんから、別件と送られました。")
        );
    }

    #[test]
    fn empty_and_ad_only_are_silent() {
        let mut a = Announcer::default();
        assert!(a.next_utterance(&FetchOutcome::default()).is_none());
        assert!(a.next_utterance(&outcome("a", "b", "広告")).is_none());
    }
}
