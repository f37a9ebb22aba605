use std::net::TcpStream;
use std::ops::{Deref, DerefMut};

use anyhow::{Result, anyhow};
use native_tls::{TlsConnector, TlsStream};
use secrecy::{ExposeSecret, SecretString};

use crate::domain::email::{FetchOutcome, FetchRequest, MailRecord, SearchCriteria};
use crate::mail::body::normalize_message;
use crate::mail::host::resolve_imap_host;

pub const IMAP_TLS_PORT: u16 = 993;

type TlsSession = imap::Session<TlsStream<TcpStream>>;

/// The IMAP operations the normalizer needs. The mailbox is only read.
pub trait MailSession {
    fn select_inbox(&mut self) -> Result<()>;
    fn search_ids(&mut self, query: &str) -> Result<Vec<u32>>;
    /// Full raw message, `None` if the server returned no body.
    fn fetch_raw(&mut self, id: u32) -> Result<Option<Vec<u8>>>;
    fn logout(&mut self) -> Result<()>;
}

impl MailSession for TlsSession {
    fn select_inbox(&mut self) -> Result<()> {
        self.select("INBOX")?;
        Ok(())
    }

    fn search_ids(&mut self, query: &str) -> Result<Vec<u32>> {
        Ok(self.search(query)?.into_iter().collect())
    }

    fn fetch_raw(&mut self, id: u32) -> Result<Option<Vec<u8>>> {
        // PEEK keeps \Seen untouched
        let fetches = self.fetch(id.to_string(), "BODY.PEEK[]")?;
        Ok(body_for(fetches.iter().map(|f| (f.message, f.body())), id))
    }

    fn logout(&mut self) -> Result<()> {
        imap::Session::logout(self)?;
        Ok(())
    }
}

/// Body of the FETCH response for `id`. Unsolicited responses for other
/// messages (e.g. flag updates) are ignored.
fn body_for<'a>(responses: impl IntoIterator<Item = (u32, Option<&'a [u8]>)>, id: u32) -> Option<Vec<u8>> {
    responses
        .into_iter()
        .filter(|(seq, _)| *seq == id)
        .find_map(|(_, body)| body)
        .map(|b| b.to_vec())
}

/// Owns a session and logs it out when dropped.
pub struct SessionGuard<S: MailSession> {
    session: S,
}

impl<S: MailSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: MailSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: MailSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: MailSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if let Err(e) = self.session.logout() {
            log::warn!("IMAP logout failed: {e}");
        }
    }
}

pub struct ImapClient {
    pub server: String,
    pub user: String,
}

impl ImapClient {
    pub fn new(server: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            user: user.into(),
        }
    }

    /// Host from the request override, else guessed from the address.
    pub fn for_request(req: &FetchRequest) -> Self {
        let server = req
            .host
            .clone()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| resolve_imap_host(&req.address));
        Self::new(server, req.address.clone())
    }

    fn connect_and_login(&self, password: &SecretString) -> Result<TlsSession> {
        log::info!("connecting to {}:{}", self.server, IMAP_TLS_PORT);
        let tls = TlsConnector::builder().build()?;
        let client = imap::connect((self.server.as_str(), IMAP_TLS_PORT), self.server.as_str(), &tls)?;

        client
            .login(&self.user, password.expose_secret())
            .map_err(|(e, _client)| anyhow!("login failed for {}: {e}", self.user))
    }

    /// One full connect / search / fetch / logout cycle.
    pub fn fetch(&self, password: &SecretString, criteria: SearchCriteria) -> FetchOutcome {
        match self.connect_and_login(password) {
            Ok(session) => run_session(session, criteria),
            Err(e) => {
                log::warn!("{e:#}");
                FetchOutcome::failed(format!("Could not fetch mail: {e:#}"))
            }
        }
    }
}

/// Fetch the records described by `req`. Never fails; see [`FetchOutcome`].
pub fn fetch_mail(req: &FetchRequest) -> FetchOutcome {
    ImapClient::for_request(req).fetch(&req.password, req.criteria)
}

/// Select the inbox and collect records. The session is logged out on return.
pub fn run_session<S: MailSession>(session: S, criteria: SearchCriteria) -> FetchOutcome {
    let mut guard = SessionGuard::new(session);

    if let Err(e) = guard.select_inbox() {
        log::warn!("SELECT INBOX failed: {e:#}");
        return FetchOutcome::failed(format!("Could not open INBOX: {e:#}"));
    }

    FetchOutcome::found(collect_records(&mut *guard, criteria))
}

/// Newest `criteria.count` matches, newest first. Search failures yield an
/// empty list; a message that fails to fetch or parse is skipped.
pub fn collect_records<S: MailSession>(session: &mut S, criteria: SearchCriteria) -> Vec<MailRecord> {
    let query = criteria.category.search_query();
    let mut ids = match session.search_ids(query) {
        Ok(ids) => ids,
        Err(e) => {
            log::warn!("SEARCH {query} failed: {e:#}");
            return Vec::new();
        }
    };
    if ids.is_empty() {
        log::info!("no messages match {}", criteria.category.label());
        return Vec::new();
    }

    ids.sort_unstable(); // ascending
    ids.dedup();
    let start = ids.len().saturating_sub(criteria.count);
    let newest = &ids[start..];

    let mut out = Vec::with_capacity(newest.len());
    for &id in newest.iter().rev() {
        let raw = match session.fetch_raw(id) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::warn!("message {id} returned no body; skipped");
                continue;
            }
            Err(e) => {
                log::warn!("fetching message {id} failed: {e:#}; skipped");
                continue;
            }
        };
        if let Some(record) = normalize_message(&raw) {
            out.push(record);
        }
    }

    log::debug!("collected {} of {} messages", out.len(), newest.len());
    out
}
