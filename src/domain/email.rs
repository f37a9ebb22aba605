use secrecy::SecretString;
use serde::Serialize;

pub const DEFAULT_COUNT: usize = 10;

/// One message reduced to speakable text. Built fresh per fetch, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MailRecord {
    pub subject: String,
    pub from: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    All,
    Primary,
    #[default]
    Promotions,
}

impl Category {
    /// Unknown labels fall back to `Promotions`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "all" => Category::All,
            "primary" => Category::Primary,
            _ => Category::Promotions,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Primary => "primary",
            Category::Promotions => "promotions",
        }
    }

    /// Server-side SEARCH query. The category forms rely on the Gmail
    /// `X-GM-RAW` extension and match nothing on other servers.
    pub fn search_query(self) -> &'static str {
        match self {
            Category::All => "ALL",
            Category::Primary => "X-GM-RAW \"category:primary\"",
            Category::Promotions => "X-GM-RAW \"category:promotions\"",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchCriteria {
    pub category: Category,
    pub count: usize,
}

impl SearchCriteria {
    pub fn new(category: Category, count: usize) -> Self {
        Self {
            category,
            count: count.max(1),
        }
    }
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self::new(Category::default(), DEFAULT_COUNT)
    }
}

/// Everything one fetch needs. `host` overrides the domain-derived guess.
#[derive(Debug)]
pub struct FetchRequest {
    pub address: String,
    pub password: SecretString,
    pub criteria: SearchCriteria,
    pub host: Option<String>,
}

/// Result of a fetch. Empty `records` with no `error` means "no mail".
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<MailRecord>,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn found(records: Vec<MailRecord>) -> Self {
        Self {
            records,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Best-effort decode result; `exact` is false when a fallback was used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub exact: bool,
}

impl Decoded {
    pub fn exact(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            exact: true,
        }
    }

    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            exact: false,
        }
    }
}
