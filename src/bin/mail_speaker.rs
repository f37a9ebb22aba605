use anyhow::{Result, anyhow, bail};
use clap::{Parser, Subcommand};
use secrecy::SecretString;

use mail_speaker::config::{Config, config_path, load_config};
use mail_speaker::domain::email::{Category, FetchOutcome, FetchRequest, MailRecord, SearchCriteria};
use mail_speaker::mail::imap_client::fetch_mail;
use mail_speaker::speech::{CommandSpeaker, PrintSpeaker, Speaker, compose_utterance, is_ad_only};
use mail_speaker::terminal::run_tui;
use mail_speaker::watch::{DEFAULT_INTERVAL_SECS, WatchConfig, run_watch};

#[derive(Parser)]
#[command(name = "mail_speaker")]
#[command(about = "Fetch recent IMAP mail and read it aloud", long_about = None)]
struct Cli {
    /// Mailbox address (defaults to user_email from the config)
    #[arg(long, global = true)]
    email: Option<String>,

    /// all, primary or promotions
    #[arg(long, global = true)]
    category: Option<String>,

    /// How many of the newest messages to fetch
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    count: Option<u32>,

    /// IMAP host, overriding the guess from the address domain
    #[arg(long, global = true)]
    host: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the fetched messages
    List {
        #[arg(long)]
        json: bool,
    },

    /// Speak one message (0 = newest)
    Speak {
        #[arg(long, default_value_t = 0)]
        index: usize,

        /// Print the sentence instead of speaking it
        #[arg(long)]
        dry_run: bool,
    },

    /// Refetch periodically and speak the newest message when it changes
    Watch {
        #[arg(long, default_value_t = DEFAULT_INTERVAL_SECS)]
        interval: u64,

        #[arg(long)]
        dry_run: bool,
    },

    /// Pick a message interactively and speak it
    Tui {
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;
    let req = build_request(&cli, &cfg)?;

    match cli.cmd {
        Command::List { json } => {
            let records = fetch_or_fail(&req)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No mail yet ({}).", req.criteria.category.label());
            } else {
                for (i, r) in records.iter().enumerate() {
                    println!("[{i}] {}", r.from);
                    println!("    {}", r.subject);
                    println!("    {}", snippet(&r.body, 80));
                }
            }
            Ok(())
        }

        Command::Speak { index, dry_run } => {
            let records = fetch_or_fail(&req)?;
            if records.is_empty() {
                println!("No mail yet ({}).", req.criteria.category.label());
                return Ok(());
            }
            let record = records
                .get(index)
                .ok_or_else(|| anyhow!("only {} messages fetched", records.len()))?;
            speak_record(record, speaker(dry_run, &cfg).as_ref())
        }

        Command::Watch { interval, dry_run } => run_watch(
            &req,
            speaker(dry_run, &cfg).as_ref(),
            WatchConfig {
                interval_secs: interval.max(1),
            },
        ),

        Command::Tui { dry_run } => {
            let records = fetch_or_fail(&req)?;
            let title = format!("{} / {}", req.address, req.criteria.category.label());
            run_tui(&title, records, speaker(dry_run, &cfg).as_ref())
        }
    }
}

fn build_request(cli: &Cli, cfg: &Config) -> Result<FetchRequest> {
    let address = cli
        .email
        .clone()
        .or_else(|| cfg.user_email.clone())
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .ok_or_else(|| {
            let path = config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "the config file".to_string());
            anyhow!("No mailbox address: pass --email or set user_email in {path}")
        })?;

    let defaults = cfg.criteria();
    let criteria = SearchCriteria::new(
        cli.category
            .as_deref()
            .map(Category::from_label)
            .unwrap_or(defaults.category),
        cli.count.map(|c| c as usize).unwrap_or(defaults.count),
    );

    let password = read_password(&address)?;

    Ok(FetchRequest {
        address,
        password,
        criteria,
        host: cli.host.clone().or_else(|| cfg.imap_server.clone()),
    })
}

/// `MAIL_SPEAKER_PASSWORD` if set, otherwise a masked prompt.
fn read_password(address: &str) -> Result<SecretString> {
    if let Ok(pw) = std::env::var("MAIL_SPEAKER_PASSWORD")
        && !pw.is_empty()
    {
        return Ok(SecretString::from(pw));
    }
    let pw = rpassword::prompt_password(format!("App password for {address}: "))?;
    Ok(SecretString::from(pw))
}

fn fetch_or_fail(req: &FetchRequest) -> Result<Vec<MailRecord>> {
    let FetchOutcome { records, error } = fetch_mail(req);
    match error {
        Some(e) => bail!(e),
        None => Ok(records),
    }
}

fn speaker(dry_run: bool, cfg: &Config) -> Box<dyn Speaker> {
    if dry_run {
        Box::new(PrintSpeaker)
    } else {
        Box::new(CommandSpeaker::new(cfg.speech_command.as_deref()))
    }
}

fn speak_record(record: &MailRecord, speaker: &dyn Speaker) -> Result<()> {
    if is_ad_only(record) {
        println!("広告");
        return Ok(());
    }
    let text = compose_utterance(record);
    log::info!("speaking message from {}", record.from);
    speaker.speak(&text)
}

fn snippet(s: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(line);
        if out.chars().count() >= max_chars {
            break;
        }
    }
    out.chars().take(max_chars).collect()
}
