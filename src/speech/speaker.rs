use std::io::ErrorKind;
use std::process::Command;

use anyhow::{Result, anyhow};

/// Hands already-sanitized text to something that can read it aloud.
pub trait Speaker {
    fn speak(&self, text: &str) -> Result<()>;
}

/// Writes the text to stdout instead of speaking it.
pub struct PrintSpeaker;

impl Speaker for PrintSpeaker {
    fn speak(&self, text: &str) -> Result<()> {
        println!("{text}");
        Ok(())
    }
}

/// Runs the first available text-to-speech command with the text as its
/// last argument and waits for it to finish.
pub struct CommandSpeaker {
    candidates: Vec<Vec<String>>,
}

impl CommandSpeaker {
    /// `preferred` (from config) wins, then `MAIL_SPEAKER_TTS`, then common
    /// system commands. A command line may carry arguments, e.g. `say -v Kyoko`.
    pub fn new(preferred: Option<&str>) -> Self {
        let from_env = std::env::var("MAIL_SPEAKER_TTS").ok();
        let configured: Vec<String> = preferred
            .map(str::to_string)
            .into_iter()
            .chain(from_env)
            .filter(|c| !c.trim().is_empty())
            .collect();

        let lines = if configured.is_empty() {
            ["say", "espeak-ng", "espeak", "spd-say"]
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            configured
        };

        Self {
            candidates: lines
                .iter()
                .map(|l| l.split_whitespace().map(str::to_string).collect())
                .collect(),
        }
    }

    pub fn candidates(&self) -> &[Vec<String>] {
        &self.candidates
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }

        for argv in &self.candidates {
            let Some((program, args)) = argv.split_first() else {
                continue;
            };
            match Command::new(program).args(args).arg(text).status() {
                Ok(status) if status.success() => return Ok(()),
                Ok(status) => return Err(anyhow!("{program} exited with {status}")),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    log::debug!("{program} not found, trying next");
                    continue;
                }
                Err(e) => return Err(anyhow!("could not run {program}: {e}")),
            }
        }

        Err(anyhow!(
            "No text-to-speech command found. Set MAIL_SPEAKER_TTS or speech_command in the config (e.g. say, espeak-ng)."
        ))
    }
}
