pub mod sanitize;
pub mod speaker;
pub mod utterance;

pub use sanitize::sanitize_for_speech;
pub use speaker::{CommandSpeaker, PrintSpeaker, Speaker};
pub use utterance::{compose_utterance, is_ad_only};
