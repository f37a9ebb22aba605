use ratatui::widgets::ListState;

use crate::domain::email::MailRecord;
use crate::speech::{Speaker, compose_utterance, is_ad_only};

pub struct AppState {
    pub title: String,
    pub records: Vec<MailRecord>,
    pub list_state: ListState,
    /// Last speech result shown in the footer.
    pub status: Option<String>,
}

impl AppState {
    pub fn new(title: impl Into<String>, records: Vec<MailRecord>) -> Self {
        let mut s = Self {
            title: title.into(),
            records,
            list_state: ListState::default(),
            status: None,
        };
        if !s.records.is_empty() {
            s.list_state.select(Some(0));
        }
        s
    }

    pub fn selected_record(&self) -> Option<&MailRecord> {
        let idx = self.list_state.selected()?;
        self.records.get(idx)
    }

    pub fn move_selection(&mut self, delta: i32) {
        if self.records.is_empty() {
            self.list_state.select(None);
            return;
        }
        let cur = self.list_state.selected().unwrap_or(0) as i32;
        let len = self.records.len() as i32;
        let next = (cur + delta).clamp(0, len - 1) as usize;
        self.list_state.select(Some(next));
    }

    /// Text the preview pane shows for the selection.
    pub fn preview(&self) -> String {
        match self.selected_record() {
            None => "No mail found.".to_string(),
            Some(r) if is_ad_only(r) => "広告".to_string(),
            Some(r) => compose_utterance(r),
        }
    }

    pub fn speak_selected(&mut self, speaker: &dyn Speaker) {
        let Some(record) = self.selected_record() else {
            return;
        };
        if is_ad_only(record) {
            self.status = Some("広告 (not spoken)".to_string());
            return;
        }
        let text = compose_utterance(record);
        self.status = Some(match speaker.speak(&text) {
            Ok(()) => "Spoken.".to_string(),
            Err(e) => format!("Speech error: {e}"),
        });
    }
}
