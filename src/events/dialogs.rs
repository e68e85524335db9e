/// User-facing dialogs (`alert` / `confirm`).
pub trait Dialogs {
    fn alert(&mut self, message: &str);
    fn confirm(&mut self, message: &str) -> bool;
}

/// Records every dialog and answers confirms with a fixed choice.
#[derive(Debug, Clone)]
pub struct RecordedDialogs {
    pub alerts: Vec<String>,
    pub confirms: Vec<String>,
    answer: bool,
}

impl RecordedDialogs {
    pub fn answering(answer: bool) -> Self {
        Self {
            alerts: Vec::new(),
            confirms: Vec::new(),
            answer,
        }
    }

    pub fn set_answer(&mut self, answer: bool) {
        self.answer = answer;
    }
}

impl Default for RecordedDialogs {
    fn default() -> Self {
        Self::answering(true)
    }
}

impl Dialogs for RecordedDialogs {
    fn alert(&mut self, message: &str) {
        tracing::info!(%message, "alert");
        self.alerts.push(message.to_string());
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.confirms.push(message.to_string());
        self.answer
    }
}
