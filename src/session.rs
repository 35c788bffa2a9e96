use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::poem::PoemResult;

/// The session is single-shot: once a prompt is submitted the state only
/// moves forward, and a delivered result ends the run after one more render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    AwaitingPrompt,
    Loading,
    Displaying(PoemResult),
}

/// What the event loop must do after feeding an event to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Continue,
    Dispatch(String),
    Quit,
}

#[derive(Debug)]
pub struct Session {
    state: SessionState,
    input: String,
}

impl Session {
    pub fn interactive() -> Self {
        Self {
            state: SessionState::AwaitingPrompt,
            input: String::new(),
        }
    }

    /// Direct mode: the prompt came from the command line, so the entry view
    /// is never shown and the caller dispatches the request immediately.
    pub fn direct() -> Self {
        Self {
            state: SessionState::Loading,
            input: String::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Effect {
        if key.kind != KeyEventKind::Press {
            return Effect::Continue;
        }
        if is_cancel(&key) {
            return Effect::Quit;
        }

        match self.state {
            SessionState::AwaitingPrompt => match key.code {
                KeyCode::Enter => {
                    let prompt = self.input.trim();
                    if prompt.is_empty() {
                        return Effect::Continue;
                    }
                    let prompt = prompt.to_string();
                    self.state = SessionState::Loading;
                    Effect::Dispatch(prompt)
                }
                KeyCode::Char(c) => {
                    self.input.push(c);
                    Effect::Continue
                }
                KeyCode::Backspace => {
                    self.input.pop();
                    Effect::Continue
                }
                _ => Effect::Continue,
            },
            // No re-entrancy: input other than cancellation is ignored once
            // a request is in flight or a result is on screen.
            SessionState::Loading | SessionState::Displaying(_) => Effect::Continue,
        }
    }

    pub fn on_result(&mut self, result: PoemResult) -> Effect {
        match self.state {
            SessionState::Loading => {
                self.state = SessionState::Displaying(result);
                Effect::Quit
            }
            _ => Effect::Continue,
        }
    }

    /// Pure rendering: the frame text is a function of the current state and
    /// the prompt buffer, nothing else.
    pub fn view(&self) -> String {
        match &self.state {
            SessionState::AwaitingPrompt => format!(
                "\n🎭 Quill — AI Poetry Generator\n\nEnter your poem prompt: {}_\n\nPress Enter to generate or Ctrl+C to exit.\n",
                self.input
            ),
            SessionState::Loading => {
                "\n🎭 Generating your poem...\n\nPress Ctrl+C to cancel.\n".to_string()
            }
            SessionState::Displaying(Ok(poem)) => {
                format!("\n✨ Your Poem:\n\n{poem}\n\nPress Ctrl+C to exit.\n")
            }
            SessionState::Displaying(Err(err)) => {
                format!("\n❌ Error: {err}\n\nPress Ctrl+C to exit.\n")
            }
        }
    }
}

fn is_cancel(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::{Effect, Session, SessionState};
    use crate::poem::GenerateError;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl_c() -> KeyEvent {
        KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
    }

    fn type_text(session: &mut Session, text: &str) {
        for c in text.chars() {
            assert_eq!(session.on_key(press(KeyCode::Char(c))), Effect::Continue);
        }
    }

    #[test]
    fn enter_with_empty_prompt_does_not_dispatch() {
        let mut session = Session::interactive();
        assert_eq!(session.on_key(press(KeyCode::Enter)), Effect::Continue);
        assert_eq!(session.state(), &SessionState::AwaitingPrompt);
    }

    #[test]
    fn enter_with_whitespace_only_prompt_does_not_dispatch() {
        let mut session = Session::interactive();
        type_text(&mut session, "   ");
        assert_eq!(session.on_key(press(KeyCode::Enter)), Effect::Continue);
        assert_eq!(session.state(), &SessionState::AwaitingPrompt);
    }

    #[test]
    fn enter_with_prompt_dispatches_and_moves_to_loading() {
        let mut session = Session::interactive();
        type_text(&mut session, "autumn leaves");
        assert_eq!(
            session.on_key(press(KeyCode::Enter)),
            Effect::Dispatch("autumn leaves".to_string())
        );
        assert_eq!(session.state(), &SessionState::Loading);
    }

    #[test]
    fn backspace_edits_the_prompt_buffer() {
        let mut session = Session::interactive();
        type_text(&mut session, "mood");
        session.on_key(press(KeyCode::Backspace));
        assert_eq!(
            session.on_key(press(KeyCode::Enter)),
            Effect::Dispatch("moo".to_string())
        );
    }

    #[test]
    fn direct_mode_starts_in_loading() {
        let session = Session::direct();
        assert_eq!(session.state(), &SessionState::Loading);
    }

    #[test]
    fn cancellation_quits_from_any_state() {
        let mut session = Session::interactive();
        assert_eq!(session.on_key(ctrl_c()), Effect::Quit);

        let mut session = Session::direct();
        assert_eq!(session.on_key(ctrl_c()), Effect::Quit);
        assert_eq!(session.on_key(press(KeyCode::Esc)), Effect::Quit);
    }

    #[test]
    fn input_other_than_cancel_is_ignored_while_loading() {
        let mut session = Session::direct();
        assert_eq!(session.on_key(press(KeyCode::Char('x'))), Effect::Continue);
        assert_eq!(session.on_key(press(KeyCode::Enter)), Effect::Continue);
        assert_eq!(session.state(), &SessionState::Loading);
    }

    #[test]
    fn result_in_loading_moves_to_displaying_and_quits() {
        let mut session = Session::direct();
        let effect = session.on_result(Ok("line1\nline2".to_string()));
        assert_eq!(effect, Effect::Quit);
        assert_eq!(
            session.state(),
            &SessionState::Displaying(Ok("line1\nline2".to_string()))
        );
    }

    #[test]
    fn result_outside_loading_is_discarded() {
        let mut session = Session::interactive();
        assert_eq!(session.on_result(Ok("stray".to_string())), Effect::Continue);
        assert_eq!(session.state(), &SessionState::AwaitingPrompt);
    }

    #[test]
    fn view_shows_entry_instructions() {
        let mut session = Session::interactive();
        type_text(&mut session, "rain");
        let view = session.view();
        assert!(view.contains("Enter your poem prompt: rain_"));
        assert!(view.contains("Press Enter to generate"));
    }

    #[test]
    fn view_shows_loading_with_cancel_hint() {
        let session = Session::direct();
        let view = session.view();
        assert!(view.contains("Generating your poem"));
        assert!(view.contains("Ctrl+C to cancel"));
    }

    #[test]
    fn view_frames_poem_with_success_marker() {
        let mut session = Session::direct();
        session.on_result(Ok("line1\nline2".to_string()));
        let view = session.view();
        assert!(view.contains("✨ Your Poem:"));
        assert!(view.contains("line1\nline2"));
        assert!(view.contains("Press Ctrl+C to exit."));
    }

    #[test]
    fn view_frames_failure_with_error_marker() {
        let mut session = Session::direct();
        session.on_result(Err(GenerateError::EmptyChoices));
        let view = session.view();
        assert!(view.contains("❌ Error: no response from AI"));
        assert!(view.contains("Press Ctrl+C to exit."));
    }
}
