use std::io::{self, Stdout, stdout};

use anyhow::{Context, Result};
use crossterm::cursor;
use crossterm::event::{Event as CrosstermEvent, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::{Stream, StreamExt};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::widgets::{Paragraph, Wrap};
use reqwest::Client;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::poem::{self, PoemResult};
use crate::session::{Effect, Session, SessionState};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Runs one session from launch to exit. A clean quit is a success even when
/// the generation itself failed; the failure was rendered to the user.
pub async fn run(client: &Client, cfg: &Config, direct_prompt: Option<String>) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let dispatcher = {
        let client = client.clone();
        let cfg = cfg.clone();
        let tx = tx.clone();
        let cancel = cancel.clone();
        move |prompt: String| dispatch(&client, &cfg, prompt, tx.clone(), cancel.clone())
    };

    let mut session = match direct_prompt {
        Some(prompt) => {
            let session = Session::direct();
            dispatcher(prompt);
            session
        }
        None => Session::interactive(),
    };

    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let mut terminal_events = EventStream::new();
    let loop_result = event_loop(
        &mut terminal,
        &mut session,
        &mut terminal_events,
        &mut rx,
        dispatcher,
    )
    .await;
    restore_terminal(&mut terminal)?;
    cancel.cancel();

    // Leaving the alternate screen erased the final frame; reprint the
    // outcome so it survives in the scrollback.
    if let Some(output) = final_output(&session) {
        print!("{output}");
    }

    loop_result
}

async fn event_loop<B, S, D>(
    terminal: &mut Terminal<B>,
    session: &mut Session,
    events: &mut S,
    results: &mut mpsc::UnboundedReceiver<PoemResult>,
    mut dispatch: D,
) -> Result<()>
where
    B: Backend,
    S: Stream<Item = io::Result<CrosstermEvent>> + Unpin,
    D: FnMut(String),
{
    loop {
        draw(terminal, session)?;

        let effect = tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(CrosstermEvent::Key(key))) => session.on_key(key),
                Some(Ok(_)) => Effect::Continue,
                Some(Err(err)) => return Err(err).context("Failed to read terminal events"),
                None => Effect::Quit,
            },
            Some(result) = results.recv() => {
                match &result {
                    Ok(_) => info!("poem generated successfully"),
                    Err(err) => error!(error = %err, "failed to generate poem"),
                }
                session.on_result(result)
            }
        };

        match effect {
            Effect::Continue => {}
            Effect::Dispatch(prompt) => dispatch(prompt),
            Effect::Quit => {
                // Final frame, then stop. A result still in flight is
                // discarded because the channel is never polled again.
                draw(terminal, session)?;
                break;
            }
        }
    }

    Ok(())
}

/// The Displaying frame is the session's outcome; anything earlier was
/// transient and has nothing worth keeping on screen.
fn final_output(session: &Session) -> Option<String> {
    match session.state() {
        SessionState::Displaying(_) => Some(session.view()),
        _ => None,
    }
}

fn dispatch(
    client: &Client,
    cfg: &Config,
    prompt: String,
    tx: mpsc::UnboundedSender<PoemResult>,
    cancel: CancellationToken,
) {
    let client = client.clone();
    let cfg = cfg.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            result = poem::generate(&client, &cfg, &prompt) => {
                let _ = tx.send(result);
            }
        }
    });
}

fn draw<B: Backend>(terminal: &mut Terminal<B>, session: &Session) -> Result<()> {
    terminal
        .draw(|frame| {
            let view = Paragraph::new(session.view()).wrap(Wrap { trim: false });
            frame.render_widget(view, frame.area());
        })
        .context("Failed to draw frame")?;
    Ok(())
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    match enter_alternate_screen() {
        Ok(terminal) => Ok(terminal),
        Err(err) => {
            // Leave the shell usable if the UI never came up.
            destruct_terminal();
            Err(err)
        }
    }
}

fn enter_alternate_screen() -> Result<Tui> {
    execute!(stdout(), EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))
        .context("Failed to initialize terminal")?;
    terminal.clear().context("Failed to clear terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(stdout(), LeaveAlternateScreen).context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to restore cursor")?;
    Ok(())
}

/// Best-effort restore, safe to call whether or not the UI ever came up.
fn destruct_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(stdout(), LeaveAlternateScreen, cursor::Show);
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        destruct_terminal();
        default_hook(panic_info);
    }));
}
