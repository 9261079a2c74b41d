use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode, View};
use crate::refresh::RefreshRequest;
use crate::source::worker::FetchCommand;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

fn refreshes(requests: Vec<RefreshRequest>) -> Vec<FetchCommand> {
    requests.into_iter().map(FetchCommand::Refresh).collect()
}

/// Handle a key event. Returns commands for the fetch worker.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Vec<FetchCommand> {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return Vec::new();
    }

    // Input modes consume keys first
    match std::mem::replace(&mut app.input, InputMode::Normal) {
        InputMode::AddServer(text) => return handle_add_input(app, key, text),
        InputMode::ConfirmRemove(server) => return handle_confirm_remove(app, key, server),
        InputMode::Normal => {}
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),

        // Help
        KeyCode::Char('?') => app.show_help = true,

        // View switching
        KeyCode::Tab | KeyCode::BackTab => app.next_view(),
        KeyCode::Char('1') => app.set_view(View::Servers),
        KeyCode::Char('2') => app.set_view(View::Activity),

        // Server table navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Select the server under the cursor; refreshes immediately
        KeyCode::Enter => {
            if app.view == View::Servers {
                if let Some(server) = app.server_at_cursor() {
                    return refreshes(app.select_server(Some(server)));
                }
            }
        }

        // Back: close inspection, then clear selection, then leave view
        KeyCode::Esc => return refreshes(go_back(app)),

        // Clear the selection (back to all servers)
        KeyCode::Char('c') => {
            if app.coordinator.selected().is_some() {
                return refreshes(app.select_server(None));
            }
        }

        // Chart point inspection
        KeyCode::Left | KeyCode::Char('h') => {
            if app.view == View::Activity {
                app.inspect_left();
            }
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if app.view == View::Activity {
                app.inspect_right();
            }
        }

        // Pause/resume the refresh countdown
        KeyCode::Char('p') | KeyCode::Char(' ') => app.scheduler.toggle_pause(),

        // Refresh interval
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let next = app.scheduler.interval_secs().saturating_add(5);
            app.scheduler.set_interval(next);
            app.set_status(format!("Refresh interval: {}s", next));
        }
        KeyCode::Char('-') => {
            let next = app.scheduler.interval_secs().saturating_sub(5).max(5);
            app.scheduler.set_interval(next);
            app.set_status(format!("Refresh interval: {}s", next));
        }

        // Refresh now
        KeyCode::Char('r') => return refreshes(app.refresh_now()),

        // Server registry
        KeyCode::Char('a') => app.input = InputMode::AddServer(String::new()),
        KeyCode::Char('d') | KeyCode::Delete => {
            if app.view == View::Servers {
                if let Some(server) = app.server_at_cursor() {
                    app.input = InputMode::ConfirmRemove(server);
                }
            }
        }

        _ => {}
    }

    Vec::new()
}

/// Handle key input while the add-server prompt is active
fn handle_add_input(app: &mut App, key: KeyEvent, mut text: String) -> Vec<FetchCommand> {
    match key.code {
        KeyCode::Enter => {
            let server = text.trim().to_string();
            if server.is_empty() {
                return Vec::new();
            }
            app.set_status(format!("Adding {}", server));
            return vec![FetchCommand::AddServer(server)];
        }
        KeyCode::Esc => {}
        KeyCode::Backspace => {
            text.pop();
            app.input = InputMode::AddServer(text);
        }
        KeyCode::Char(c) => {
            text.push(c);
            app.input = InputMode::AddServer(text);
        }
        _ => app.input = InputMode::AddServer(text),
    }
    Vec::new()
}

/// Handle key input while the remove confirmation is shown
fn handle_confirm_remove(app: &mut App, key: KeyEvent, server: String) -> Vec<FetchCommand> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            app.set_status(format!("Removing {}", server));
            return vec![FetchCommand::RemoveServer(server)];
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {}
        _ => app.input = InputMode::ConfirmRemove(server),
    }
    Vec::new()
}

fn go_back(app: &mut App) -> Vec<RefreshRequest> {
    if app.inspect_slot.is_some() {
        app.clear_inspect();
        return Vec::new();
    }
    if app.view == View::Activity {
        if app.coordinator.selected().is_some() {
            return app.select_server(None);
        }
        app.set_view(View::Servers);
    }
    Vec::new()
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        // Scroll wheel navigates whichever cursor the view uses
        MouseEventKind::ScrollUp => match app.view {
            View::Servers => app.select_prev(),
            View::Activity => app.inspect_left(),
        },
        MouseEventKind::ScrollDown => match app.view {
            View::Servers => app.select_next(),
            View::Activity => app.inspect_right(),
        },

        // Click on the tab row switches views
        MouseEventKind::Down(_) => {
            if mouse.row == 1 {
                // Approximate tab positions: Servers (0-9), Activity (10-20)
                if mouse.column < 10 {
                    app.set_view(View::Servers);
                } else if mouse.column < 21 {
                    app.set_view(View::Activity);
                }
            }
        }

        _ => {}
    }
}
