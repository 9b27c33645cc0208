//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_identifier_char, can_add_password_char, can_add_token_char, App, AppState, LoginFocus,
};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1)) {
                app.state = AppState::LoggingIn;
            }
            Ok(false)
        }
        // The page is going away; only quitting is allowed
        AppState::Redirecting => Ok(matches!(key.code, KeyCode::Esc | KeyCode::Enter)),
        AppState::Quitting => Ok(true),
        AppState::LoggingIn => handle_login_input(app, key),
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let verification = app.show_verification();
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::F(1) => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::F(2) => {
            app.toggle_password_visibility();
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = app.login_focus.next(verification);
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = app.login_focus.prev(verification);
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Button => {
                // No-op while submitting, like a disabled button
                app.submit_login();
            }
            focus => {
                app.login_focus = focus.next(verification);
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Identifier => {
                app.login_identifier.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Verification => {
                if let Some(ref field) = app.verification {
                    field.pop();
                }
            }
            LoginFocus::Remember | LoginFocus::Button => {}
        },
        KeyCode::Char(' ') if app.login_focus == LoginFocus::Remember => {
            app.remember = !app.remember;
        }
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Identifier => {
                if can_add_identifier_char(app.login_identifier.chars().count(), c) {
                    app.login_identifier.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Verification => {
                if let Some(ref field) = app.verification {
                    if can_add_token_char(field.len(), c) {
                        field.push(c);
                    }
                }
            }
            LoginFocus::Remember | LoginFocus::Button => {
                // Ignore character input on toggles/buttons
            }
        },
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use telein_core::Config;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn app() -> App {
        let mut config = Config::default();
        config.recaptcha_site_key = Some("site-key".to_string());
        let mut app = App::new(config).await.expect("app should build");
        app.login_identifier.clear();
        app.login_focus = LoginFocus::Identifier;
        app
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_input(app, key(KeyCode::Char(c))).expect("input should succeed");
        }
    }

    #[tokio::test]
    async fn typing_fills_focused_fields() {
        let mut app = app().await;

        type_text(&mut app, "user@example.com");
        handle_input(&mut app, key(KeyCode::Enter)).expect("input should succeed");
        type_text(&mut app, "pw 123");
        handle_input(&mut app, key(KeyCode::Backspace)).expect("input should succeed");

        assert_eq!(app.login_identifier, "user@example.com");
        assert_eq!(app.login_password, "pw 12");
        assert_eq!(app.login_focus, LoginFocus::Password);
    }

    #[tokio::test]
    async fn space_toggles_remember() {
        let mut app = app().await;
        app.login_focus = LoginFocus::Remember;
        let before = app.remember;

        handle_input(&mut app, key(KeyCode::Char(' '))).expect("input should succeed");
        assert_eq!(app.remember, !before);
    }

    #[tokio::test]
    async fn verification_field_edits_shared_token() {
        let mut app = app().await;
        app.login_focus = LoginFocus::Verification;

        type_text(&mut app, "tok 1");

        let field = app.verification.clone().expect("verification enabled");
        assert_eq!(field.value(), "tok1");
    }

    #[tokio::test]
    async fn f2_toggles_password_visibility() {
        let mut app = app().await;
        app.login_focus = LoginFocus::Password;
        type_text(&mut app, "segredo");
        assert!(!app.show_password);

        handle_input(&mut app, key(KeyCode::F(2))).expect("input should succeed");
        assert!(app.show_password);
        // Toggling does not touch the typed password or focus
        assert_eq!(app.login_password, "segredo");
        assert_eq!(app.login_focus, LoginFocus::Password);

        handle_input(&mut app, key(KeyCode::F(2))).expect("input should succeed");
        assert!(!app.show_password);
    }

    #[tokio::test]
    async fn escape_quits_and_help_toggles() {
        let mut app = app().await;

        assert!(!handle_input(&mut app, key(KeyCode::F(1))).expect("input should succeed"));
        assert_eq!(app.state, AppState::ShowingHelp);
        assert!(!handle_input(&mut app, key(KeyCode::Esc)).expect("input should succeed"));
        assert_eq!(app.state, AppState::LoggingIn);

        assert!(handle_input(&mut app, key(KeyCode::Esc)).expect("input should succeed"));
        assert_eq!(app.state, AppState::Quitting);
    }
}
