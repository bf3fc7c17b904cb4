//! Native input over `Input.dispatch*Event`
//!
//! Tracks the mouse position and pressed modifiers for one page so that
//! button events land where the last move went and typed keys carry the
//! sticky modifier state.

use super::keys::{self, KeyDefinition, KEY_NULL};
use super::traits::CdpClient;
use super::types::{KeyEventParams, MouseEventParams};
use crate::session::{ClickKind, InputDevice, MouseButton, Point};
use crate::Error;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct InputState {
    position: Point,
    modifiers: i32,
}

/// CDP-backed input device
#[derive(Debug)]
pub struct CdpInput {
    client: Arc<dyn CdpClient>,
    state: Mutex<InputState>,
}

impl CdpInput {
    pub fn new(client: Arc<dyn CdpClient>) -> Self {
        Self {
            client,
            state: Mutex::new(InputState::default()),
        }
    }

    async fn dispatch_mouse(&self, params: MouseEventParams) -> Result<(), Error> {
        self.client
            .call_method("Input.dispatchMouseEvent", serde_json::to_value(params)?)
            .await?;
        Ok(())
    }

    async fn dispatch_key(&self, params: KeyEventParams) -> Result<(), Error> {
        self.client
            .call_method("Input.dispatchKeyEvent", serde_json::to_value(params)?)
            .await?;
        Ok(())
    }

    /// Press and release one key
    async fn stroke(&self, def: &KeyDefinition, text: Option<String>, modifiers: i32) -> Result<(), Error> {
        let key = if def.key.is_empty() {
            text.clone().unwrap_or_default()
        } else {
            def.key.to_string()
        };

        self.dispatch_key(KeyEventParams {
            r#type: if text.is_some() { "keyDown" } else { "rawKeyDown" },
            key: key.clone(),
            code: def.code.to_string(),
            text: text.clone(),
            unmodified_text: text,
            windows_virtual_key_code: def.key_code,
            modifiers,
        })
        .await?;

        self.dispatch_key(KeyEventParams {
            r#type: "keyUp",
            key,
            code: def.code.to_string(),
            text: None,
            unmodified_text: None,
            windows_virtual_key_code: def.key_code,
            modifiers,
        })
        .await
    }

    /// Press or release a modifier key
    async fn toggle_modifier(&self, state: &mut InputState, def: &KeyDefinition) -> Result<(), Error> {
        let pressed = state.modifiers & def.modifier != 0;
        if pressed {
            state.modifiers &= !def.modifier;
        } else {
            state.modifiers |= def.modifier;
        }

        self.dispatch_key(KeyEventParams {
            r#type: if pressed { "keyUp" } else { "rawKeyDown" },
            key: def.key.to_string(),
            code: def.code.to_string(),
            text: None,
            unmodified_text: None,
            windows_virtual_key_code: def.key_code,
            modifiers: state.modifiers,
        })
        .await
    }

    async fn release_modifiers(&self, state: &mut InputState) -> Result<(), Error> {
        for def in keys::modifier_keys() {
            if state.modifiers & def.modifier != 0 {
                self.toggle_modifier(state, def).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl InputDevice for CdpInput {
    async fn mouse_move(&self, point: Point) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        debug!("mouse move to ({}, {})", point.x, point.y);

        self.dispatch_mouse(MouseEventParams {
            r#type: "mouseMoved",
            x: point.x,
            y: point.y,
            button: "none",
            click_count: 0,
            modifiers: state.modifiers,
        })
        .await?;

        state.position = point;
        Ok(())
    }

    async fn mouse_button_click(&self, button: MouseButton, kind: ClickKind) -> Result<(), Error> {
        let state = self.state.lock().await;
        let events: &[(&'static str, u32)] = match kind {
            ClickKind::Click => &[("mousePressed", 1), ("mouseReleased", 1)],
            ClickKind::DoubleClick => &[
                ("mousePressed", 1),
                ("mouseReleased", 1),
                ("mousePressed", 2),
                ("mouseReleased", 2),
            ],
            ClickKind::Down => &[("mousePressed", 1)],
            ClickKind::Up => &[("mouseReleased", 1)],
        };

        for &(event_type, click_count) in events {
            self.dispatch_mouse(MouseEventParams {
                r#type: event_type,
                x: state.position.x,
                y: state.position.y,
                button: button.as_str(),
                click_count,
                modifiers: state.modifiers,
            })
            .await?;
        }

        Ok(())
    }

    async fn send_keys(&self, text: &str) -> Result<(), Error> {
        let mut state = self.state.lock().await;

        for ch in text.chars() {
            if ch == KEY_NULL {
                self.release_modifiers(&mut state).await?;
                continue;
            }

            match keys::special_key(ch) {
                Some(def) if def.modifier != 0 => self.toggle_modifier(&mut state, def).await?,
                Some(def) => {
                    self.stroke(def, def.text.map(str::to_string), state.modifiers)
                        .await?
                }
                None => {
                    let def = keys::printable_key(ch);
                    self.stroke(&def, Some(ch.to_string()), state.modifiers).await?
                }
            }
        }

        Ok(())
    }

    async fn clear_modifier_keys(&self) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        self.release_modifiers(&mut state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdp::client::CdpClientImpl;
    use crate::cdp::mock::MockCdpConnection;

    fn input() -> (Arc<MockCdpConnection>, CdpInput) {
        let connection = Arc::new(MockCdpConnection::new());
        let client = Arc::new(CdpClientImpl::new(connection.clone()));
        (connection, CdpInput::new(client))
    }

    #[tokio::test]
    async fn test_click_lands_at_last_move() {
        let (connection, input) = input();
        input.mouse_move(Point::new(60.0, 150.0)).await.unwrap();
        input
            .mouse_button_click(MouseButton::Left, ClickKind::Click)
            .await
            .unwrap();

        let events = connection.commands_for("Input.dispatchMouseEvent");
        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["type"], "mouseMoved");
        assert_eq!(events[1]["type"], "mousePressed");
        assert_eq!(events[1]["x"], 60.0);
        assert_eq!(events[1]["y"], 150.0);
        assert_eq!(events[1]["button"], "left");
        assert_eq!(events[2]["type"], "mouseReleased");
    }

    #[tokio::test]
    async fn test_double_click_counts() {
        let (connection, input) = input();
        input
            .mouse_button_click(MouseButton::Right, ClickKind::DoubleClick)
            .await
            .unwrap();

        let counts: Vec<_> = connection
            .commands_for("Input.dispatchMouseEvent")
            .iter()
            .map(|e| e["clickCount"].as_u64().unwrap())
            .collect();
        assert_eq!(counts, vec![1, 1, 2, 2]);
    }

    #[tokio::test]
    async fn test_plain_text_strokes() {
        let (connection, input) = input();
        input.send_keys("ab").await.unwrap();

        let events = connection.commands_for("Input.dispatchKeyEvent");
        assert_eq!(events.len(), 4);
        assert_eq!(events[0]["type"], "keyDown");
        assert_eq!(events[0]["text"], "a");
        assert_eq!(events[0]["windowsVirtualKeyCode"], 65);
        assert_eq!(events[1]["type"], "keyUp");
        assert_eq!(events[2]["key"], "b");
    }

    #[tokio::test]
    async fn test_modifiers_are_sticky_until_null() {
        let (connection, input) = input();
        input.send_keys("\u{E008}a\u{E000}b").await.unwrap();

        let events = connection.commands_for("Input.dispatchKeyEvent");
        // shift down, a down/up, shift up, b down/up
        assert_eq!(events.len(), 6);
        assert_eq!(events[0]["key"], "Shift");
        assert_eq!(events[1]["modifiers"], keys::MODIFIER_SHIFT);
        assert_eq!(events[3]["key"], "Shift");
        assert_eq!(events[3]["type"], "keyUp");
        assert_eq!(events[4]["modifiers"], 0);
    }

    #[tokio::test]
    async fn test_clear_modifier_keys_releases_pressed() {
        let (connection, input) = input();
        input.send_keys("\u{E009}\u{E00A}").await.unwrap();
        input.clear_modifier_keys().await.unwrap();
        input.clear_modifier_keys().await.unwrap();

        let events = connection.commands_for("Input.dispatchKeyEvent");
        let ups: Vec<_> = events.iter().filter(|e| e["type"] == "keyUp").collect();
        assert_eq!(ups.len(), 2);
    }

    #[tokio::test]
    async fn test_enter_sends_carriage_return() {
        let (connection, input) = input();
        input.send_keys("\u{E007}").await.unwrap();

        let events = connection.commands_for("Input.dispatchKeyEvent");
        assert_eq!(events[0]["key"], "Enter");
        assert_eq!(events[0]["text"], "\r");
        assert_eq!(events[0]["windowsVirtualKeyCode"], 13);
    }
}
