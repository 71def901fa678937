//! Interaction state builders.
//!
//! Each builder derives the family-specific props of one widget family from
//! live service data:
//!
//! | Builder | Family | Derived props |
//! |---|---|---|
//! | [`ButtonState`] | touch / dial-button | pressed flag from Down/Up events, server press actions |
//! | [`line_props`] | line detector | toggle action forcing the simulated reading |
//! | [`dial_props`] | dial | rotation angle from ticks and clicks-per-turn |
//!
//! Only [`ButtonState`] keeps state between renders; it lives in
//! [`InteractionState`], which the mounted widget owns.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use fwdash_hal::{ButtonServer, EventStream, ReflectedLightServer, Register, Service, Subscription};
use fwdash_types::{
    Action, ButtonProps, DialProps, EventCode, LineProps, RegisterId, SvgButtonProps,
};
use tracing::{debug, warn};

pub const BUTTON_DOWN_LABEL: &str = "button down";
pub const BUTTON_UP_LABEL: &str = "button up";
pub const LINE_DETECTOR_LABEL: &str = "line detector";

// ─────────────────────────────────────────────────────────────────────────────
// Button
// ─────────────────────────────────────────────────────────────────────────────

/// A live subscription together with the stream it is attached to.
struct Tracked {
    stream: EventStream,
    _subscription: Subscription,
}

/// Press state of a button service, fed by its Down and Up events.
///
/// Subscriptions are held for as long as the state lives and are replaced
/// only when the service hands out a different event stream.
pub struct ButtonState {
    pressed: Arc<AtomicBool>,
    down: Option<Tracked>,
    up: Option<Tracked>,
}

impl Default for ButtonState {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonState {
    pub fn new() -> Self {
        Self {
            pressed: Arc::new(AtomicBool::new(false)),
            down: None,
            up: None,
        }
    }

    /// Attach to the Down/Up streams of `service`, re-subscribing only when a
    /// stream's identity changed since the last call.
    ///
    /// Moving to a different service clears the pressed flag; the new button
    /// reads as released until it reports a Down event.
    pub fn sync(&mut self, service: &Service) {
        let down = service.event(EventCode::DOWN);
        if self
            .down
            .as_ref()
            .is_some_and(|tracked| !tracked.stream.same_stream(&down))
        {
            self.pressed.store(false, Ordering::SeqCst);
        }
        Self::track(&mut self.down, down, &self.pressed, true);
        Self::track(&mut self.up, service.event(EventCode::UP), &self.pressed, false);
    }

    fn track(slot: &mut Option<Tracked>, stream: EventStream, pressed: &Arc<AtomicBool>, on: bool) {
        if slot
            .as_ref()
            .is_some_and(|tracked| tracked.stream.same_stream(&stream))
        {
            return;
        }
        debug!(code = stream.code().0, "button state subscribing");
        // Release the stale subscription before attaching the new one.
        *slot = None;
        let flag = pressed.clone();
        let subscription = stream.subscribe(move |_| flag.store(on, Ordering::SeqCst));
        *slot = Some(Tracked {
            stream,
            _subscription: subscription,
        });
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed.load(Ordering::SeqCst)
    }

    /// Props for the current render. Without a simulated server the press
    /// actions are disabled no-ops.
    pub fn props(&self, server: Option<&ButtonServer>) -> ButtonProps {
        let pressed = self.is_pressed();
        let (on_down, on_up) = match server {
            Some(server) => {
                let down = server.clone();
                let up = server.clone();
                (Action::new(move || down.down()), Action::new(move || up.up()))
            }
            None => (Action::disabled(), Action::disabled()),
        };
        ButtonProps {
            checked: pressed,
            label: if pressed { BUTTON_DOWN_LABEL } else { BUTTON_UP_LABEL }.to_string(),
            on_down,
            on_up,
        }
    }
}

impl std::fmt::Debug for ButtonState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ButtonState")
            .field("pressed", &self.is_pressed())
            .field("subscribed", &(self.down.is_some() && self.up.is_some()))
            .finish()
    }
}

/// Transient interaction state owned by one mounted service widget.
#[derive(Debug, Default)]
pub struct InteractionState {
    button: Option<ButtonState>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The button state, created and synced with `service` on demand.
    pub fn button(&mut self, service: &Service) -> &mut ButtonState {
        let state = self.button.get_or_insert_with(ButtonState::new);
        state.sync(service);
        state
    }

    /// Drop every held subscription.
    pub fn release(&mut self) {
        self.button = None;
    }

    pub fn has_button(&self) -> bool {
        self.button.is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Line detector
// ─────────────────────────────────────────────────────────────────────────────

/// Value the line toggle writes: `0` over a line, `1.0` otherwise.
fn toggled_reading(value: Option<f64>) -> f64 {
    if value.is_some_and(|v| v > 0.0) {
        0.0
    } else {
        1.0
    }
}

/// Props for the line widget. Its single button flips the simulated reading
/// and asks the register for a fresh report; without a server the button is
/// disabled.
pub fn line_props(
    value: Option<f64>,
    register: &Arc<Register>,
    server: Option<&ReflectedLightServer>,
) -> LineProps {
    let on_down = match server {
        Some(server) => {
            let server = server.clone();
            let register = register.clone();
            Action::new(move || {
                let next = toggled_reading(value);
                if let Err(e) = server.set_reading(&[next]) {
                    warn!(error = %e, "line detector toggle rejected");
                }
                register.refresh();
            })
        }
        None => Action::disabled(),
    };
    LineProps {
        button: SvgButtonProps {
            label: LINE_DETECTOR_LABEL.to_string(),
            on_down,
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dial
// ─────────────────────────────────────────────────────────────────────────────

/// Props for the dial widget.
///
/// Clicks per turn come from the encoder's configuration register, falling
/// back to `default_clicks_per_turn` while unreported. The angle is `None`
/// while the tick count is unknown or clicks per turn is zero.
pub fn dial_props(value: Option<f64>, service: &Service, default_clicks_per_turn: u16) -> DialProps {
    let clicks_per_turn = service
        .register(RegisterId::CLICKS_PER_TURN)
        .first_value()
        .unwrap_or(f64::from(default_clicks_per_turn));
    let angle = value
        .filter(|_| clicks_per_turn != 0.0)
        .map(|ticks| ticks / clicks_per_turn * 360.0);
    DialProps {
        position: value,
        angle,
    }
}
