//! Actuator widgets built from the full dashboard context.
//!
//! Relays, servos and LEDs do not go through the reading-register pipeline;
//! each constructor reads the registers it needs directly. Implement
//! [`SpecializedWidgets`] to swap in different actuator widgets.

use fwdash_types::{Action, RegisterId, SpecializedKind, SpecializedProps, SpecializedWidget};
use tracing::warn;

use crate::dispatch::DashboardContext;

/// Constructors for the widgets that bypass the generic pipeline.
pub trait SpecializedWidgets: Send + Sync {
    /// Water pump driven by a relay.
    fn pump(&self, ctx: &DashboardContext<'_>) -> SpecializedWidget;

    fn servo(&self, ctx: &DashboardContext<'_>) -> SpecializedWidget;

    fn led(&self, ctx: &DashboardContext<'_>) -> SpecializedWidget;
}

/// Stock actuator widgets of the FWD-Edu kit.
#[derive(Debug, Clone, Copy, Default)]
pub struct FwdSpecializedWidgets;

impl SpecializedWidgets for FwdSpecializedWidgets {
    fn pump(&self, ctx: &DashboardContext<'_>) -> SpecializedWidget {
        let register = ctx.service.register(RegisterId::INTENSITY);
        let active = register.first_value().map(|v| v != 0.0);
        let on_toggle = Action::new(move || {
            let next = !active.unwrap_or(false);
            if let Err(e) = register.write(&[if next { 1.0 } else { 0.0 }]) {
                warn!(error = %e, "relay toggle rejected");
            }
            register.refresh();
        });
        SpecializedWidget {
            kind: SpecializedKind::Pump,
            color: ctx.color(),
            props: SpecializedProps::Pump { active, on_toggle },
        }
    }

    fn servo(&self, ctx: &DashboardContext<'_>) -> SpecializedWidget {
        let angle = ctx.service.register(RegisterId::VALUE).first_value();
        let enabled = ctx
            .service
            .register(RegisterId::INTENSITY)
            .first_value()
            .map(|v| v != 0.0);
        SpecializedWidget {
            kind: SpecializedKind::Servo,
            color: ctx.color(),
            props: SpecializedProps::Servo { angle, enabled },
        }
    }

    fn led(&self, ctx: &DashboardContext<'_>) -> SpecializedWidget {
        let brightness = ctx.service.register(RegisterId::INTENSITY).first_value();
        SpecializedWidget {
            kind: SpecializedKind::Led,
            color: ctx.color(),
            props: SpecializedProps::Led { brightness },
        }
    }
}
