//! The dispatch engine: turns one service into one widget descriptor.
//!
//! # Decision order
//!
//! 1. Relay, servo and LED services go straight to their
//!    [`SpecializedWidgets`] constructor.
//! 2. Everything else gets base props: color (`Secondary` when a simulated
//!    server backs the service), nominal size, and the first value of the
//!    reading register.
//! 3. The family from the [factory table](crate::factory) rescales the value,
//!    picks the size band and merges in the interaction props.
//! 4. The result is wrapped in a deferred descriptor carrying the loading
//!    spinner.
//!
//! Dispatch never fails. Unknown classes render the default widget and
//! unreported registers yield `value: None`.

use fwdash_hal::{Device, ServerRegistry, Service, ServiceServer};
use fwdash_types::{
    FamilyProps, GenericWidget, ServiceClass, SpecializedKind, Spinner,
    WidgetColor, WidgetDescriptor, WidgetProps,
};
use tracing::debug;

use crate::config::{SizeBand, WidgetConfig};
use crate::factory::{GenericFactory, WidgetFactory, factory_for};
use crate::interaction::{InteractionState, dial_props, line_props};
use crate::specialized::SpecializedWidgets;
use crate::value::read_value;

/// Everything a widget may look at while rendering one service.
#[derive(Clone, Copy)]
pub struct DashboardContext<'a> {
    pub device: &'a Device,
    pub service: &'a Service,
    pub servers: &'a ServerRegistry,
    pub config: &'a WidgetConfig,
    pub specialized: &'a dyn SpecializedWidgets,
}

impl<'a> DashboardContext<'a> {
    /// Simulated server backing the service, if any.
    pub fn server(&self) -> Option<&'a ServiceServer> {
        self.servers.server_for(self.service)
    }

    pub fn color(&self) -> WidgetColor {
        if self.server().is_some() {
            WidgetColor::Secondary
        } else {
            WidgetColor::Primary
        }
    }

    fn size(&self, band: SizeBand) -> String {
        self.config.size_bands.get(band).to_string()
    }
}

/// `true` when the service right before `service` on its device is a rotary
/// encoder, which turns a button into the dial-button widget.
///
/// Relies on service order; a device that reorders its services changes the
/// outcome.
pub fn is_rotary_variant(device: &Device, service: &Service) -> bool {
    service
        .index()
        .checked_sub(1)
        .and_then(|previous| device.service_class_at(previous))
        == Some(ServiceClass::RotaryEncoder)
}

/// Select and build the widget for `ctx.service`.
///
/// `interaction` carries state that must survive between renders of the
/// same service (button subscriptions); families that do not need it have it
/// released.
pub fn dispatch(ctx: &DashboardContext<'_>, interaction: &mut InteractionState) -> WidgetDescriptor {
    let service = ctx.service;
    let family = match factory_for(service.class()) {
        WidgetFactory::Specialized(kind) => {
            interaction.release();
            debug!(device = %service.device_id(), index = service.index(), ?kind, "specialized widget");
            let widget = match kind {
                SpecializedKind::Pump => ctx.specialized.pump(ctx),
                SpecializedKind::Servo => ctx.specialized.servo(ctx),
                SpecializedKind::Led => ctx.specialized.led(ctx),
            };
            return WidgetDescriptor::Specialized(widget);
        }
        WidgetFactory::Generic(family) => family,
    };

    let server = ctx.server();
    let color = ctx.color();
    let reading = read_value(service);
    let base = WidgetProps {
        color,
        size: ctx.size(SizeBand::Nominal),
        value: reading.value,
        extra: FamilyProps::Base,
    };

    let sized = |props: WidgetProps| WidgetProps {
        size: ctx.size(family.size_band()),
        ..props
    };

    let rotary_variant = family == GenericFactory::Button && is_rotary_variant(ctx.device, service);
    if family != GenericFactory::Button {
        interaction.release();
    }

    let props = match family {
        GenericFactory::Sonar => sized(WidgetProps {
            value: base.value.map(|meters| meters * 100.0),
            ..base
        }),
        GenericFactory::Solar | GenericFactory::Default => base,
        GenericFactory::SoilMoisture | GenericFactory::Ph | GenericFactory::Temperature => {
            sized(base)
        }
        GenericFactory::Button => {
            let button = interaction
                .button(service)
                .props(server.and_then(ServiceServer::as_button));
            WidgetProps {
                extra: FamilyProps::Button(button),
                ..base
            }
        }
        GenericFactory::Line => sized(WidgetProps {
            extra: FamilyProps::Line(line_props(
                reading.value,
                &reading.register,
                server.and_then(ServiceServer::as_reflected_light),
            )),
            ..base
        }),
        GenericFactory::Dial => WidgetProps {
            extra: FamilyProps::Dial(dial_props(
                reading.value,
                service,
                ctx.config.default_clicks_per_turn,
            )),
            ..base
        },
        GenericFactory::DcCurrent | GenericFactory::DcVoltage => WidgetProps {
            extra: family
                .measurement()
                .map_or(FamilyProps::Base, |current_or_voltage| FamilyProps::Measurement {
                    current_or_voltage,
                }),
            ..base
        },
    };

    let kind = family.kind(rotary_variant);
    debug!(
        device = %service.device_id(),
        index = service.index(),
        %kind,
        value = ?props.value,
        "generic widget"
    );
    WidgetDescriptor::Deferred {
        widget: GenericWidget { kind, props },
        fallback: Spinner::loading(color),
    }
}
