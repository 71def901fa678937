//! Render-time widget descriptors.
//!
//! A [`WidgetDescriptor`] is recomputed on every render pass from the current
//! device state and handed to whatever draws the dashboard. Descriptors are
//! serialisable so that a non-Rust front end can consume them; invocable
//! [`Action`]s serialise as their "enabled" flag.

use std::sync::Arc;

use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::Schema;
use serde::{Serialize, Serializer};

/// Generic widget families, each drawn by a lazily loaded component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Sonar,
    Solar,
    SoilMoisture,
    DialButton,
    Touch,
    Line,
    Dial,
    DcCurrent,
    DcVoltage,
    Ph,
    Temperature,
    Default,
}

impl WidgetKind {
    /// Stable snake-case name, used for asset lookup.
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::Sonar => "sonar",
            WidgetKind::Solar => "solar",
            WidgetKind::SoilMoisture => "soil_moisture",
            WidgetKind::DialButton => "dial_button",
            WidgetKind::Touch => "touch",
            WidgetKind::Line => "line",
            WidgetKind::Dial => "dial",
            WidgetKind::DcCurrent => "dc_current",
            WidgetKind::DcVoltage => "dc_voltage",
            WidgetKind::Ph => "ph",
            WidgetKind::Temperature => "temperature",
            WidgetKind::Default => "default",
        }
    }
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Widgets built from the full dashboard context, outside the generic
/// value pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SpecializedKind {
    /// Water pump driven by a relay.
    Pump,
    Servo,
    Led,
}

/// Palette slot; `Secondary` marks services backed by a simulated server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WidgetColor {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    Current,
    Voltage,
}

// ─────────────────────────────────────────────────────────────────────────────
// Actions
// ─────────────────────────────────────────────────────────────────────────────

type Handler = Arc<dyn Fn() + Send + Sync>;

/// An optional UI callback. A disabled action is a safe no-op.
#[derive(Clone, Default)]
pub struct Action(Option<Handler>);

impl Action {
    pub fn new(handler: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Some(Arc::new(handler)))
    }

    pub fn disabled() -> Self {
        Self(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    /// Run the handler, if any.
    pub fn invoke(&self) {
        if let Some(handler) = &self.0 {
            handler();
        }
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.is_enabled() {
            "Action(<enabled>)"
        } else {
            "Action(<disabled>)"
        })
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_enabled())
    }
}

impl JsonSchema for Action {
    fn schema_name() -> String {
        "Action".to_string()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        <bool as JsonSchema>::json_schema(generator)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Props
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ButtonProps {
    pub checked: bool,
    pub label: String,
    pub on_down: Action,
    pub on_up: Action,
}

/// Accessible props for an SVG element acting as a push button.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SvgButtonProps {
    pub label: String,
    pub on_down: Action,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct LineProps {
    pub button: SvgButtonProps,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct DialProps {
    /// Raw encoder ticks.
    pub position: Option<f64>,
    /// Degrees; `None` while ticks or clicks-per-turn are unavailable.
    pub angle: Option<f64>,
}

/// Family-specific fields merged over the base props.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FamilyProps {
    Base,
    Button(ButtonProps),
    Line(LineProps),
    Dial(DialProps),
    Measurement { current_or_voltage: MeasurementKind },
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WidgetProps {
    pub color: WidgetColor,
    /// CSS size expression.
    pub size: String,
    pub value: Option<f64>,
    pub extra: FamilyProps,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GenericWidget {
    pub kind: WidgetKind,
    pub props: WidgetProps,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpecializedProps {
    Pump {
        active: Option<bool>,
        on_toggle: Action,
    },
    Servo {
        angle: Option<f64>,
        enabled: Option<bool>,
    },
    Led {
        brightness: Option<f64>,
    },
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SpecializedWidget {
    pub kind: SpecializedKind,
    pub color: WidgetColor,
    pub props: SpecializedProps,
}

/// Placeholder shown while a deferred widget loads.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Spinner {
    pub label: String,
    pub color: WidgetColor,
    pub size: String,
    pub indeterminate: bool,
    pub disable_shrink: bool,
}

impl Spinner {
    pub fn loading(color: WidgetColor) -> Self {
        Self {
            label: "loading...".to_string(),
            color,
            size: "1rem".to_string(),
            indeterminate: true,
            disable_shrink: true,
        }
    }
}

/// Result of one dispatch: the widget to draw for a service.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(tag = "render", rename_all = "snake_case")]
pub enum WidgetDescriptor {
    /// Drawn immediately; manages its own registers.
    Specialized(SpecializedWidget),
    /// Drawn behind a loading boundary showing `fallback` until ready.
    Deferred {
        widget: GenericWidget,
        fallback: Spinner,
    },
}

impl WidgetDescriptor {
    /// The generic widget, if this is a deferred descriptor.
    pub fn generic(&self) -> Option<&GenericWidget> {
        match self {
            WidgetDescriptor::Deferred { widget, .. } => Some(widget),
            WidgetDescriptor::Specialized(_) => None,
        }
    }

    pub fn specialized(&self) -> Option<&SpecializedWidget> {
        match self {
            WidgetDescriptor::Specialized(widget) => Some(widget),
            WidgetDescriptor::Deferred { .. } => None,
        }
    }
}
