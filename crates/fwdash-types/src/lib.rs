//! `fwdash-types` – shared data model for the fwdash dashboard.
//!
//! Holds the identifiers and enumerations every other crate agrees on
//! (service classes, register and event codes, catalog entries), the
//! render-time widget descriptors, and the workspace-wide [`DashError`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod widget;

pub use widget::{
    Action, ButtonProps, DialProps, FamilyProps, GenericWidget, LineProps, MeasurementKind,
    SpecializedKind, SpecializedProps, SpecializedWidget, Spinner, SvgButtonProps, WidgetColor,
    WidgetDescriptor, WidgetKind, WidgetProps,
};

// ─────────────────────────────────────────────────────────────────────────────
// Identifiers
// ─────────────────────────────────────────────────────────────────────────────

/// Stable identifier of a live device, e.g. its hardware serial.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(pub String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Product identifier announced by a device and listed by catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

/// Register address within a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegisterId(pub u16);

impl RegisterId {
    /// Generic "intensity" slot (relay active, servo enabled, LED brightness).
    pub const INTENSITY: RegisterId = RegisterId(0x01);
    /// Generic "value" slot (servo angle, LED pixels).
    pub const VALUE: RegisterId = RegisterId(0x02);
    /// Generic "reading" slot, used when a service declares no reading register.
    pub const READING: RegisterId = RegisterId(0x101);
    /// Rotary encoder clicks per full turn.
    pub const CLICKS_PER_TURN: RegisterId = RegisterId(0x180);
}

impl std::fmt::Display for RegisterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Event code within a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventCode(pub u8);

impl EventCode {
    /// Button pressed.
    pub const DOWN: EventCode = EventCode(0x01);
    /// Button released.
    pub const UP: EventCode = EventCode(0x02);
}

// ─────────────────────────────────────────────────────────────────────────────
// Service classes
// ─────────────────────────────────────────────────────────────────────────────

/// Service classes the dashboard knows how to present.
///
/// Every other 32-bit class identifier is carried as [`ServiceClass::Other`]
/// so that the mapping stays total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceClass {
    Distance,
    LightLevel,
    SoilMoisture,
    Button,
    RotaryEncoder,
    Relay,
    ReflectedLight,
    Servo,
    Led,
    DcCurrentMeasurement,
    DcVoltageMeasurement,
    Acidity,
    Temperature,
    Other(u32),
}

impl ServiceClass {
    const TABLE: [(ServiceClass, u32); 13] = [
        (ServiceClass::Distance, 0x141a_6b8a),
        (ServiceClass::LightLevel, 0x17dc_9a1c),
        (ServiceClass::SoilMoisture, 0x1d4a_a3b3),
        (ServiceClass::Button, 0x1473_a263),
        (ServiceClass::RotaryEncoder, 0x10fa_29c9),
        (ServiceClass::Relay, 0x183f_e656),
        (ServiceClass::ReflectedLight, 0x126c_4cb2),
        (ServiceClass::Servo, 0x12fc_9103),
        (ServiceClass::Led, 0x1609_d4f0),
        (ServiceClass::DcCurrentMeasurement, 0x1912_c8ae),
        (ServiceClass::DcVoltageMeasurement, 0x1633_ac19),
        (ServiceClass::Acidity, 0x1e97_78c5),
        (ServiceClass::Temperature, 0x1421_bac7),
    ];

    /// Map a wire-level service class identifier to a [`ServiceClass`].
    pub fn from_class_id(id: u32) -> Self {
        Self::TABLE
            .iter()
            .find(|(_, code)| *code == id)
            .map(|(class, _)| *class)
            .unwrap_or(ServiceClass::Other(id))
    }

    /// The wire-level service class identifier.
    pub fn class_id(&self) -> u32 {
        match self {
            ServiceClass::Other(id) => *id,
            known => Self::TABLE
                .iter()
                .find(|(class, _)| class == known)
                .map(|(_, code)| *code)
                .unwrap_or_default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

/// One entry of the device specification catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSpec {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Vendor name, e.g. `"Forward Education"`.
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub product_identifiers: Vec<ProductId>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// A single event reported by a service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub device: DeviceId,
    pub service_index: usize,
    pub code: EventCode,
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised at the edges of the dashboard (configuration, catalog and
/// layout parsing, register codecs, widget asset loading).
///
/// Rendering itself never fails; absent data is reported as `None`.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DashError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Catalog Error: {0}")]
    Catalog(String),

    #[error("Layout Error: {0}")]
    Layout(String),

    #[error("Codec Error on register {register}: {details}")]
    Codec { register: RegisterId, details: String },

    #[error("Asset Error for {kind}: {details}")]
    Asset { kind: String, details: String },

    #[error("I/O Error: {0}")]
    Io(String),
}
