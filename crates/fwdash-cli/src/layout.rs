//! Layout files: a device catalog plus the devices currently on the bus.
//!
//! ```json
//! {
//!   "catalog": [
//!     { "id": "fwd-sonar", "name": "Sonar", "company": "Forward Education",
//!       "productIdentifiers": [987654321] }
//!   ],
//!   "devices": [
//!     { "id": "sonar-1", "productIdentifier": 987654321,
//!       "services": [ { "serviceClass": "0x141a6b8a", "reading": [0.42] } ] }
//!   ]
//! }
//! ```
//!
//! Service classes and register ids are numbers or `0x` hex strings. Devices
//! are simulated unless `"hardware": true`.

use std::collections::BTreeMap;
use std::path::Path;

use fwdash_hal::{Fleet, SimDevice, SimRegistry, StaticCatalog};
use fwdash_types::{DashError, DeviceSpec, RegisterId, ServiceClass};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NumericId {
    Number(u64),
    Text(String),
}

impl NumericId {
    fn value(&self) -> Result<u64, DashError> {
        match self {
            NumericId::Number(n) => Ok(*n),
            NumericId::Text(text) => parse_id(text),
        }
    }
}

fn parse_id(text: &str) -> Result<u64, DashError> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| DashError::Layout(format!("invalid id '{text}': {e}")))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutService {
    service_class: NumericId,
    #[serde(default)]
    reading: Option<Vec<f64>>,
    #[serde(default)]
    registers: BTreeMap<String, Vec<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutDevice {
    id: String,
    #[serde(default)]
    product_identifier: Option<u32>,
    #[serde(default)]
    hardware: bool,
    #[serde(default)]
    services: Vec<LayoutService>,
}

/// Parsed layout file.
#[derive(Debug, Clone, Deserialize)]
pub struct Layout {
    #[serde(default)]
    catalog: Vec<DeviceSpec>,
    #[serde(default)]
    devices: Vec<LayoutDevice>,
}

impl Layout {
    pub fn from_json(json: &str) -> Result<Self, DashError> {
        serde_json::from_str(json).map_err(|e| DashError::Layout(format!("invalid layout: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self, DashError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DashError::Io(format!("failed to read {}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn catalog(&self) -> StaticCatalog {
        StaticCatalog::new(self.catalog.clone())
    }

    /// Build the devices and their simulated servers.
    pub fn fleet(&self) -> Result<Fleet, DashError> {
        let mut registry = SimRegistry::new();
        for device in &self.devices {
            registry = registry.with_device(sim_device(device)?);
        }
        registry.build()
    }
}

fn sim_device(layout: &LayoutDevice) -> Result<SimDevice, DashError> {
    let mut device = SimDevice::new(layout.id.clone());
    if let Some(product) = layout.product_identifier {
        device = device.with_product_identifier(product);
    }
    if layout.hardware {
        device = device.hardware();
    }
    for service in &layout.services {
        let class_id = u32::try_from(service.service_class.value()?).map_err(|_| {
            DashError::Layout(format!("service class of '{}' out of range", layout.id))
        })?;
        device = device.with_service(ServiceClass::from_class_id(class_id));
        if let Some(reading) = &service.reading {
            device = device.with_reading(reading);
        }
        for (key, values) in &service.registers {
            let id = u16::try_from(parse_id(key)?).map_err(|_| {
                DashError::Layout(format!("register '{key}' of '{}' out of range", layout.id))
            })?;
            device = device.with_register(RegisterId(id), values);
        }
    }
    Ok(device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwdash_hal::DeviceCatalog;
    use fwdash_types::ProductId;

    const LAYOUT: &str = r#"{
        "catalog": [
            { "id": "fwd-sonar", "name": "Sonar", "company": "Forward Education",
              "productIdentifiers": [1001] }
        ],
        "devices": [
            { "id": "sonar-1", "productIdentifier": 1001,
              "services": [ { "serviceClass": "0x141a6b8a", "reading": [0.42] } ] },
            { "id": "knob", "hardware": true,
              "services": [
                { "serviceClass": 284830153, "registers": { "0x180": [40] } },
                { "serviceClass": "0x1473a263" }
              ] }
        ]
    }"#;

    #[test]
    fn builds_catalog_and_fleet() {
        let layout = Layout::from_json(LAYOUT).unwrap();
        let catalog = layout.catalog();
        assert_eq!(catalog.specifications().len(), 1);
        assert_eq!(catalog.specifications()[0].product_identifiers, vec![ProductId(1001)]);

        let fleet = layout.fleet().unwrap();
        let sonar = fleet.device("sonar-1").unwrap();
        assert_eq!(sonar.product_identifier(), Some(ProductId(1001)));
        assert_eq!(sonar.service_class_at(0), Some(ServiceClass::Distance));
        let reading = sonar
            .service(0)
            .unwrap()
            .register(RegisterId::READING)
            .first_value()
            .unwrap();
        assert!((reading - 0.42).abs() < 1e-4);
        assert!(fleet.servers.server_for(sonar.service(0).unwrap()).is_some());

        let knob = fleet.device("knob").unwrap();
        assert_eq!(knob.service_class_at(0), Some(ServiceClass::RotaryEncoder));
        assert_eq!(knob.service_class_at(1), Some(ServiceClass::Button));
        assert_eq!(
            knob.service(0).unwrap().register(RegisterId::CLICKS_PER_TURN).first_value(),
            Some(40.0)
        );
        assert!(fleet.servers.server_for(knob.service(1).unwrap()).is_none());
    }

    #[test]
    fn unknown_class_is_kept() {
        let layout = Layout::from_json(
            r#"{ "devices": [ { "id": "x", "services": [ { "serviceClass": 7 } ] } ] }"#,
        )
        .unwrap();
        let fleet = layout.fleet().unwrap();
        assert_eq!(
            fleet.device("x").unwrap().service_class_at(0),
            Some(ServiceClass::Other(7))
        );
    }

    #[test]
    fn bad_ids_are_layout_errors() {
        let layout = Layout::from_json(
            r#"{ "devices": [ { "id": "x", "services": [ { "serviceClass": "0xzz" } ] } ] }"#,
        )
        .unwrap();
        assert!(matches!(layout.fleet(), Err(DashError::Layout(_))));

        let layout = Layout::from_json(
            r#"{ "devices": [ { "id": "x", "services": [
                { "serviceClass": 1, "registers": { "0x10000": [1] } } ] } ] }"#,
        )
        .unwrap();
        assert!(matches!(layout.fleet(), Err(DashError::Layout(_))));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(Layout::from_json("{ nope"), Err(DashError::Layout(_))));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("layout.json");
        std::fs::write(&path, LAYOUT).unwrap();
        assert!(Layout::load(&path).is_ok());
        assert!(matches!(
            Layout::load(&dir.path().join("missing.json")),
            Err(DashError::Io(_))
        ));
    }
}
