//! In-process simulated devices for tests, demos and CI.
//!
//! [`SimRegistry`] builds a [`Fleet`]: a set of [`Device`]s with seeded
//! register values, plus a [`ServerRegistry`] holding a simulated server for
//! every service of every simulated device. Devices marked
//! [`hardware`](SimDevice::hardware) get no servers, which is how a test
//! stands in for a real peripheral.
//!
//! # Example
//!
//! ```rust
//! use fwdash_hal::sim::{SimDevice, SimRegistry};
//! use fwdash_types::ServiceClass;
//!
//! let fleet = SimRegistry::new()
//!     .with_device(
//!         SimDevice::new("sonar-1")
//!             .with_product_identifier(5)
//!             .with_service(ServiceClass::Distance)
//!             .with_reading(&[0.42]),
//!     )
//!     .build()
//!     .expect("valid simulated fleet");
//!
//! assert_eq!(fleet.devices.len(), 1);
//! assert_eq!(fleet.servers.len(), 1);
//! ```

use fwdash_types::{DashError, DeviceId, ProductId, RegisterId, ServiceClass};

use crate::device::Device;
use crate::server::ServerRegistry;

/// Seeded register values of a simulated service.
#[derive(Debug, Clone)]
struct SimService {
    class: ServiceClass,
    registers: Vec<(Option<RegisterId>, Vec<f64>)>,
}

/// Builder for one simulated device.
#[derive(Debug, Clone)]
pub struct SimDevice {
    id: String,
    product: Option<ProductId>,
    simulated: bool,
    services: Vec<SimService>,
    orphan_values: bool,
}

impl SimDevice {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            product: None,
            simulated: true,
            services: Vec::new(),
            orphan_values: false,
        }
    }

    pub fn with_product_identifier(mut self, product: u32) -> Self {
        self.product = Some(ProductId(product));
        self
    }

    /// Treat the device as real hardware: no simulated servers are created.
    pub fn hardware(mut self) -> Self {
        self.simulated = false;
        self
    }

    /// Append a service at the next index.
    pub fn with_service(mut self, class: ServiceClass) -> Self {
        self.services.push(SimService {
            class,
            registers: Vec::new(),
        });
        self
    }

    /// Seed the reading register of the most recently added service.
    pub fn with_reading(self, values: &[f64]) -> Self {
        self.seed(None, values)
    }

    /// Seed register `id` of the most recently added service.
    pub fn with_register(self, id: RegisterId, values: &[f64]) -> Self {
        self.seed(Some(id), values)
    }

    fn seed(mut self, id: Option<RegisterId>, values: &[f64]) -> Self {
        match self.services.last_mut() {
            Some(service) => service.registers.push((id, values.to_vec())),
            None => self.orphan_values = true,
        }
        self
    }
}

/// Devices and servers produced by [`SimRegistry::build`].
#[derive(Debug, Default)]
pub struct Fleet {
    pub devices: Vec<Device>,
    pub servers: ServerRegistry,
}

impl Fleet {
    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id().as_str() == id)
    }
}

/// Builder that assembles a [`Fleet`] of simulated devices.
#[derive(Debug, Default)]
pub struct SimRegistry {
    devices: Vec<SimDevice>,
}

impl SimRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: SimDevice) -> Self {
        self.devices.push(device);
        self
    }

    /// Consume the builder and return the populated [`Fleet`].
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Layout`] when values were seeded before any
    /// service was added or device ids repeat, and [`DashError::Codec`] when
    /// a seeded value does not fit its register.
    pub fn build(self) -> Result<Fleet, DashError> {
        let mut fleet = Fleet::default();
        for spec in self.devices {
            if spec.orphan_values {
                return Err(DashError::Layout(format!(
                    "device '{}' seeds register values before declaring a service",
                    spec.id
                )));
            }
            if fleet.device(&spec.id).is_some() {
                return Err(DashError::Layout(format!("duplicate device id '{}'", spec.id)));
            }

            let mut device = Device::new(DeviceId::new(spec.id));
            if let Some(product) = spec.product {
                device = device.with_product_identifier(product);
            }
            for sim_service in &spec.services {
                let service = device.add_service(sim_service.class);
                for (id, values) in &sim_service.registers {
                    let id = id
                        .or(service.reading_register())
                        .unwrap_or(RegisterId::READING);
                    service.register(id).write(values)?;
                }
            }
            if spec.simulated {
                fleet.servers.serve_device(&device);
            }
            fleet.devices.push(device);
        }
        Ok(fleet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_reading_and_named_registers() {
        let fleet = SimRegistry::new()
            .with_device(
                SimDevice::new("enc")
                    .with_service(ServiceClass::RotaryEncoder)
                    .with_reading(&[10.0])
                    .with_register(RegisterId::CLICKS_PER_TURN, &[40.0]),
            )
            .build()
            .unwrap();

        let service = fleet.device("enc").unwrap().service(0).unwrap();
        assert_eq!(service.register(RegisterId::READING).first_value(), Some(10.0));
        assert_eq!(
            service.register(RegisterId::CLICKS_PER_TURN).first_value(),
            Some(40.0)
        );
    }

    #[test]
    fn hardware_devices_get_no_servers() {
        let fleet = SimRegistry::new()
            .with_device(SimDevice::new("real").hardware().with_service(ServiceClass::Button))
            .with_device(SimDevice::new("sim").with_service(ServiceClass::Button))
            .build()
            .unwrap();

        let real = fleet.device("real").unwrap().service(0).unwrap();
        let sim = fleet.device("sim").unwrap().service(0).unwrap();
        assert!(fleet.servers.server_for(real).is_none());
        assert!(fleet.servers.server_for(sim).is_some());
    }

    #[test]
    fn orphan_values_are_rejected() {
        let result = SimRegistry::new()
            .with_device(SimDevice::new("bad").with_reading(&[1.0]))
            .build();
        assert!(matches!(result, Err(DashError::Layout(_))));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = SimRegistry::new()
            .with_device(SimDevice::new("dup"))
            .with_device(SimDevice::new("dup"))
            .build();
        assert!(matches!(result, Err(DashError::Layout(_))));
    }

    #[test]
    fn unpackable_seed_is_codec_error() {
        let result = SimRegistry::new()
            .with_device(
                SimDevice::new("enc")
                    .with_service(ServiceClass::RotaryEncoder)
                    .with_register(RegisterId::CLICKS_PER_TURN, &[-1.0]),
            )
            .build();
        assert!(matches!(result, Err(DashError::Codec { .. })));
    }
}
