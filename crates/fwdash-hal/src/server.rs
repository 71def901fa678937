//! Simulated service servers and the [`ServerRegistry`] that finds them.
//!
//! A server is an in-process stand-in for the firmware behind a service. It
//! shares the service's registers and event streams, so commanding a server
//! (pressing a simulated button, forcing a line-sensor reading) is visible to
//! the dashboard exactly like data reported by real hardware.

use std::collections::HashMap;
use std::sync::Arc;

use fwdash_types::{DashError, DeviceId, EventCode, RegisterId, ServiceClass};
use tracing::debug;

use crate::device::{Device, Service};
use crate::event::EventStream;
use crate::register::Register;

// ─────────────────────────────────────────────────────────────────────────────
// Button
// ─────────────────────────────────────────────────────────────────────────────

/// Simulated push button.
#[derive(Debug, Clone)]
pub struct ButtonServer {
    reading: Arc<Register>,
    down: EventStream,
    up: EventStream,
}

impl ButtonServer {
    pub fn new(service: &Service) -> Self {
        Self {
            reading: service.register(RegisterId::READING),
            down: service.event(EventCode::DOWN),
            up: service.event(EventCode::UP),
        }
    }

    /// Press the button: full pressure reading, then a Down event.
    pub fn down(&self) {
        if let Err(e) = self.reading.write(&[1.0]) {
            debug!(error = %e, "button reading not writable");
        }
        self.down.emit();
    }

    /// Release the button: zero pressure reading, then an Up event.
    pub fn up(&self) {
        if let Err(e) = self.reading.write(&[0.0]) {
            debug!(error = %e, "button reading not writable");
        }
        self.up.emit();
    }

    pub fn is_pressed(&self) -> bool {
        self.reading.first_value().is_some_and(|v| v > 0.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reading servers
// ─────────────────────────────────────────────────────────────────────────────

/// Simulated reflected-light (line) sensor.
#[derive(Debug, Clone)]
pub struct ReflectedLightServer {
    reading: Arc<Register>,
}

impl ReflectedLightServer {
    pub fn new(service: &Service) -> Self {
        Self {
            reading: service.register(RegisterId::READING),
        }
    }

    /// Force the sensor reading.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Codec`] when `values` do not fit the register.
    pub fn set_reading(&self, values: &[f64]) -> Result<(), DashError> {
        self.reading.write(values)
    }

    pub fn reading(&self) -> Option<f64> {
        self.reading.first_value()
    }
}

/// Simulated sensor of any other class; only its reading can be forced.
#[derive(Debug, Clone)]
pub struct SensorServer {
    class: ServiceClass,
    reading: Arc<Register>,
}

impl SensorServer {
    pub fn new(service: &Service) -> Self {
        Self {
            class: service.class(),
            reading: service.register(service.reading_register().unwrap_or(RegisterId::READING)),
        }
    }

    pub fn class(&self) -> ServiceClass {
        self.class
    }

    /// # Errors
    ///
    /// Returns [`DashError::Codec`] when `values` do not fit the register.
    pub fn set_reading(&self, values: &[f64]) -> Result<(), DashError> {
        self.reading.write(values)
    }
}

/// A simulated server, typed by the command surface it offers.
#[derive(Debug, Clone)]
pub enum ServiceServer {
    Button(ButtonServer),
    ReflectedLight(ReflectedLightServer),
    Sensor(SensorServer),
}

impl ServiceServer {
    /// Build the matching server for `service`.
    pub fn for_service(service: &Service) -> Self {
        match service.class() {
            ServiceClass::Button => ServiceServer::Button(ButtonServer::new(service)),
            ServiceClass::ReflectedLight => {
                ServiceServer::ReflectedLight(ReflectedLightServer::new(service))
            }
            _ => ServiceServer::Sensor(SensorServer::new(service)),
        }
    }

    pub fn as_button(&self) -> Option<&ButtonServer> {
        match self {
            ServiceServer::Button(server) => Some(server),
            _ => None,
        }
    }

    pub fn as_reflected_light(&self) -> Option<&ReflectedLightServer> {
        match self {
            ServiceServer::ReflectedLight(server) => Some(server),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Looks up the simulated server backing a service, if any.
#[derive(Debug, Default)]
pub struct ServerRegistry {
    servers: HashMap<(DeviceId, usize), ServiceServer>,
}

impl ServerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `server` for `service`. Any previous server for the same
    /// service is replaced.
    pub fn register(&mut self, service: &Service, server: ServiceServer) {
        self.servers
            .insert((service.device_id().clone(), service.index()), server);
    }

    /// Create and register simulated servers for every service of `device`.
    pub fn serve_device(&mut self, device: &Device) {
        for service in device.services() {
            self.register(service, ServiceServer::for_service(service));
        }
    }

    pub fn server_for(&self, service: &Service) -> Option<&ServiceServer> {
        self.servers
            .get(&(service.device_id().clone(), service.index()))
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
