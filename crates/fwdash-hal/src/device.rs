//! [`Device`] and [`Service`] – the live device model read by the dashboard.
//!
//! A device owns an ordered list of services. Each service lazily creates the
//! registers and event streams it is asked for, so widgets can ask for a
//! register before the device has reported it; such registers simply unpack
//! to `None` until data arrives.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use fwdash_types::{DeviceId, EventCode, ProductId, RegisterId, ServiceClass};

use crate::event::EventStream;
use crate::register::{PackFormat, Register};

/// Field formats of the registers the dashboard reads, per service class.
///
/// Registers not listed here get no format and never unpack.
pub fn default_register_formats(class: ServiceClass, id: RegisterId) -> Vec<PackFormat> {
    use PackFormat::*;
    use ServiceClass::*;

    match (class, id) {
        (Distance, RegisterId::READING) => vec![U16_16],
        (LightLevel, RegisterId::READING) => vec![U0_16],
        (SoilMoisture, RegisterId::READING) => vec![U0_16],
        (Button, RegisterId::READING) => vec![U0_16],
        (RotaryEncoder, RegisterId::READING) => vec![I32],
        (RotaryEncoder, RegisterId::CLICKS_PER_TURN) => vec![U16],
        (ReflectedLight, RegisterId::READING) => vec![U0_16],
        (DcCurrentMeasurement, RegisterId::READING) => vec![F64],
        (DcVoltageMeasurement, RegisterId::READING) => vec![F64],
        (Acidity, RegisterId::READING) => vec![U4_12],
        (Temperature, RegisterId::READING) => vec![I22_10],
        (Relay, RegisterId::INTENSITY) => vec![Bool],
        (Servo, RegisterId::INTENSITY) => vec![Bool],
        (Servo, RegisterId::VALUE) => vec![I16_16],
        (Led, RegisterId::INTENSITY) => vec![U0_8],
        _ => Vec::new(),
    }
}

/// Classes that declare the generic reading register.
fn declares_reading(class: ServiceClass) -> bool {
    !matches!(
        class,
        ServiceClass::Relay | ServiceClass::Servo | ServiceClass::Led | ServiceClass::Other(_)
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Service
// ─────────────────────────────────────────────────────────────────────────────

/// One functional unit of a device.
#[derive(Debug)]
pub struct Service {
    device: DeviceId,
    index: usize,
    class: ServiceClass,
    reading_register: Option<RegisterId>,
    registers: RwLock<BTreeMap<RegisterId, Arc<Register>>>,
    events: Mutex<HashMap<EventCode, EventStream>>,
}

impl Service {
    /// Create a service. Sensor classes declare [`RegisterId::READING`] as
    /// their reading register; actuators and unknown classes declare none.
    pub fn new(device: DeviceId, index: usize, class: ServiceClass) -> Self {
        Self {
            device,
            index,
            class,
            reading_register: declares_reading(class).then_some(RegisterId::READING),
            registers: RwLock::new(BTreeMap::new()),
            events: Mutex::new(HashMap::new()),
        }
    }

    /// Override the declared reading register (`None` for none).
    pub fn with_reading_register(mut self, id: Option<RegisterId>) -> Self {
        self.reading_register = id;
        self
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn class(&self) -> ServiceClass {
        self.class
    }

    pub fn reading_register(&self) -> Option<RegisterId> {
        self.reading_register
    }

    /// Get the register `id`, creating an empty one on first access.
    pub fn register(&self, id: RegisterId) -> Arc<Register> {
        if let Some(existing) = self
            .registers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return existing.clone();
        }
        self.registers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_insert_with(|| Arc::new(Register::new(id, default_register_formats(self.class, id))))
            .clone()
    }

    /// Get the event stream for `code`, creating it on first access.
    pub fn event(&self, code: EventCode) -> EventStream {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(code)
            .or_insert_with(|| EventStream::new(self.device.clone(), self.index, code))
            .clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Device
// ─────────────────────────────────────────────────────────────────────────────

/// A connected (or simulated) device and its services.
#[derive(Debug)]
pub struct Device {
    id: DeviceId,
    product_identifier: Option<ProductId>,
    services: Vec<Service>,
}

impl Device {
    pub fn new(id: DeviceId) -> Self {
        Self {
            id,
            product_identifier: None,
            services: Vec::new(),
        }
    }

    pub fn with_product_identifier(mut self, product: ProductId) -> Self {
        self.product_identifier = Some(product);
        self
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Product identifier announced by the device, if known yet.
    pub fn product_identifier(&self) -> Option<ProductId> {
        self.product_identifier
    }

    /// Append a service of `class` at the next index and return it.
    pub fn add_service(&mut self, class: ServiceClass) -> &Service {
        let index = self.services.len();
        self.services.push(Service::new(self.id.clone(), index, class));
        &self.services[index]
    }

    pub fn service(&self, index: usize) -> Option<&Service> {
        self.services.get(index)
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn service_class_at(&self, index: usize) -> Option<ServiceClass> {
        self.service(index).map(Service::class)
    }
}
