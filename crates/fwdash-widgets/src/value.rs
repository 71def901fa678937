//! Reading-register access for the generic widget pipeline.

use std::sync::Arc;

use fwdash_hal::{Register, Service};
use fwdash_types::RegisterId;

/// The register a widget displays and its current first value.
#[derive(Debug, Clone)]
pub struct ReadingValue {
    pub register: Arc<Register>,
    /// `None` until the register has been reported.
    pub value: Option<f64>,
}

/// The service's declared reading register, or [`RegisterId::READING`].
///
/// Register `0` is not addressable and counts as undeclared.
pub fn reading_register_id(service: &Service) -> RegisterId {
    service
        .reading_register()
        .filter(|id| id.0 != 0)
        .unwrap_or(RegisterId::READING)
}

/// Read the current value of the service's reading register.
pub fn read_value(service: &Service) -> ReadingValue {
    let register = service.register(reading_register_id(service));
    let value = register.first_value();
    ReadingValue { register, value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwdash_hal::Device;
    use fwdash_types::{DeviceId, ServiceClass};

    #[test]
    fn declared_register_is_used() {
        let service = Service::new(DeviceId::new("d"), 0, ServiceClass::Distance)
            .with_reading_register(Some(RegisterId(0x102)));
        assert_eq!(reading_register_id(&service), RegisterId(0x102));
    }

    #[test]
    fn undeclared_register_falls_back_to_257() {
        let service = Service::new(DeviceId::new("d"), 0, ServiceClass::Other(0x1234));
        assert_eq!(service.reading_register(), None);
        assert_eq!(reading_register_id(&service), RegisterId(257));

        let zero = Service::new(DeviceId::new("d"), 0, ServiceClass::Distance)
            .with_reading_register(Some(RegisterId(0)));
        assert_eq!(reading_register_id(&zero), RegisterId(257));
    }

    #[test]
    fn unloaded_register_has_no_value() {
        let mut device = Device::new(DeviceId::new("d"));
        let service = device.add_service(ServiceClass::LightLevel);
        let reading = read_value(service);
        assert_eq!(reading.register.id(), RegisterId::READING);
        assert!(reading.value.is_none());
    }

    #[test]
    fn loaded_register_exposes_first_element() {
        let mut device = Device::new(DeviceId::new("d"));
        let service = device.add_service(ServiceClass::DcVoltageMeasurement);
        service.register(RegisterId::READING).write(&[3.3]).unwrap();
        assert_eq!(read_value(service).value, Some(3.3));
    }
}
