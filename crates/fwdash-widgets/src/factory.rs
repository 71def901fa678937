//! Widget factory table: which widget draws which service class.

use fwdash_types::{MeasurementKind, ServiceClass, SpecializedKind, WidgetKind};

use crate::config::SizeBand;

/// Generic widget families fed by the reading-register pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericFactory {
    Sonar,
    Solar,
    SoilMoisture,
    /// Touch or dial-button, depending on the preceding service.
    Button,
    Line,
    Dial,
    DcCurrent,
    DcVoltage,
    Ph,
    Temperature,
    Default,
}

impl GenericFactory {
    pub fn size_band(&self) -> SizeBand {
        match self {
            GenericFactory::Sonar => SizeBand::Wide,
            GenericFactory::SoilMoisture | GenericFactory::Ph | GenericFactory::Temperature => {
                SizeBand::Fixed
            }
            GenericFactory::Line => SizeBand::Compact,
            GenericFactory::Solar
            | GenericFactory::Button
            | GenericFactory::Dial
            | GenericFactory::DcCurrent
            | GenericFactory::DcVoltage
            | GenericFactory::Default => SizeBand::Nominal,
        }
    }

    /// Widget kind to draw. `rotary_variant` only matters for buttons.
    pub fn kind(&self, rotary_variant: bool) -> WidgetKind {
        match self {
            GenericFactory::Sonar => WidgetKind::Sonar,
            GenericFactory::Solar => WidgetKind::Solar,
            GenericFactory::SoilMoisture => WidgetKind::SoilMoisture,
            GenericFactory::Button if rotary_variant => WidgetKind::DialButton,
            GenericFactory::Button => WidgetKind::Touch,
            GenericFactory::Line => WidgetKind::Line,
            GenericFactory::Dial => WidgetKind::Dial,
            GenericFactory::DcCurrent => WidgetKind::DcCurrent,
            GenericFactory::DcVoltage => WidgetKind::DcVoltage,
            GenericFactory::Ph => WidgetKind::Ph,
            GenericFactory::Temperature => WidgetKind::Temperature,
            GenericFactory::Default => WidgetKind::Default,
        }
    }

    pub fn measurement(&self) -> Option<MeasurementKind> {
        match self {
            GenericFactory::DcCurrent => Some(MeasurementKind::Current),
            GenericFactory::DcVoltage => Some(MeasurementKind::Voltage),
            _ => None,
        }
    }
}

/// How a service class is turned into a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetFactory {
    /// Built from the full dashboard context; skips the value pipeline.
    Specialized(SpecializedKind),
    Generic(GenericFactory),
}

/// Total mapping from service class to widget factory.
pub fn factory_for(class: ServiceClass) -> WidgetFactory {
    match class {
        ServiceClass::Relay => WidgetFactory::Specialized(SpecializedKind::Pump),
        ServiceClass::Servo => WidgetFactory::Specialized(SpecializedKind::Servo),
        ServiceClass::Led => WidgetFactory::Specialized(SpecializedKind::Led),
        ServiceClass::Distance => WidgetFactory::Generic(GenericFactory::Sonar),
        ServiceClass::LightLevel => WidgetFactory::Generic(GenericFactory::Solar),
        ServiceClass::SoilMoisture => WidgetFactory::Generic(GenericFactory::SoilMoisture),
        ServiceClass::Button => WidgetFactory::Generic(GenericFactory::Button),
        ServiceClass::ReflectedLight => WidgetFactory::Generic(GenericFactory::Line),
        ServiceClass::RotaryEncoder => WidgetFactory::Generic(GenericFactory::Dial),
        ServiceClass::DcCurrentMeasurement => WidgetFactory::Generic(GenericFactory::DcCurrent),
        ServiceClass::DcVoltageMeasurement => WidgetFactory::Generic(GenericFactory::DcVoltage),
        ServiceClass::Acidity => WidgetFactory::Generic(GenericFactory::Ph),
        ServiceClass::Temperature => WidgetFactory::Generic(GenericFactory::Temperature),
        ServiceClass::Other(_) => WidgetFactory::Generic(GenericFactory::Default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actuators_are_specialized() {
        assert_eq!(
            factory_for(ServiceClass::Relay),
            WidgetFactory::Specialized(SpecializedKind::Pump)
        );
        assert_eq!(
            factory_for(ServiceClass::Servo),
            WidgetFactory::Specialized(SpecializedKind::Servo)
        );
        assert_eq!(
            factory_for(ServiceClass::Led),
            WidgetFactory::Specialized(SpecializedKind::Led)
        );
    }

    #[test]
    fn unknown_class_gets_default() {
        assert_eq!(
            factory_for(ServiceClass::Other(42)),
            WidgetFactory::Generic(GenericFactory::Default)
        );
        assert_eq!(GenericFactory::Default.kind(false), WidgetKind::Default);
    }

    #[test]
    fn button_kind_depends_on_variant() {
        assert_eq!(GenericFactory::Button.kind(false), WidgetKind::Touch);
        assert_eq!(GenericFactory::Button.kind(true), WidgetKind::DialButton);
        // Other families ignore the flag.
        assert_eq!(GenericFactory::Dial.kind(true), WidgetKind::Dial);
    }

    #[test]
    fn size_bands() {
        assert_eq!(GenericFactory::Sonar.size_band(), SizeBand::Wide);
        assert_eq!(GenericFactory::Line.size_band(), SizeBand::Compact);
        assert_eq!(GenericFactory::Ph.size_band(), SizeBand::Fixed);
        assert_eq!(GenericFactory::Solar.size_band(), SizeBand::Nominal);
    }

    #[test]
    fn measurement_tags() {
        assert_eq!(GenericFactory::DcCurrent.measurement(), Some(MeasurementKind::Current));
        assert_eq!(GenericFactory::DcVoltage.measurement(), Some(MeasurementKind::Voltage));
        assert_eq!(GenericFactory::Temperature.measurement(), None);
    }
}
