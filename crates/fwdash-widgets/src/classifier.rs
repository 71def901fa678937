//! [`FwdEduClassifier`] – decides whether a device belongs to the FWD-Edu
//! hardware family.
//!
//! Membership is derived from the catalog: every specification whose vendor
//! matches the family pattern contributes its product identifiers, and a
//! device is a member when its own product identifier is among them.

use std::collections::HashSet;
use std::sync::LazyLock;

use fwdash_hal::{Device, DeviceCatalog};
use fwdash_types::{DashError, ProductId};
use regex::{Regex, RegexBuilder};

/// Vendor names of the family: "FWD Edu", "Forward Education", ...
pub const FWD_EDU_VENDOR_PATTERN: &str = r"(fwd|forward) ?edu(cation)?";

static DEFAULT_VENDOR: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(FWD_EDU_VENDOR_PATTERN)
        .case_insensitive(true)
        .build()
        .expect("built-in vendor pattern is valid")
});

#[derive(Debug, Clone)]
pub struct FwdEduClassifier {
    vendor: Regex,
}

impl Default for FwdEduClassifier {
    fn default() -> Self {
        Self {
            vendor: DEFAULT_VENDOR.clone(),
        }
    }
}

impl FwdEduClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom vendor pattern, matched case-insensitively anywhere in
    /// the vendor name.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Config`] when `pattern` is not a valid regex.
    pub fn with_pattern(pattern: &str) -> Result<Self, DashError> {
        let vendor = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| DashError::Config(format!("invalid vendor pattern: {e}")))?;
        Ok(Self { vendor })
    }

    pub fn is_family_vendor(&self, company: &str) -> bool {
        self.vendor.is_match(company)
    }

    /// Product identifiers of every family specification in `catalog`.
    pub fn family_products(&self, catalog: &dyn DeviceCatalog) -> HashSet<ProductId> {
        catalog
            .specifications()
            .iter()
            .filter(|spec| !spec.product_identifiers.is_empty())
            .filter(|spec| self.is_family_vendor(&spec.company))
            .flat_map(|spec| spec.product_identifiers.iter().copied())
            .collect()
    }

    /// `true` when `device` is a FWD-Edu device according to `catalog`.
    ///
    /// A device that has not announced a product identifier is never a member.
    pub fn is_fwd_edu(&self, catalog: &dyn DeviceCatalog, device: &Device) -> bool {
        device
            .product_identifier()
            .is_some_and(|product| self.family_products(catalog).contains(&product))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwdash_hal::StaticCatalog;
    use fwdash_types::{DeviceId, DeviceSpec};

    fn spec(id: &str, company: &str, products: &[u32]) -> DeviceSpec {
        DeviceSpec {
            id: id.to_string(),
            name: id.to_string(),
            company: company.to_string(),
            product_identifiers: products.iter().map(|p| ProductId(*p)).collect(),
        }
    }

    fn device(product: Option<u32>) -> Device {
        let device = Device::new(DeviceId::new("dev"));
        match product {
            Some(p) => device.with_product_identifier(ProductId(p)),
            None => device,
        }
    }

    #[test]
    fn forward_education_member() {
        let catalog = StaticCatalog::new(vec![spec("a", "ForwardEducation", &[5, 6])]);
        let classifier = FwdEduClassifier::new();
        assert!(classifier.is_fwd_edu(&catalog, &device(Some(5))));
        assert!(!classifier.is_fwd_edu(&catalog, &device(Some(7))));
    }

    #[test]
    fn other_vendor_never_contributes() {
        let catalog = StaticCatalog::new(vec![
            spec("a", "Acme Robotics", &[5]),
            spec("b", "Forward Education", &[6]),
        ]);
        let classifier = FwdEduClassifier::new();
        assert!(!classifier.is_fwd_edu(&catalog, &device(Some(5))));
        assert!(classifier.is_fwd_edu(&catalog, &device(Some(6))));
    }

    #[test]
    fn vendor_pattern_variants() {
        let classifier = FwdEduClassifier::new();
        for company in ["FWD Edu", "fwdedu", "Forward Education", "FORWARD EDU", "Acme Forward Education Ltd"] {
            assert!(classifier.is_family_vendor(company), "{company} should match");
        }
        for company in ["Forward", "FWD", "Education Inc", "Microsoft"] {
            assert!(!classifier.is_family_vendor(company), "{company} should not match");
        }
    }

    #[test]
    fn spec_without_identifiers_contributes_nothing() {
        let catalog = StaticCatalog::new(vec![spec("a", "Forward Education", &[])]);
        let classifier = FwdEduClassifier::new();
        assert!(classifier.family_products(&catalog).is_empty());
    }

    #[test]
    fn device_without_product_identifier_is_not_member() {
        let catalog = StaticCatalog::new(vec![spec("a", "Forward Education", &[5])]);
        assert!(!FwdEduClassifier::new().is_fwd_edu(&catalog, &device(None)));
    }

    #[test]
    fn custom_pattern_is_case_insensitive() {
        let classifier = FwdEduClassifier::with_pattern("acme").unwrap();
        assert!(classifier.is_family_vendor("ACME Labs"));
        assert!(!classifier.is_family_vendor("Forward Education"));
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        let err = FwdEduClassifier::with_pattern("(unclosed").unwrap_err();
        assert!(matches!(err, DashError::Config(_)));
    }
}
