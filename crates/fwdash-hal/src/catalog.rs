//! Device specification catalog.

use fwdash_types::{DashError, DeviceSpec};

/// Source of known device specifications.
pub trait DeviceCatalog: Send + Sync {
    /// Every known specification, in catalog order.
    fn specifications(&self) -> &[DeviceSpec];
}

/// A fixed, in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    specs: Vec<DeviceSpec>,
}

impl StaticCatalog {
    pub fn new(specs: Vec<DeviceSpec>) -> Self {
        Self { specs }
    }

    /// Parse a JSON array of specifications.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Catalog`] when the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, DashError> {
        let specs: Vec<DeviceSpec> =
            serde_json::from_str(json).map_err(|e| DashError::Catalog(e.to_string()))?;
        Ok(Self::new(specs))
    }

    pub fn push(&mut self, spec: DeviceSpec) {
        self.specs.push(spec);
    }
}

impl DeviceCatalog for StaticCatalog {
    fn specifications(&self) -> &[DeviceSpec] {
        &self.specs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwdash_types::ProductId;

    #[test]
    fn parses_catalog_array() {
        let catalog = StaticCatalog::from_json(
            r#"[
                { "id": "a", "company": "Forward Education", "productIdentifiers": [1, 2] },
                { "id": "b", "company": "Acme" }
            ]"#,
        )
        .unwrap();
        let specs = catalog.specifications();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].product_identifiers, vec![ProductId(1), ProductId(2)]);
        assert!(specs[1].product_identifiers.is_empty());
    }

    #[test]
    fn malformed_catalog_is_error() {
        let err = StaticCatalog::from_json("{ not json").unwrap_err();
        assert!(matches!(err, DashError::Catalog(_)));
    }

    #[test]
    fn push_appends() {
        let mut catalog = StaticCatalog::default();
        catalog.push(DeviceSpec {
            id: "x".to_string(),
            name: String::new(),
            company: "Acme".to_string(),
            product_identifiers: vec![ProductId(9)],
        });
        assert_eq!(catalog.specifications().len(), 1);
    }
}
