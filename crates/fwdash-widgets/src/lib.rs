//! `fwdash-widgets` – widget dispatch for FWD-Edu devices.
//!
//! Given a device and one of its services, decide which dashboard widget
//! draws it and derive that widget's props from live register values and
//! events.
//!
//! # Modules
//!
//! - [`classifier`] – [`FwdEduClassifier`]: is a device part of the FWD-Edu
//!   kit, judged by its product identifier against the catalog.
//! - [`value`] – [`read_value`]: the first value of a service's reading
//!   register, falling back to register `0x101`.
//! - [`interaction`] – [`ButtonState`], [`line_props`] and [`dial_props`]:
//!   family-specific props driven by events and simulated servers.
//! - [`factory`] – [`factory_for`]: the service class to widget family table.
//! - [`dispatch`](mod@dispatch) – [`dispatch`](fn@dispatch): the per-service render
//!   decision, returning a [`WidgetDescriptor`][fwdash_types::WidgetDescriptor].
//! - [`specialized`] – [`SpecializedWidgets`]: relay, servo and LED widgets.
//! - [`deferred`] – [`AssetCache`] and [`LoadingBoundary`]: lazy, cached
//!   loading of widget artwork on tokio.
//! - [`host`] – [`ServiceWidgetHost`]: the mounted widget of one service.
//! - [`config`] – [`WidgetConfig`]: vendor pattern, dial default and size
//!   bands.
//!
//! # Example
//!
//! ```
//! use fwdash_hal::{SimDevice, SimRegistry};
//! use fwdash_types::{ServiceClass, WidgetKind};
//! use fwdash_widgets::{
//!     DashboardContext, FwdSpecializedWidgets, InteractionState, WidgetConfig, dispatch,
//! };
//!
//! let fleet = SimRegistry::new()
//!     .with_device(
//!         SimDevice::new("sonar")
//!             .with_service(ServiceClass::Distance)
//!             .with_reading(&[0.5]),
//!     )
//!     .build()
//!     .unwrap();
//! let device = fleet.device("sonar").unwrap();
//! let config = WidgetConfig::default();
//! let ctx = DashboardContext {
//!     device,
//!     service: device.service(0).unwrap(),
//!     servers: &fleet.servers,
//!     config: &config,
//!     specialized: &FwdSpecializedWidgets,
//! };
//!
//! let descriptor = dispatch(&ctx, &mut InteractionState::new());
//! let widget = descriptor.generic().unwrap();
//! assert_eq!(widget.kind, WidgetKind::Sonar);
//! assert_eq!(widget.props.value, Some(50.0));
//! ```

pub mod classifier;
pub mod config;
pub mod deferred;
pub mod dispatch;
pub mod factory;
pub mod host;
pub mod interaction;
pub mod specialized;
pub mod value;

pub use classifier::{FWD_EDU_VENDOR_PATTERN, FwdEduClassifier};
pub use config::{SizeBand, SizeBands, WidgetConfig};
pub use deferred::{
    AssetCache, BuiltinLoader, FsLoader, LoadState, LoadingBoundary, WidgetAssets, WidgetLoader,
};
pub use dispatch::{DashboardContext, dispatch, is_rotary_variant};
pub use factory::{GenericFactory, WidgetFactory, factory_for};
pub use host::{Frame, ServiceWidgetHost};
pub use interaction::{ButtonState, InteractionState, dial_props, line_props};
pub use specialized::{FwdSpecializedWidgets, SpecializedWidgets};
pub use value::{ReadingValue, read_value, reading_register_id};
