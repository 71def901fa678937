//! `fwdash-hal` – the device layer the dashboard reads from.
//!
//! # Modules
//!
//! - [`device`] – [`Device`] and [`Service`]: ordered services with lazily
//!   created registers and event streams.
//! - [`register`] – [`Register`] and the [`PackFormat`] field codec.
//! - [`event`] – [`EventStream`] callback hubs and RAII [`Subscription`]s.
//! - [`server`] – simulated servers ([`ButtonServer`],
//!   [`ReflectedLightServer`], [`SensorServer`]) and the [`ServerRegistry`].
//! - [`catalog`] – the [`DeviceCatalog`] trait and a JSON-backed
//!   [`StaticCatalog`].
//! - [`sim`] – [`SimRegistry`], a builder for fleets of simulated devices.

pub mod catalog;
pub mod device;
pub mod event;
pub mod register;
pub mod server;
pub mod sim;

pub use catalog::{DeviceCatalog, StaticCatalog};
pub use device::{Device, Service};
pub use event::{EventStream, Subscription};
pub use register::{PackFormat, Register};
pub use server::{ButtonServer, ReflectedLightServer, SensorServer, ServerRegistry, ServiceServer};
pub use sim::{Fleet, SimDevice, SimRegistry};
