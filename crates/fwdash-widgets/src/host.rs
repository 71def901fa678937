//! The mounted widget for one service.
//!
//! A [`ServiceWidgetHost`] lives as long as its service is on screen. It owns
//! the transient state that must survive between render passes: the button
//! subscriptions and the asset load of the current widget kind. Dropping the
//! host releases both.

use std::sync::Arc;

use fwdash_types::{GenericWidget, SpecializedWidget, Spinner, WidgetDescriptor, WidgetKind};
use tracing::debug;

use crate::deferred::{AssetCache, LoadingBoundary, WidgetAssets};
use crate::dispatch::{DashboardContext, dispatch};
use crate::interaction::InteractionState;

/// What the host shows for one render pass.
#[derive(Debug, Clone)]
pub enum Frame {
    Specialized(SpecializedWidget),
    /// Assets for the widget kind are still loading.
    Loading(Spinner),
    Ready {
        widget: GenericWidget,
        assets: Arc<WidgetAssets>,
    },
}

#[derive(Debug)]
pub struct ServiceWidgetHost {
    cache: Arc<AssetCache>,
    interaction: InteractionState,
    boundary: Option<LoadingBoundary>,
}

impl ServiceWidgetHost {
    pub fn new(cache: Arc<AssetCache>) -> Self {
        Self {
            cache,
            interaction: InteractionState::new(),
            boundary: None,
        }
    }

    /// Run one render pass for `ctx.service`.
    ///
    /// The loading boundary is re-mounted only when the widget kind changes.
    pub fn render(&mut self, ctx: &DashboardContext<'_>) -> Frame {
        match dispatch(ctx, &mut self.interaction) {
            WidgetDescriptor::Specialized(widget) => {
                self.boundary = None;
                Frame::Specialized(widget)
            }
            WidgetDescriptor::Deferred { widget, fallback } => {
                let boundary = match self.boundary.take() {
                    Some(boundary) if boundary.kind() == widget.kind => boundary,
                    _ => {
                        debug!(device = %ctx.service.device_id(), kind = %widget.kind, "mounting widget");
                        LoadingBoundary::mount(widget.kind, &self.cache)
                    }
                };
                let boundary = self.boundary.insert(boundary);
                match boundary.assets() {
                    Some(assets) => Frame::Ready { widget, assets },
                    None => Frame::Loading(fallback),
                }
            }
        }
    }

    /// Wait for the current load to settle. `false` if it failed.
    pub async fn ready(&mut self) -> bool {
        match self.boundary.as_mut() {
            Some(boundary) => boundary.ready().await.is_some(),
            None => true,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.boundary.as_ref().is_some_and(LoadingBoundary::is_loading)
    }

    /// Widget kind of the mounted boundary, if any.
    pub fn mounted_kind(&self) -> Option<WidgetKind> {
        self.boundary.as_ref().map(LoadingBoundary::kind)
    }
}
