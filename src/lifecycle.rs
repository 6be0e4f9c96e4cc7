//! Chart lifecycle orchestration.
//!
//! A [`ChartLifecycle`] owns one chart's hooks, its render surface and the inputs it was given.
//! Every update runs the same pipeline: dimensions, then `set_params` (scales and aggregation,
//! producing the new visual set), then reconciliation against the previous set, then `draw`.

pub mod debounce;
pub mod subscriptions;

pub use debounce::{Debouncer, SharedDebouncer};
pub use subscriptions::{Subscription, Subscriptions};

use crate::data_types::{ChartConfig, Dimensions, Viewport};
use crate::reconcile::{reconcile, Keyed, Reconciled};
use crate::rendering::{RenderSurface, Transition};
use eyre::{eyre, Result};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    Updating,
    Idle,
    Destroyed,
}

/// Inputs visible to `set_params` and `draw` during one update.
#[derive(Debug)]
pub struct UpdateContext<'a, D, C> {
    pub dims: Dimensions,
    pub data: &'a D,
    pub config: &'a C,
}

impl<D, C: ChartConfig> UpdateContext<'_, D, C> {
    pub fn transition(&self) -> Transition {
        Transition::new(self.config.transition_ms())
    }
}

/// Chart-specific behaviour plugged into the lifecycle.
pub trait ChartHooks {
    type Data: Default;
    type Config: ChartConfig;
    type Record: Keyed + Clone;

    /// Creates the chart's persistent containers. Runs once.
    fn set_elements(&mut self, surface: &mut dyn RenderSurface, dims: &Dimensions) -> Result<()>;

    /// Rebuilds scales and derived data, and returns the visual set for this update.
    fn set_params(&mut self, ctx: &UpdateContext<'_, Self::Data, Self::Config>) -> Vec<Self::Record>;

    fn draw(
        &mut self,
        surface: &mut dyn RenderSurface,
        changes: &Reconciled<Self::Record>,
        ctx: &UpdateContext<'_, Self::Data, Self::Config>,
    ) -> Result<()>;

    fn on_data_changed(&mut self, _data: &Self::Data) {}
}

/// Producer side of the debounced resize channel.
#[derive(Clone, Debug)]
pub struct ResizeHandle {
    debouncer: SharedDebouncer<Viewport>,
}

impl ResizeHandle {
    /// Queues a viewport change. Returns `false` once the chart has been destroyed.
    pub fn signal(&self, viewport: Viewport, now: Instant) -> bool {
        self.debouncer.lock().signal(viewport, now)
    }

    pub fn is_closed(&self) -> bool {
        self.debouncer.lock().is_closed()
    }
}

pub struct ChartLifecycle<H: ChartHooks, S: RenderSurface> {
    hooks: H,
    surface: S,
    state: LifecycleState,
    viewport: Viewport,
    data: H::Data,
    config: H::Config,
    has_data: bool,
    previous: Vec<H::Record>,
    resize: SharedDebouncer<Viewport>,
    subscriptions: Subscriptions,
    updates: usize,
}

impl<H: ChartHooks, S: RenderSurface> ChartLifecycle<H, S> {
    pub fn new(hooks: H, surface: S, viewport: Viewport) -> Self {
        Self::with_resize_window(hooks, surface, viewport, Debouncer::<Viewport>::DEFAULT_WINDOW)
    }

    pub fn with_resize_window(hooks: H, surface: S, viewport: Viewport, window: Duration) -> Self {
        Self {
            hooks,
            surface,
            state: LifecycleState::Uninitialized,
            viewport,
            data: H::Data::default(),
            config: H::Config::default(),
            has_data: false,
            previous: Vec::new(),
            resize: Arc::new(Mutex::new(Debouncer::new(window))),
            subscriptions: Subscriptions::new(),
            updates: 0,
        }
    }

    /// Creates the containers and registers the resize listener.
    ///
    /// Data handed over before this call is drawn right away.
    pub fn init(&mut self) -> Result<()> {
        match self.state {
            LifecycleState::Uninitialized => {}
            LifecycleState::Destroyed => return Err(eyre!("cannot init a destroyed chart")),
            _ => {
                debug!("chart already initialized");
                return Ok(());
            }
        }

        let dims = self.dimensions();
        self.hooks.set_elements(&mut self.surface, &dims)?;

        let debouncer = self.resize.clone();
        self.subscriptions
            .push(Subscription::new(move || debouncer.lock().close()));

        self.state = LifecycleState::Initialized;
        info!(width = dims.width(), height = dims.height(), "chart initialized");

        if self.has_data {
            self.update()?;
        }
        Ok(())
    }

    pub fn set_data(&mut self, data: H::Data) -> Result<()> {
        self.ensure_alive()?;
        self.hooks.on_data_changed(&data);
        self.data = data;
        self.has_data = true;
        self.update()
    }

    /// Merges `partial` over the chart's default configuration.
    pub fn set_config(&mut self, partial: &Value) -> Result<()> {
        self.ensure_alive()?;
        self.config = H::Config::from_partial(partial)?;
        self.update()
    }

    pub fn set_typed_config(&mut self, config: H::Config) -> Result<()> {
        self.ensure_alive()?;
        self.config = config;
        self.update()
    }

    /// Applies a viewport change immediately, bypassing the debouncer.
    pub fn resize(&mut self, viewport: Viewport) -> Result<()> {
        self.ensure_alive()?;
        self.viewport = viewport;
        self.update()
    }

    pub fn resize_handle(&self) -> ResizeHandle {
        ResizeHandle {
            debouncer: self.resize.clone(),
        }
    }

    /// Delivers a settled resize, if any. Returns whether an update ran.
    pub fn poll(&mut self, now: Instant) -> Result<bool> {
        if self.state == LifecycleState::Destroyed {
            return Ok(false);
        }
        let settled = self.resize.lock().poll(now);
        match settled {
            Some(viewport) => {
                debug!(width = viewport.width, height = viewport.height, "debounced resize");
                self.viewport = viewport;
                self.update()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Runs the update pipeline. Before `init` this only keeps the inputs.
    pub fn update(&mut self) -> Result<()> {
        match self.state {
            LifecycleState::Destroyed => return Err(eyre!("chart has been destroyed")),
            LifecycleState::Uninitialized => {
                debug!("update deferred until init");
                return Ok(());
            }
            LifecycleState::Updating => {
                warn!("re-entrant update ignored");
                return Ok(());
            }
            LifecycleState::Initialized | LifecycleState::Idle => {}
        }

        self.state = LifecycleState::Updating;
        let ctx = UpdateContext {
            dims: self.dimensions(),
            data: &self.data,
            config: &self.config,
        };

        let current = self.hooks.set_params(&ctx);
        let changes = reconcile(&self.previous, &current);
        debug!(
            entering = changes.entering.len(),
            updating = changes.updating.len(),
            exiting = changes.exiting.len(),
            "reconciled visual set"
        );

        let drawn = self.hooks.draw(&mut self.surface, &changes, &ctx);
        self.state = LifecycleState::Idle;
        drawn?;

        self.previous = current;
        self.updates += 1;
        Ok(())
    }

    /// Releases every subscription. Later inputs are rejected.
    pub fn destroy(&mut self) {
        if self.state == LifecycleState::Destroyed {
            return;
        }
        self.subscriptions.unsubscribe_all();
        self.resize.lock().close();
        self.previous.clear();
        self.state = LifecycleState::Destroyed;
        info!(updates = self.updates, "chart destroyed");
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.viewport, self.config.margins())
    }

    /// Visual set of the last completed draw.
    pub fn visual_set(&self) -> &[H::Record] {
        &self.previous
    }

    pub fn data(&self) -> &H::Data {
        &self.data
    }

    pub fn config(&self) -> &H::Config {
        &self.config
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Number of completed draws.
    pub fn update_count(&self) -> usize {
        self.updates
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.state == LifecycleState::Destroyed {
            return Err(eyre!("chart has been destroyed"));
        }
        Ok(())
    }
}
