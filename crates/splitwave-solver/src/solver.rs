//! The directional-splitting solver.
//!
//! One call to [`DirSplitting::update_before_current`] walks the step
//! state machine:
//!
//! ```text
//! Idle → Sweep(X) → Exchange(X) → Sweep(Y) → Exchange(Y)
//!      → Sweep(Z) → [Source] → Exchange(Z) → Idle
//! ```
//!
//! Every transition submits device work ordered through the caller's
//! [`Transaction`]; nothing here waits for that work to finish. 2-D grids
//! skip the Z sweep and its exchange, and the symmetric splitting pattern
//! reverses the axis order on odd steps.

use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;
use splitwave_comm::HaloExchange;
use splitwave_core::{Axis, AxisTwist, ConfigError, FieldName, FIELD_B, FIELD_E};
use splitwave_event::{DeviceQueue, Event, Transaction};
use splitwave_grid::{GridLayout, SubView, ViewMut};
use tracing::{debug, info};

use crate::config::SolverConfig;
use crate::dispatch::AxisSweep;
use crate::error::SolverError;
use crate::registry::{AccessMode, DataConnector, FieldLease};
use crate::source::SourceInjector;
use crate::stencil::SplitStencil;

/// Field names the solver leases.
pub const SOLVER_FIELDS: [FieldName; 2] = [FIELD_E, FIELD_B];

/// Everything a solver invocation borrows from its driver.
pub struct SolverContext<'a> {
    /// Registry the E and B fields are leased from.
    pub registry: &'a DataConnector,
    /// Current transaction; submissions are ordered after it and joined
    /// into it.
    pub transaction: &'a mut Transaction,
    /// Compute queue for sweeps and source injection.
    pub queue: &'a DeviceQueue,
    /// Guard exchange for this partition.
    pub halo: &'a HaloExchange,
}

/// A state of the per-step state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SolverState {
    /// No step in progress.
    Idle,
    /// Sweep along an axis submitted.
    Sweep(Axis),
    /// Source injection submitted.
    Source,
    /// Exchange of E and B after the sweep along an axis submitted.
    Exchange(Axis),
}

/// What one solver invocation submitted, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepReport {
    /// The step that was advanced.
    pub step: u32,
    /// States visited, ending in [`SolverState::Idle`].
    pub states: SmallVec<[SolverState; 8]>,
}

impl StepReport {
    fn new(step: u32) -> Self {
        Self {
            step,
            states: SmallVec::new(),
        }
    }

    fn enter(&mut self, state: SolverState) {
        self.states.push(state);
    }

    /// Whether the source was applied on this step.
    pub fn injected(&self) -> bool {
        self.states.contains(&SolverState::Source)
    }

    /// Sweep axes in the order they were submitted.
    pub fn sweep_axes(&self) -> SmallVec<[Axis; 3]> {
        self.states
            .iter()
            .filter_map(|s| match s {
                SolverState::Sweep(axis) => Some(*axis),
                _ => None,
            })
            .collect()
    }
}

/// Directional-splitting Maxwell solver.
pub struct DirSplitting {
    config: SolverConfig,
    sweep: AxisSweep,
    source: Option<Arc<dyn SourceInjector>>,
}

impl DirSplitting {
    /// Validate `config` for `stencil` and build the solver.
    pub fn new(config: SolverConfig, stencil: Arc<dyn SplitStencil>) -> Result<Self, ConfigError> {
        Self::validate_configuration(&config, stencil.as_ref())?;
        info!(
            stencil = stencil.name(),
            dims = config.dims,
            pattern = ?config.pattern,
            "directional splitting solver ready"
        );
        Ok(Self {
            sweep: AxisSweep::new(stencil, config.block)?,
            config,
            source: None,
        })
    }

    /// Check that `config` admits an exact split update with `stencil`.
    pub fn validate_configuration(
        config: &SolverConfig,
        stencil: &dyn SplitStencil,
    ) -> Result<(), ConfigError> {
        config.validate(stencil.radius())
    }

    /// Attach a source applied during the configured injection window.
    pub fn with_source(mut self, source: Arc<dyn SourceInjector>) -> Self {
        self.source = Some(source);
        self
    }

    /// The validated configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Identity properties reported to drivers.
    pub fn string_properties(&self) -> IndexMap<&'static str, String> {
        let mut props = IndexMap::new();
        props.insert("name", "DS".to_string());
        props
    }

    /// Check that E and B are registered with layouts this solver can
    /// sweep, without leasing them.
    pub fn check_fields(&self, registry: &DataConnector) -> Result<(), ConfigError> {
        let [e, b] = SOLVER_FIELDS.map(|name| registry.layout(&name).ok_or(name));
        let (e, b) = match (e, b) {
            (Ok(e), Ok(b)) => (e, b),
            (Err(name), _) | (_, Err(name)) => return Err(ConfigError::UnknownField { name }),
        };
        self.check_layouts(&e, &b)
    }

    /// Check that E and B share an interior and that their guards match
    /// the configuration and cover the stencil on every swept axis.
    fn check_layouts(&self, e: &GridLayout, b: &GridLayout) -> Result<(), ConfigError> {
        if e.interior() != b.interior() {
            return Err(ConfigError::FieldShapeMismatch {
                first: e.interior(),
                second: b.interior(),
            });
        }
        if self.config.dims == 2 && e.interior().z() != 1 {
            return Err(ConfigError::NonPlanarGrid {
                extent: e.interior(),
            });
        }
        let radius = self.sweep.stencil().radius();
        for layout in [e, b] {
            for &axis in self.config.active_axes() {
                let guard = layout.guard().get(axis);
                if guard < radius {
                    return Err(ConfigError::GuardTooNarrow {
                        axis,
                        guard,
                        radius,
                    });
                }
                let configured = self.config.guard.get(axis);
                if guard != configured {
                    return Err(ConfigError::GuardMismatch {
                        axis,
                        configured,
                        field: guard,
                    });
                }
            }
        }
        Ok(())
    }

    /// Advance E and B by one split step.
    ///
    /// Leases both fields read-write for the duration of the call and
    /// releases them on every return path. Field layouts are checked as
    /// in [`check_fields`](Self::check_fields) before any work is
    /// submitted. Returns once all work is submitted; a transport failure
    /// that has already landed is reported, later ones surface through
    /// the transaction.
    pub fn update_before_current(
        &self,
        ctx: &mut SolverContext<'_>,
        step: u32,
    ) -> Result<StepReport, SolverError> {
        let e = ctx.registry.get(&FIELD_E, AccessMode::ReadWrite)?;
        let b = ctx.registry.get(&FIELD_B, AccessMode::ReadWrite)?;
        self.check_layouts(e.buffer().layout(), b.buffer().layout())?;
        let e_view = e.buffer().core_border();
        let b_view = b.buffer().core_border();
        let grid = e_view.size();

        let axes = self.config.pattern.axes(step, self.config.dims);
        let inject = self.config.injection.is_active(step, self.config.dt);
        let mut report = StepReport::new(step);
        for (n, &axis) in axes.iter().enumerate() {
            report.enter(SolverState::Sweep(axis));
            debug!(step, %axis, "sweep");
            let done = self.sweep.sweep(
                ctx.queue,
                AxisTwist::for_sweep(axis),
                e_view,
                b_view,
                grid,
                &ctx.transaction.current(),
            )?;
            ctx.transaction.join(done);

            if n + 1 == axes.len() && inject {
                if let Some(source) = &self.source {
                    report.enter(SolverState::Source);
                    let done = inject_source(ctx.queue, source, e_view, step, &ctx.transaction.current());
                    ctx.transaction.join(done);
                }
            }

            report.enter(SolverState::Exchange(axis));
            exchange_both(ctx, &e, &b)?;
        }
        report.enter(SolverState::Idle);
        Ok(report)
    }

    /// Refresh the guards of E and B after current deposition.
    ///
    /// Drivers also call this once before the first step so that the
    /// guards hold neighbour data.
    pub fn update_after_current(
        &self,
        ctx: &mut SolverContext<'_>,
        step: u32,
    ) -> Result<(), SolverError> {
        let e = ctx.registry.get(&FIELD_E, AccessMode::ReadWrite)?;
        let b = ctx.registry.get(&FIELD_B, AccessMode::ReadWrite)?;
        debug!(step, "post-current exchange");
        exchange_both(ctx, &e, &b)
    }
}

impl std::fmt::Debug for DirSplitting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirSplitting")
            .field("config", &self.config)
            .field("sweep", &self.sweep)
            .field("source", &self.source.as_ref().map(|s| s.name().to_string()))
            .finish()
    }
}

/// Exchange E and B after the same sweep. Both depend on the current
/// event and may run concurrently.
fn exchange_both(
    ctx: &mut SolverContext<'_>,
    e: &FieldLease<'_>,
    b: &FieldLease<'_>,
) -> Result<(), SolverError> {
    let after = ctx.transaction.current();
    let e_done = ctx.halo.async_communication(e.field(), &after)?;
    let b_done = ctx.halo.async_communication(b.field(), &after)?;
    ctx.transaction.join(e_done);
    ctx.transaction.join(b_done);
    ctx.transaction.check()?;
    Ok(())
}

fn inject_source(
    queue: &DeviceQueue,
    source: &Arc<dyn SourceInjector>,
    e: SubView<'_>,
    step: u32,
    depends_on: &Event,
) -> Event {
    let memory = Arc::clone(e.buffer().memory());
    let layout = e.layout();
    let source = Arc::clone(source);
    debug!(step, source = source.name(), "injecting source");
    queue.submit("source", depends_on, move || {
        let mut cells = memory.lock();
        source.inject(&mut ViewMut::new(&mut cells[..], layout), step);
        Ok(())
    })
}
