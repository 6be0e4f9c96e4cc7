//! gpui_statchart: incrementally updatable statistical charts for GPUI
//!
//! Rows are aggregated into bands, mapped through a [`scales::ScaleSet`], reconciled against the
//! previous draw and emitted as keyed commands on a [`rendering::RenderSurface`]. A
//! [`lifecycle::ChartLifecycle`] drives that pipeline for any chart implementing
//! [`lifecycle::ChartHooks`].

pub mod aggregation;
pub mod axis_renderer;
pub mod data_types;
pub mod layout;
pub mod legend;
pub mod lifecycle;
pub mod plot_types;
pub mod reconcile;
pub mod rendering;
pub mod scales;
pub mod theme;
pub mod utils;

pub use aggregation::{aggregate, stack};
pub use data_types::{Band, CategoryValue, Dimensions, PointDatum, Row, StackedBand, Viewport};
pub use layout::{solve_layout, ForceConfig, ForceLayout};
pub use lifecycle::{ChartHooks, ChartLifecycle, LifecycleState, ResizeHandle};
pub use plot_types::{BarChart, ChoroplethChart, GroupStackChart, PieChart, SwarmChart, TimelineTooltip};
pub use reconcile::{reconcile, Keyed, Reconciled};
pub use rendering::{RecordingSurface, RenderSurface};
pub use scales::{build_scale, ScaleSet};
