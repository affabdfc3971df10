//! flotilla-strategy: the strategy execution engine.
//!
//! Given a contender release (and optionally the incumbent it replaces),
//! the [`Executor`] decides whether the contender's target step has been
//! achieved across every cluster and returns the [`ExecutorResult`]s the
//! caller must persist to converge. The engine performs no I/O; running it
//! again on unchanged input yields the same patches.
//!
//! # Components
//!
//! - **`step`** - resolve and validate the targeted strategy step
//! - **`checks`** - per-cluster installation, capacity, and traffic checks
//! - **`conditions`** - strategy conditions and the summary state
//! - **`executor`** - gate ordering and patch generation
//! - **`result`** - patch instructions and their application to a catalog
//! - **`recorder`** / **`clock`** - event sink and time source

pub mod checks;
pub mod clock;
pub mod conditions;
pub mod executor;
pub mod recorder;
pub mod result;
pub mod step;

pub use checks::{check_capacity, check_installation, check_traffic, Comparison, TargetCheck};
pub use clock::{Clock, FixedClock, SystemClock};
pub use conditions::{StrategyConditions, CLUSTERS_NOT_READY};
pub use executor::Executor;
pub use recorder::{Event, EventRecorder, EventType, MemoryRecorder, TracingRecorder};
pub use result::ExecutorResult;
pub use step::{resolve_step, ResolvedStep, RoleValues};
