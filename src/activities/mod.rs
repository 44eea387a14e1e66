//! Activities: reusable groups of event classes built from patterns.
//!
//! # Module Structure
//!
//! - [`forest`] - Arena of activity nodes and the id generator
//! - [`hierarchy`] - Nesting repeat sets into a forest by set inclusion
//! - [`instances`] - Segmenting traces into activity instances
//! - [`rebuild`] - Replacing instances with compound events
//! - [`loops`] - Strict loops as standalone activities
//! - [`sublogs`] - Per-activity logs, gap logs and gap re-mining

pub mod forest;
pub mod hierarchy;
pub mod instances;
pub mod loops;
pub mod rebuild;
pub mod sublogs;

pub use forest::{ActivityForest, ActivityNode, IdGenerator, NodeId, UnderlyingPatternKind};
pub use hierarchy::{build_hierarchy, default_activity_name};
pub use instances::{
    extract_activity_instances, extract_activity_instances_with_filter,
    process_activities_in_trace, sub_traces, validate_instances, ActivityInstance,
    InstanceExtractor, InstanceFilter, InstanceFilterKind, InstanceSettings, KindFilter,
    NarrowingKind, SubTraceKind,
};
pub use loops::find_strict_loops;
pub use rebuild::{
    rebuild_log, rebuild_trace, CompoundNaming, RebuildOptions, UndefinedStrategy,
    UNDEFINED_ACTIVITY_NAME,
};
pub use sublogs::{
    add_unattached_activities, create_log_from_unattached_events, create_logs_for_activities,
    create_logs_from_compound_events,
};
