// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Release names, namespaces, and chart references validate on construction.

mod chart_ref;
mod namespace;
mod release_name;

pub use chart_ref::{ChartRef, ParseChartRefError};
pub use namespace::{Namespace, NamespaceError};
pub use release_name::{ReleaseName, ReleaseNameError};
