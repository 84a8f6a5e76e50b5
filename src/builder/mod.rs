//! Package build steps.
//!
//! This module turns resolved entries into export maps and the bundler and
//! declaration compiler invocations that produce them.

pub mod declarations;
pub mod errors;
pub mod exports;
pub mod plan;
pub mod transpile;

pub use declarations::DeclarationJob;
pub use errors::BuildError;
pub use exports::{ExportMaps, PublishExport};
pub use plan::{BuildPlan, EntryPoint, VariantGroup};
pub use transpile::TranspileJob;
