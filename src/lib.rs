pub mod app;

// Re-export useful types for library users
pub use app::catalog::{Catalog, MySqlCatalog, RoutineKind};
pub use app::config::AppConfig;
pub use app::error::ExtractError;
pub use app::formatter::OutputGenerator;
pub use app::generate_report;
pub use app::inspector::Inspector;
pub use app::models::{
    CheckConstraint, Event, EventRow, ForeignKey, Record, Routine, SchemaDocument, SchemaSection,
    Trigger,
};
