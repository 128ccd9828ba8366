pub mod ppf;
pub mod request;
pub mod rows;
pub mod schedule;

pub use ppf::{PpfRecord, PpfTable};
pub use request::{CohortRequest, RgsMode};
pub use rows::{MetricKey, MetricRow, PrescriptionRow};
pub use schedule::{PatientId, ProtocolId, ScheduleEntry, ScoredRecord, Weekday};
