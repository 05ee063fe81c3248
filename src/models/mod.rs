// Domain models for one collection cycle

mod host;
mod process;
mod record;
mod session;

pub use host::HostIdentity;
pub use process::{ProcessSample, SampleMetrics};
pub use record::{ContainerIdentity, MetricRecord, NO_CONTAINER};
pub use session::{SessionRecord, SessionTable};
