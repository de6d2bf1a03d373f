pub mod host;
pub mod inventory;
pub mod selection;
pub mod vsphere;

// exports for lazy devs like us
pub use host::{ConnectionState, HostRecord, HostRuntime, PowerState};
pub use inventory::{select_host, Inventory};
pub use selection::{Metric, Selection};
pub use vsphere::VsphereSession;
