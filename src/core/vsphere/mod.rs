pub mod model;
pub mod session;

pub use model::{HostHardware, MoRef, QuickStats};
pub use session::VsphereSession;
