pub mod settings;

pub use settings::{Credentials, Settings, DEFAULT_API_RELEASE};
