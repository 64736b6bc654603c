pub mod control;
pub mod error;
pub mod launch;

pub use control::{HostProcessControl, ProcessControl};
pub use error::ProcessError;
pub use launch::LaunchSpec;
