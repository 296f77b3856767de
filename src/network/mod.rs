//! Market data sources and connection management

pub mod traits;
pub mod cex;
pub mod dex;
pub mod providers;
pub mod retry;

pub use traits::*;
pub use cex::*;
pub use dex::*;
pub use providers::*;
pub use retry::*;
