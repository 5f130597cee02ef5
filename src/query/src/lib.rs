pub mod context;
pub mod error;
pub mod funnel;

pub use context::Context;
pub use error::QueryError;
pub use error::Result;
pub use funnel::FunnelProvider;
