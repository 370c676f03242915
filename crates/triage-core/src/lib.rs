pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result, Service};
pub use traits::{Embedder, Generator};
pub use types::{Category, Context, MatchTier, RouteOutcome};
