pub mod app;
pub mod routes;
pub mod sse;

pub use app::*;
pub use routes::*;
pub use sse::*;
