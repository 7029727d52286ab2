//! HTTP API module for the shift billing engine.
//!
//! A thin JSON surface over [`crate::calculation::run_billing`]: rows come
//! in column-mapped, the output relations go back out.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CellValue, ComputeRequest, FileRequest, RowRequest, SheetRequest};
pub use response::ApiError;
pub use state::AppState;
