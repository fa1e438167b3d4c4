pub mod cancellation;
pub mod storage;

pub use cancellation::CancellationToken;
