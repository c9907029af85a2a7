pub mod outcome;
pub mod packet;

pub use outcome::{diagnostics, DispatchResult, NackReason, RequestOutcome};
pub use packet::{ContentType, Data, DataConfig, Interest, InterestConfig, SignatureInfo};
