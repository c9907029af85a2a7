pub mod config;
pub mod errors;
pub mod models;
pub mod name;
pub mod protocol;
pub mod traits;

pub use config::{ApiConfig, AppConfig, ClusterConfig, CoordinatorConfig, WorkerConfig};
pub use errors::*;
pub use models::{
    diagnostics, ContentType, Data, DataConfig, DispatchResult, Interest, InterestConfig,
    NackReason, RequestOutcome, SignatureInfo,
};
pub use name::Name;
pub use protocol::{OperandError, Operation};
pub use traits::{ExpressCallback, InterestArgs, InterestHandler, Replier, Signer, Transport, Verifier};
