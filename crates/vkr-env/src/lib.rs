//! Environments, well-known queries, and the completion-signature calculus
//! senders and receivers describe themselves with.

pub mod calculus;
pub mod env;

pub use calculus::{
    CompletionSignaturesLike, CompletionTag, Either, ErrorOnly, Never, Or, SignatureKind,
    SignatureSet, Signatures, StoppedFlag, StoppedNo, StoppedOnly, StoppedYes, ValueOnly,
};
pub use env::{
    EmptyEnv, EnvQuery, ForwardProgressGuarantee, ForwardingQuery, GetAllocator, GetAllocatorTag,
    GetCompletionScheduler, GetCompletionSchedulerTag, GetStopToken, GetStopTokenQuery,
    GetStopTokenTag, HasEnv, Queryable,
};
