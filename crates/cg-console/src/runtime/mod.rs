//! Function Runtime
//!
//! Contract between the gateway and the functions registered with it.
//! Function bodies live outside this crate; the gateway only needs to find
//! them by id and call them.

pub mod function;
pub mod registry;

pub use function::{Metadata, RpcContext, RpcError, RpcFunction, RpcResult};
pub use registry::{RegistryError, RpcRegistry, RpcRegistryBuilder};
