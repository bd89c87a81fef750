//! Console Gateway Protocol Buffer generated code.
//!
//! Generated Rust code for the `console.v1` gRPC service.

pub mod console {
    pub mod v1 {
        tonic::include_proto!("console.v1");
    }
}

pub use console::v1::*;
