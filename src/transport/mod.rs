// Transport layer
// Node clients used for read-only venue access
//
// Numan Thabit 2025 Nov

pub mod jsonrpc;

pub use jsonrpc::JsonRpc;
