//! Purpose: Shared library crate used by the `edgeframe` CLI and tests.
//! Exports: `api` (HTTP dispatcher), `core` (errors, environment, device store), `json`.
//! Role: Keeps request handling and client-side state testable without the binary.
//! Invariants: Modules prefer explicit inputs/outputs over hidden state.
//! Invariants: No ambient globals; state and environment are injected by callers.
pub mod api;
pub mod core;
pub mod json;
