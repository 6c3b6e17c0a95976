// Chat module - conversation state and the streaming reply core
//
// - `models`: normalized domain types
// - `transcript`: the open conversation and fragment reconciliation
// - `store`: summaries, transcript and the active id
// - `session`: per-send streaming state machine
// - `controller`: the root controller tying it together
// - `runtime`: executes controller commands on tokio

pub mod controller;
pub mod models;
pub mod runtime;
pub mod session;
pub mod store;
pub mod transcript;

pub use controller::{Controller, Notification};
pub use runtime::Runtime;
