//! Component trait system for the TUI
//!
//! App owns the controller and routes input; the panels own their view
//! state (scroll position, selection, the composer's text) and declare what
//! they can do through these traits.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                          App                             │
//! │   (routes keys, applies panel actions to the controller) │
//! └──────────────────────────────────────────────────────────┘
//!                             │
//!            ┌────────────────┼────────────────┐
//!            ▼                ▼                ▼
//!     ┌──────────────┐ ┌──────────────┐ ┌──────────────┐
//!     │ Conversation │ │  Transcript  │ │   Composer   │
//!     │     List     │ │    Panel     │ │              │
//!     └──────────────┘ └──────────────┘ └──────────────┘
//! ```
//!
//! - [`Component`] - render + identity
//! - [`Scrollable`] - content taller than the viewport
//! - [`Interactive`] - keyboard input, optionally producing an action

mod component;
mod interactive;
mod scrollable;

pub use component::{Component, RenderContext};
pub use interactive::{Handled, Interactive, ScrollableInteractive};
pub use scrollable::Scrollable;
