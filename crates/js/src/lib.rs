//! Engine-agnostic JavaScript facade shared by the host document and the loader.
//! This crate centralizes the value model, per-document global scopes and the
//! script engine seam so the DOM host never depends on a concrete engine.

use anyhow::Result;

/// Engine-agnostic values as seen by host code.
pub mod values;
pub use values::JSValue;

/// Global scope storage and the shared `Window` handle.
pub mod globals;
pub use globals::{GlobalScope, Window};

/// Declarative classic-script engine.
pub mod engine;
pub use engine::DeclarativeEngine;

// ============================
// Engine-agnostic JS context trait
// ============================

/// A minimal interface for evaluating JavaScript in a per-document engine.
/// Keep this trait small so engines can be swapped.
pub trait JsEngine: Send {
    /// Evaluate a classic script fetched from `url`.
    ///
    /// # Errors
    /// Returns an error for an uncaught script error. Side effects of statements
    /// executed before the failing one remain visible.
    fn eval_script(&mut self, source: &str, url: &str) -> Result<()>;
    /// Run pending microtasks/jobs until idle.
    ///
    /// # Errors
    /// Returns an error if a queued job fails.
    fn run_jobs(&mut self) -> Result<()>;
    /// The global scope scripts in this engine write to.
    fn window(&self) -> &Window;
}
