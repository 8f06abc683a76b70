/*!
Executor module for desk-controller.

This module wires together:
- `resolver`: maps raw button commands onto invocable commands (`@/` scripts, execute-bit repair)
- `launcher`: turns a button's planned dispatch into a detached process (respecting dry-run)

Typical usage:
- The render plan carries a `Dispatch` per button.
- When the operator presses a button, call `Launcher::launch` with it and show any
  `DispatchError` to the operator; the panel keeps running either way.

Public re-exports:
- `CommandResolver`, `ResolvedCommand`: command resolution.
- `Dispatch`, `Invocation`, `Launched`, `Launcher`: dispatch-time execution.
*/

pub mod launcher;
pub mod resolver;

// Re-exports for convenient access from `desk_controller::executor::*`
pub use launcher::{Dispatch, Invocation, Launched, Launcher};
pub use resolver::{CommandResolver, ResolvedCommand, SCRIPT_MARKER, SCRIPTS_DIR};
