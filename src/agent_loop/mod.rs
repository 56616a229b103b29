//! Agent loop: streamed rounds, tool dispatch, and the terminal event guarantee.

pub mod round;
pub mod runner;

pub use round::{run_round, RoundOutcome, ToolCallAccumulator};
pub use runner::{
    normalize_tool_call, synthesize_call_id, LoopRunner, RunHandle, RunRequest, MAX_TOOL_ROUNDS,
};
