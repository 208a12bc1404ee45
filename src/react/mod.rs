pub mod analyze;
pub mod draft;
pub mod finalize;
mod loop_;
pub mod parse;
pub mod planner;
pub mod prompts;

pub use analyze::{has_reset_trigger, Analyzer};
pub use draft::Drafter;
pub use finalize::Finalizer;
pub use loop_::TaskAgent;
pub use parse::{parse_action, strip_think_blocks, ParsedAction};
pub use planner::{Phase, Plan, PlanDecision, Planner};
