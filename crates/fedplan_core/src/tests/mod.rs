//! Integration tests for the fedplan projection engine
//!
//! Tests are organized by topic:
//! - `tsp_projection` - Traditional and Roth compounding, chaining and limits
//! - `contribution_limits` - Shared elective-deferral limit and catch-up
//! - `retirement` - Eligibility, annuity and leave scenarios end to end
//! - `projection` - Full-horizon projection through separation and retirement
//! - `monte_carlo` - Randomized trials, reproducibility and aggregation
//! - `builder_dsl` - Builder and serialized configuration

mod contribution_limits;
mod tsp_projection;
