//! Budget reallocation — capped water-filling allocator, action
//! classification, and the account/campaign optimization planner.

pub mod action;
pub mod allocator;
pub mod planner;

pub use action::{Action, ActionClassifier};
pub use allocator::{AllocationItem, CapacityAllocator};
pub use planner::{
    CampaignOptimizationRow, DailyBudget, OptimizationPlan, OptimizationPlanner, OptimizationRow,
};
