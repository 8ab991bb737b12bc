//! Product feed: the state machine and its async driver.

mod driver;
mod machine;

pub use driver::{FeedDeps, FeedSettings, ProductFeed};
pub use machine::{
    FailureSummary, FeedError, FeedMachine, FetchMode, FetchPlan, LoadMoreRejection,
    MergeSummary, Transition,
};
