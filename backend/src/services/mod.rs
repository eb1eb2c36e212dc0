//! Service layer between the data sources and the HTTP handlers.
//!
//! Services fetch a snapshot through a [`PriceSource`](crate::sources::PriceSource),
//! run the engine over it and return view-ready structures.

pub mod compare;
pub mod directory;
pub mod moderation;
pub mod trend;

pub use compare::{compute_compare_data, load_compare_data, CompareData, CompareQuery};
pub use directory::{
    filter_directory, load_directory, load_restaurant_detail, DirectoryData, DirectoryQuery,
    RestaurantDetail,
};
pub use moderation::{
    Category, ModerationError, ModerationStats, NewSubmission, Submission, SubmissionQueue,
    SubmissionStatus,
};
pub use trend::{load_trend, TrendData, DEFAULT_TREND_DAYS};
