//! Domain types shared by the engine, the data sources and the HTTP layer.

pub mod catalog;
pub mod macros;
pub mod observation;

pub use catalog::*;
pub use observation::*;

crate::define_id_type!(i64, RestaurantId);
crate::define_id_type!(i64, ItemId);
crate::define_id_type!(i64, SubmissionId);
