pub mod activity;

pub use activity::{CreatedActivity, UploadRequest, ACTIVITY_TYPE};
