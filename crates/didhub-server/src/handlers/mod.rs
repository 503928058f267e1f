pub mod dashboard;
pub mod did;
pub mod logs;
pub mod resolution;
pub mod status;

use crate::envelope::ApiError;

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not found")
}
