//! REST API endpoint implementations.

pub mod request;
pub mod search;
pub mod url_encoding;

pub use request::{ApiRequest, RetryPolicy, send_request_with_retry};
pub use search::{create_job, delete_job, get_job_state, get_results_page};
pub use url_encoding::encode_path_segment;
