pub mod api_key;
pub mod request_id;

pub use api_key::{require_admin_api_key, API_KEY_HEADER};
pub use request_id::{request_id_middleware, REQUEST_ID_HEADER};
