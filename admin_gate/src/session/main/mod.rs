mod cookie;
mod csrf;
mod rate_limit;
mod store;
mod timeout;

pub use cookie::{get_session_id_from_headers, session_cookie_headers};
pub use csrf::{issue_or_reuse_token, rotate_csrf_token, validate_token};
pub use rate_limit::{check_and_record, clear_rate_limit};
pub use store::{load_session, save_session};
pub use timeout::is_session_alive;
