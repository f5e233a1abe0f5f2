mod login;
mod logout;

pub(crate) use login::{login_page, login_submit};
pub(crate) use logout::logout_submit;
