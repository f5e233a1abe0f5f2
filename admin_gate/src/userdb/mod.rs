mod errors;
mod password;
mod storage;
mod types;

pub use errors::UserError;
pub use password::{hash_password, verify_password};
pub(crate) use password::{dummy_verify, hash_password_blocking, verify_password_blocking};
pub use storage::UserStore;
pub use types::{NewUser, User, UserStatus};

pub async fn init() -> Result<(), UserError> {
    UserStore::init().await
}
