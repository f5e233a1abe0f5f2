use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Password hashing error: {0}")]
    Hash(String),
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        UserError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sqlx_error() {
        let user_error = UserError::from(sqlx::Error::RowNotFound);

        match user_error {
            UserError::Storage(msg) => assert!(msg.contains("no rows")),
            other => panic!("Expected Storage variant, got {other:?}"),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(UserError::NotFound.to_string(), "User not found");
        assert_eq!(
            UserError::InvalidData("bad role".to_string()).to_string(),
            "Invalid data: bad role"
        );
    }
}
