//! Error types for deck-users

/// User directory errors
#[derive(Debug, thiserror::Error)]
pub enum UsersError {
    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("User {0} not found")]
    NotFound(u64),
}

impl From<ureq::Error> for UsersError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => UsersError::Status(code),
            ureq::Error::Transport(transport) => UsersError::Transport(transport.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(UsersError::Status(503).to_string(), "HTTP error! status: 503");
        assert_eq!(UsersError::NotFound(7).to_string(), "User 7 not found");

        let decode: UsersError = serde_json::from_str::<u64>("{").unwrap_err().into();
        assert!(matches!(decode, UsersError::Decode(_)));
        assert!(decode.to_string().starts_with("Invalid response body: "));
    }
}
