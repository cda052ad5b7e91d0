#[derive(Debug)]
pub enum GameRepositoryError {
    Serialization(String),
    DynamoDb(String),
    Transaction(String),
    /// The stored game changed since it was read, or already exists.
    Conflict(String),
}

impl std::fmt::Display for GameRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameRepositoryError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            GameRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
            GameRepositoryError::Transaction(msg) => write!(f, "Transaction error: {}", msg),
            GameRepositoryError::Conflict(msg) => write!(f, "Write conflict: {}", msg),
        }
    }
}

impl std::error::Error for GameRepositoryError {}
