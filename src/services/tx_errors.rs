//! Transaction Error Differentiation
//!
//! Classifies the failure text of a bet transaction (signing, submission or
//! receipt) into structured types for retries and user-facing messages.

use std::fmt;

/// The bet operation a transaction performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxAction {
    Create,
    Fund,
    Cancel,
    Invalidate,
    Resolve,
}

impl TxAction {
    /// Gerund used in failure messages
    pub fn verb(&self) -> &'static str {
        match self {
            TxAction::Create => "creating",
            TxAction::Fund => "funding",
            TxAction::Cancel => "canceling",
            TxAction::Invalidate => "invalidating",
            TxAction::Resolve => "resolving",
        }
    }

    /// Message shown once the transaction is mined
    pub fn success_message(&self) -> &'static str {
        match self {
            TxAction::Create => "Bet created successfully!",
            TxAction::Fund => "Bet funded successfully!",
            TxAction::Cancel => "Bet canceled successfully!",
            TxAction::Invalidate => "Bet invalidated successfully!",
            TxAction::Resolve => "Bet resolved successfully!",
        }
    }
}

impl fmt::Display for TxAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxAction::Create => write!(f, "createBet"),
            TxAction::Fund => write!(f, "fundBet"),
            TxAction::Cancel => write!(f, "cancelBet"),
            TxAction::Invalidate => write!(f, "invalidateBet"),
            TxAction::Resolve => write!(f, "resolveBet"),
        }
    }
}

/// Structured transaction failure types
#[derive(Debug, Clone)]
pub enum TxError {
    /// No PRIVATE_KEY configured
    NoSigner,
    /// PRIVATE_KEY or RPC_URL could not be used
    InvalidSetup(String),
    /// Account cannot cover value plus gas
    InsufficientFunds,
    /// Contract rejected the call
    Reverted(String),
    /// Nonce already used or too low
    NonceConflict,
    /// Gas price or fee below what the node accepts
    Underpriced,
    /// Network/connection error (timeout, DNS, etc.)
    Network(String),
    /// Mined but the receipt reports failure
    Failed(String),
    /// Unrecognized failure text
    Unknown(String),
}

impl TxError {
    /// Classify a failure description
    pub fn from_message(message: &str) -> Self {
        let msg_lower = message.to_lowercase();

        if msg_lower.contains("insufficient funds") || msg_lower.contains("insufficient balance") {
            return TxError::InsufficientFunds;
        }

        if msg_lower.contains("nonce too low") || msg_lower.contains("already known") || msg_lower.contains("nonce") && msg_lower.contains("used") {
            return TxError::NonceConflict;
        }

        if msg_lower.contains("underpriced") || msg_lower.contains("max fee per gas less than") {
            return TxError::Underpriced;
        }

        if msg_lower.contains("revert") {
            return TxError::Reverted(revert_reason(message));
        }

        if msg_lower.contains("timed out") || msg_lower.contains("timeout") || msg_lower.contains("connection") || msg_lower.contains("dns") {
            return TxError::Network(message.to_string());
        }

        TxError::Unknown(message.to_string())
    }

    /// Whether resubmitting the same transaction could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, TxError::NonceConflict | TxError::Underpriced | TxError::Network(_))
    }

    /// Underlying failure text
    pub fn details(&self) -> String {
        match self {
            TxError::NoSigner => "no signing key configured (set PRIVATE_KEY)".to_string(),
            TxError::InvalidSetup(msg) => msg.clone(),
            TxError::InsufficientFunds => "insufficient funds for wager and gas".to_string(),
            TxError::Reverted(reason) => format!("execution reverted: {}", reason),
            TxError::NonceConflict => "nonce already used, another transaction is pending".to_string(),
            TxError::Underpriced => "transaction underpriced".to_string(),
            TxError::Network(msg) => format!("network error: {}", msg),
            TxError::Failed(hash) => format!("transaction {} failed on chain", hash),
            TxError::Unknown(msg) => msg.clone(),
        }
    }

    /// Human-readable error message, e.g.
    /// `Error funding bet. Please try again. Details: ...`
    pub fn user_message(&self, action: TxAction) -> String {
        format!(
            "Error {} bet. Please try again. Details: {}",
            action.verb(),
            self.details()
        )
    }
}

/// Text after the last `reverted:` or `revert ` marker
fn revert_reason(message: &str) -> String {
    let reason = message
        .rsplit_once("reverted:")
        .or_else(|| message.rsplit_once("revert "))
        .map(|(_, reason)| reason)
        .unwrap_or("")
        .trim()
        .trim_matches(|c: char| c == ',' || c == ':' || c == '"')
        .trim();

    if reason.is_empty() {
        "no reason given".to_string()
    } else {
        reason.to_string()
    }
}

impl fmt::Display for TxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.details())
    }
}

impl std::error::Error for TxError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds() {
        let err = TxError::from_message("server returned an error response: error code -32000: insufficient funds for gas * price + value");
        assert!(!err.is_retryable());
        assert!(matches!(err, TxError::InsufficientFunds));
    }

    #[test]
    fn test_revert_reason() {
        let err = TxError::from_message("execution reverted: Bet already funded by this better");
        match &err {
            TxError::Reverted(reason) => assert_eq!(reason, "Bet already funded by this better"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(!err.is_retryable());

        let bare = TxError::from_message("execution reverted");
        assert!(matches!(bare, TxError::Reverted(ref r) if r == "no reason given"));
    }

    #[test]
    fn test_retryable() {
        assert!(TxError::from_message("nonce too low").is_retryable());
        assert!(TxError::from_message("replacement transaction underpriced").is_retryable());
        assert!(TxError::from_message("error sending request: connection refused").is_retryable());
    }

    #[test]
    fn test_user_message() {
        let err = TxError::Unknown("user rejected".to_string());
        assert_eq!(
            err.user_message(TxAction::Fund),
            "Error funding bet. Please try again. Details: user rejected"
        );
        assert!(TxError::NoSigner
            .user_message(TxAction::Resolve)
            .starts_with("Error resolving bet."));
    }

    #[test]
    fn test_unknown() {
        let err = TxError::from_message("something odd");
        assert!(!err.is_retryable());
        assert!(matches!(err, TxError::Unknown(_)));
    }
}
