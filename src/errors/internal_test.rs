#[cfg(test)]
mod tests {
    use crate::errors::internal::{IdentityError, InternalError, TokenDecodeError, TokenError};
    use crate::types::db::AuthProvider;
    use crate::types::internal::TokenType;
    use sea_orm::DbErr;

    #[test]
    fn test_database_error_includes_operation() {
        let db_err = DbErr::RecordNotFound("test record".to_string());
        let error = InternalError::database("insert_user", db_err);

        let error_string = error.to_string();
        assert!(error_string.contains("insert_user"));
        assert!(error_string.contains("Database error"));
    }

    #[test]
    fn test_transaction_errors_name_the_phase() {
        let begin = InternalError::transaction_begin(DbErr::Custom("locked".to_string()));
        let commit = InternalError::transaction_commit(DbErr::Custom("locked".to_string()));
        let rollback = InternalError::transaction_rollback(DbErr::Custom("locked".to_string()));

        assert!(begin.to_string().contains("Starting transaction failed"));
        assert!(commit.to_string().contains("Committing transaction failed"));
        assert!(rollback.to_string().contains("Rolling back transaction failed"));
    }

    #[test]
    fn test_parse_error_includes_value_type() {
        let error = InternalError::parse("ALGORITHM", "unknown algorithm");

        let error_string = error.to_string();
        assert!(error_string.contains("ALGORITHM"));
        assert!(error_string.contains("unknown algorithm"));
        assert!(error_string.contains("Parse error"));
    }

    #[test]
    fn test_wrong_token_type_names_both_types() {
        let error: InternalError = TokenError::WrongTokenType {
            expected: TokenType::Refresh,
            actual: TokenType::Access,
        }
        .into();

        let error_string = error.to_string();
        assert!(error_string.contains("refresh"));
        assert!(error_string.contains("access"));
    }

    #[test]
    fn test_token_decode_error_converts_through_token_error() {
        let error: InternalError = TokenError::from(TokenDecodeError::expired()).into();

        match error {
            InternalError::Token(TokenError::Decode(_)) => {}
            other => panic!("Expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_external_identity_names_provider() {
        let error: InternalError = IdentityError::DuplicateExternalIdentity {
            provider: AuthProvider::Google,
            provider_id: "abc123".to_string(),
        }
        .into();

        assert!(error.to_string().contains("google:abc123"));
    }
}
