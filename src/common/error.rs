// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Nosso tipo de erro de domínio, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("Acesso negado")]
    Forbidden,

    #[error("Etapa anterior a '{0}' ainda não aprovada")]
    PrecedenceViolation(&'static str),

    // Operação em estado que não permite a transição (ex: entidade já finalizada)
    #[error("Estado inválido: {0}")]
    InvalidState(&'static str),

    #[error("Regra de negócio violada: {0}")]
    BusinessRule(&'static str),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Registro duplicado: {0}")]
    UniqueConstraintViolation(&'static str),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário inativo")]
    UserInactive,

    // Falha de persistência: não é recuperável localmente
    #[error("Banco de dados indisponível: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BusinessRule(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden | AppError::UserInactive => StatusCode::FORBIDDEN,
            AppError::PrecedenceViolation(_)
            | AppError::InvalidState(_)
            | AppError::EmailAlreadyExists
            | AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::JwtError(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::StoreUnavailable(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Chave da mensagem no I18nStore
    fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "error.validation",
            AppError::NotFound(_) => "error.not_found",
            AppError::Forbidden => "error.forbidden",
            AppError::PrecedenceViolation(_) => "error.precedence",
            AppError::InvalidState(_) => "error.invalid_state",
            AppError::BusinessRule(_) => "error.business_rule",
            AppError::EmailAlreadyExists => "error.email_exists",
            AppError::UniqueConstraintViolation(_) => "error.duplicate",
            AppError::InvalidCredentials => "error.invalid_credentials",
            AppError::InvalidToken | AppError::JwtError(_) => "error.invalid_token",
            AppError::UserInactive => "error.user_inactive",
            _ => "error.internal",
        }
    }

    /// Converte para a resposta HTTP no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let error = store.translate(&locale.0, self.message_key());

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(&*e.code);
                            Value::String(store.translate(&locale.0, &format!("validation.{}", key)))
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                Some(Value::Object(details))
            }
            AppError::NotFound(entity) => Some(json!({ "entity": entity })),
            AppError::PrecedenceViolation(stage) => Some(json!({ "stage": stage })),
            AppError::InvalidState(reason) | AppError::BusinessRule(reason) => Some(json!({
                "reason": reason,
                "message": store.translate(&locale.0, &format!("reason.{}", reason)),
            })),
            AppError::UniqueConstraintViolation(field) => Some(json!({ "field": field })),
            _ => None,
        };

        ApiError {
            status,
            error,
            details,
        }
    }
}

// Erro já pronto para virar resposta HTTP
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "success": false, "error": self.error, "details": details }),
            None => json!({ "success": false, "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_errors_map_to_expected_status_codes() {
        assert_eq!(AppError::NotFound("expense").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::PrecedenceViolation("hr").status(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidState("already_finalized").status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::StoreUnavailable(sqlx::Error::PoolTimedOut).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn api_error_is_localized() {
        let store = I18nStore::new();
        let err = AppError::NotFound("leave").to_api_error(&Locale("pt".into()), &store);
        assert_eq!(err.error, "Registro não encontrado.");
        assert_eq!(err.details, Some(json!({ "entity": "leave" })));
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let store = I18nStore::new();
        let err = AppError::StoreUnavailable(sqlx::Error::PoolTimedOut)
            .to_api_error(&Locale("en".into()), &store);
        assert_eq!(err.error, "An unexpected error occurred.");
        assert!(err.details.is_none());
    }
}
