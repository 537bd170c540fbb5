use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Erros de validação de transição carregam o nome do campo ofensor;
// o cliente recebe sempre um `kind` estável + mensagem legível.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Falhas do validador de transição de status (sempre 400) ---
    #[error("Campo obrigatório ausente: {0}")]
    MissingRequiredField(&'static str),

    #[error("Formato de data inválido em {0} (esperado YYYY-MM-DD)")]
    InvalidDateFormat(&'static str),

    #[error("Data no passado em {0}")]
    PastDate(&'static str),

    #[error("Valor inválido para {0}")]
    InvalidEnumValue(&'static str),

    // --- Autorização / existência ---
    // Forbidden não distingue "fora do escopo" de "não existe" para
    // quem não é admin (evita vazamento de existência).
    #[error("Ação não permitida")]
    Forbidden,

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    // --- Conflitos ---
    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Telefone já cadastrado")]
    PhoneAlreadyExists,

    #[error("Lead possui registros dependentes e não pode ser removido")]
    LeadHasDependents,

    #[error("{0}")]
    Conflict(String),

    // --- Autenticação ---
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    // Código estável consumido pelo frontend. Nunca renomear sem
    // combinar com os clientes.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::MissingRequiredField(_) => "missing_required_field",
            AppError::InvalidDateFormat(_) => "invalid_date_format",
            AppError::PastDate(_) => "past_date",
            AppError::InvalidEnumValue(_) => "invalid_enum_value",
            AppError::Forbidden => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::EmailAlreadyExists => "email_already_exists",
            AppError::PhoneAlreadyExists => "phone_already_exists",
            AppError::LeadHasDependents => "lead_has_dependents",
            AppError::Conflict(_) => "conflict",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::UserNotFound => "user_not_found",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "internal_error",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::MissingRequiredField(_)
            | AppError::InvalidDateFormat(_)
            | AppError::PastDate(_)
            | AppError::InvalidEnumValue(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists
            | AppError::PhoneAlreadyExists
            | AppError::LeadHasDependents
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Validação de payload retorna todos os detalhes por campo.
        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "error": {
                    "kind": self.kind(),
                    "message": "Um ou mais campos são inválidos.",
                    "details": details,
                }
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let status = self.status_code();

        // Erros de infraestrutura viram 500 genérico; o `tracing` loga a
        // mensagem detalhada que o `thiserror` nos deu, o cliente não vê
        // stack trace nem erro da camada de storage.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
            "Ocorreu um erro inesperado.".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": { "kind": self.kind(), "message": message }
        }));
        (status, body).into_response()
    }
}
