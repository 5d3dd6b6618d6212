// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Papéis fixos do sistema (enum `user_role` no Postgres)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Hr,
    Finance,
    Manager,
    Executive,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Hr => "hr",
            UserRole::Finance => "finance",
            UserRole::Manager => "manager",
            UserRole::Executive => "executive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(UserRole::Admin),
            "hr" => Some(UserRole::Hr),
            "finance" => Some(UserRole::Finance),
            "manager" => Some(UserRole::Manager),
            "executive" => Some(UserRole::Executive),
            _ => None,
        }
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "EMP-0042")]
    pub employee_id: String,
    #[schema(example = "Ravi Kumar")]
    pub name: String,
    #[schema(example = "ravi@empresa.com")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub role: UserRole,
    pub manager_id: Option<Uuid>,
    pub department: Option<String>,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id,
            role: self.role,
        }
    }
}

/// Identidade de quem executa a operação. Os serviços só autorizam, nunca autenticam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
}

// Cadastro público: sempre cria um executivo
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "EMP-0042")]
    pub employee_id: String,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ravi Kumar")]
    pub name: String,
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "ravi@empresa.com")]
    pub email: String,
    #[validate(length(min = 6, message = "password_too_short"))]
    #[schema(example = "segredo123")]
    pub password: String,
    pub manager_id: Option<Uuid>,
    pub department: Option<String>,
}

// Criação de usuário por admin/hr, com papel livre
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "required"))]
    pub employee_id: String,
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    #[validate(email(message = "invalid_email"))]
    pub email: String,
    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,
    pub role: UserRole,
    pub manager_id: Option<Uuid>,
    pub department: Option<String>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "invalid_email"))]
    pub email: String,
    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,      // Subject (ID do usuário)
    pub role: String,   // Papel no momento da emissão
    pub exp: usize,     // Expiration time
    pub iat: usize,     // Issued At
}

// Dados internos para inserir um usuário (senha já com hash)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub manager_id: Option<Uuid>,
    pub department: Option<String>,
}
