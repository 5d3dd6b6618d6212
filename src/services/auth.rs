// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::{
        activity::{EntityType, NewActivity},
        auth::{AuthResponse, Claims, CreateUserPayload, NewUser, RegisterUserPayload, User, UserRole},
    },
    services::activity_service::ActivityLogService,
};

const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    activity: ActivityLogService,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, activity: ActivityLogService, jwt_secret: String) -> Self {
        Self { user_repo, activity, jwt_secret }
    }

    // Cadastro público: o papel é sempre executivo, independente do que vier no corpo
    pub async fn register_user(&self, payload: RegisterUserPayload) -> Result<AuthResponse, AppError> {
        self.check_manager(payload.manager_id).await?;
        let password_hash = hash_password(payload.password).await?;

        let user = self
            .user_repo
            .create_user(&NewUser {
                employee_id: payload.employee_id,
                name: payload.name,
                email: payload.email.to_lowercase(),
                password_hash,
                role: UserRole::Executive,
                manager_id: payload.manager_id,
                department: payload.department,
            })
            .await?;

        tracing::info!(user_id = %user.id, "✅ Usuário registrado");
        self.activity.record(NewActivity::new(
            user.id,
            "USER_REGISTERED",
            EntityType::User,
            user.id,
            format!("{} registered", user.name),
        ));

        let token = self.create_token(&user)?;
        Ok(AuthResponse { token, user })
    }

    // Criação por admin/hr, com qualquer papel
    pub async fn create_user(&self, created_by: Uuid, payload: CreateUserPayload) -> Result<User, AppError> {
        self.check_manager(payload.manager_id).await?;
        let password_hash = hash_password(payload.password).await?;

        let user = self
            .user_repo
            .create_user(&NewUser {
                employee_id: payload.employee_id,
                name: payload.name,
                email: payload.email.to_lowercase(),
                password_hash,
                role: payload.role,
                manager_id: payload.manager_id,
                department: payload.department,
            })
            .await?;

        self.activity.record(NewActivity::new(
            created_by,
            "USER_CREATED",
            EntityType::User,
            user.id,
            format!("User {} created with role {}", user.name, user.role.as_str()),
        ));

        Ok(user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(&email.to_lowercase())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AppError::UserInactive);
        }

        let token = self.create_token(&user)?;
        Ok(AuthResponse { token, user })
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_claims(token, &self.jwt_secret)?;

        // Papel desconhecido no token não passa da fronteira
        if UserRole::parse(&claims.role).is_none() {
            return Err(AppError::Forbidden);
        }

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !user.is_active {
            return Err(AppError::UserInactive);
        }
        Ok(user)
    }

    pub async fn deactivate_user(&self, acting_user: Uuid, id: Uuid) -> Result<User, AppError> {
        ensure_not_self(acting_user, id)?;
        let user = self.user_repo.deactivate(id).await?.ok_or(AppError::NotFound("user"))?;

        self.activity.record(NewActivity::new(
            acting_user,
            "USER_DEACTIVATED",
            EntityType::User,
            user.id,
            format!("User {} deactivated", user.name),
        ));
        Ok(user)
    }

    async fn check_manager(&self, manager_id: Option<Uuid>) -> Result<(), AppError> {
        let Some(manager_id) = manager_id else {
            return Ok(());
        };
        let manager = self.user_repo.find_by_id(manager_id).await?;
        ensure_reporting_manager(manager.as_ref())
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        encode_token(user.id, user.role, &self.jwt_secret)
    }
}

// Quem desativa não pode ser o próprio alvo
fn ensure_not_self(acting_user: Uuid, target: Uuid) -> Result<(), AppError> {
    if acting_user == target {
        return Err(AppError::BusinessRule("cannot_deactivate_self"));
    }
    Ok(())
}

/// O gestor informado precisa existir, estar ativo e ter o papel de gestor.
fn ensure_reporting_manager(candidate: Option<&User>) -> Result<(), AppError> {
    match candidate {
        Some(user) if user.is_active && user.role == UserRole::Manager => Ok(()),
        _ => Err(AppError::BusinessRule("invalid_manager")),
    }
}

async fn hash_password(password: String) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

fn encode_token(user_id: Uuid, role: UserRole, secret: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

    let claims = Claims {
        sub: user_id,
        role: role.as_str().to_owned(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

fn decode_claims(token: &str, secret: &str) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;
    Ok(data.claims)
}
