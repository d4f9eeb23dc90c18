use chrono::{Duration, Utc};
use surrealdb::{engine::any::Any, Surreal};
use uuid::Uuid;

use crate::{
    auth::{
        password_service,
        token_service::{AuthConfig, TokenService},
    },
    error::{Error, Result},
    helpers::{
        thing_helpers::{create_user_thing, thing_id},
        user_helpers::{find_user_by_email, get_user},
    },
    models::{
        database_helpers::{violates_index, RecordId},
        user::{Role, UpdateProfilePayload, UserRecord},
    },
    services::{
        google_oauth_service::SocialProfile,
        mail_service::{Mail, Mailer},
    },
};

pub const MIN_PASSWORD_LEN: usize = 6;
const RESET_TOKEN_VALIDITY_HOURS: i64 = 1;

pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub referred_by: Option<String>,
}

pub struct AuthService;

impl AuthService {
    pub fn issue_token(user: &UserRecord, config: &AuthConfig) -> Result<String> {
        let id = user.id.as_ref().ok_or(Error::LoginFail)?;
        TokenService::create_token(thing_id(id), user.role, config)
    }

    pub async fn register_user(db: &Surreal<Any>, account: NewAccount) -> Result<UserRecord> {
        let name = account.name.trim().to_string();
        let email = normalize_email(&account.email);
        if name.is_empty() || email.is_empty() || account.password.is_empty() {
            return Err(Error::MissingFields);
        }
        validate_email(&email)?;
        validate_password(&account.password)?;
        if !account.role.is_self_assignable() {
            return Err(Error::InvalidRole {
                role: account.role.to_string(),
            });
        }

        if find_user_by_email(db, &email).await?.is_some() {
            return Err(Error::EmailAlreadyUsed { email });
        }

        let referred_by = match account.referred_by.map(|c| c.trim().to_string()) {
            Some(code) if !code.is_empty() => {
                if !referral_code_exists(db, &code).await? {
                    return Err(Error::InvalidInput {
                        reason: "Code de parrainage invalide.".to_string(),
                    });
                }
                Some(code)
            }
            _ => None,
        };

        let hashed_password = password_service::hash_password(&account.password)?;
        let now = Utc::now();
        let new_user = UserRecord {
            id: None,
            name,
            email,
            password: hashed_password,
            role: account.role,
            role_set: true,
            library: vec![],
            followers: vec![],
            avatar: None,
            google_id: None,
            referral_code: new_referral_code(),
            referred_by,
            points: 0,
            reset_password_token: None,
            reset_password_expires: None,
            created_at: now.into(),
            updated_at: now.into(),
        };

        let user = insert_user(db, new_user).await?;

        tracing::info!("new {} registered: {}", user.role, user.email);
        Ok(user)
    }

    pub async fn login_user(db: &Surreal<Any>, email: &str, password: &str) -> Result<UserRecord> {
        let user = find_user_by_email(db, &normalize_email(email))
            .await?
            .ok_or(Error::LoginFail)?;

        if !password_service::verify_password(password, &user.password)? {
            return Err(Error::LoginFail);
        }

        Ok(user)
    }

    pub async fn update_profile(
        db: &Surreal<Any>,
        user_id: &str,
        payload: UpdateProfilePayload,
    ) -> Result<UserRecord> {
        let user = get_user(db, user_id).await?;

        let name = match payload.name.map(|n| n.trim().to_string()) {
            Some(name) if name.is_empty() => return Err(Error::MissingFields),
            Some(name) => name,
            None => user.name.clone(),
        };

        let email = match payload.email.map(|e| normalize_email(&e)) {
            Some(email) if email != user.email => {
                validate_email(&email)?;
                if find_user_by_email(db, &email).await?.is_some() {
                    return Err(Error::EmailAlreadyUsed { email });
                }
                email
            }
            _ => user.email.clone(),
        };

        let avatar = payload.avatar.or(user.avatar.clone());

        let mut response = db
            .query("UPDATE $user SET name = $name, email = $email, avatar = $avatar, updated_at = time::now() RETURN AFTER;")
            .bind(("user", create_user_thing(user_id)))
            .bind(("name", name))
            .bind(("email", email.clone()))
            .bind(("avatar", avatar))
            .await?;
        let updated: Option<UserRecord> = response.take(0).map_err(|e| {
            if violates_index(&e, "user_email") {
                Error::EmailAlreadyUsed { email }
            } else {
                Error::from(e)
            }
        })?;

        updated.ok_or_else(|| Error::UserNotFound {
            id: user_id.to_string(),
        })
    }

    pub async fn change_password(
        db: &Surreal<Any>,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let user = get_user(db, user_id).await?;
        if !password_service::verify_password(current_password, &user.password)? {
            return Err(Error::InvalidInput {
                reason: "Mot de passe actuel incorrect.".to_string(),
            });
        }
        validate_password(new_password)?;

        Self::store_password(db, user_id, new_password).await
    }

    /// Mails a reset link when the email is known. Says nothing about whether
    /// it was.
    pub async fn forgot_password(
        db: &Surreal<Any>,
        mailer: &dyn Mailer,
        frontend_url: &str,
        email: &str,
    ) -> Result<()> {
        let Some(user) = find_user_by_email(db, &normalize_email(email)).await? else {
            tracing::debug!("password reset requested for unknown email");
            return Ok(());
        };
        let Some(user_thing) = user.id else {
            return Ok(());
        };

        let token = Uuid::new_v4().simple().to_string();
        let expires = Utc::now() + Duration::hours(RESET_TOKEN_VALIDITY_HOURS);

        db.query("UPDATE $user SET reset_password_token = $reset_token, reset_password_expires = $expires;")
            .bind(("user", user_thing))
            .bind(("reset_token", token.clone()))
            .bind(("expires", surrealdb::Datetime::from(expires)))
            .await?
            .check()?;

        let link = format!("{}/reset-password/{}", frontend_url.trim_end_matches('/'), token);
        mailer
            .send(Mail {
                to: user.email,
                subject: "Réinitialisation de ton mot de passe RAP2RUE".to_string(),
                text: format!(
                    "Salut {},\n\nPour choisir un nouveau mot de passe, ouvre ce lien (valable 1 heure) :\n{}\n\nSi tu n'as rien demandé, ignore cet email.",
                    user.name, link
                ),
            })
            .await
    }

    pub async fn reset_password(db: &Surreal<Any>, token: &str, password: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(Error::InvalidResetToken);
        }

        let mut response = db
            .query("SELECT * FROM user WHERE reset_password_token = $reset_token AND reset_password_expires > time::now() LIMIT 1;")
            .bind(("reset_token", token.to_string()))
            .await?;
        let user: Option<UserRecord> = response.take(0)?;
        let user_thing = user.and_then(|u| u.id).ok_or(Error::InvalidResetToken)?;

        validate_password(password)?;
        let hashed_password = password_service::hash_password(password)?;

        db.query("UPDATE $user SET password = $password, reset_password_token = NONE, reset_password_expires = NONE, updated_at = time::now();")
            .bind(("user", user_thing))
            .bind(("password", hashed_password))
            .await?
            .check()?;

        Ok(())
    }

    /// Finds or creates the account behind a social login.
    pub async fn social_login(db: &Surreal<Any>, profile: SocialProfile) -> Result<UserRecord> {
        let email = profile
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Error::IdentityProvider {
                message: "Aucun email Google trouvé".to_string(),
            })?;

        let mut response = db
            .query("SELECT * FROM user WHERE google_id = $google_id LIMIT 1;")
            .bind(("google_id", profile.provider_id.clone()))
            .await?;
        let existing: Option<UserRecord> = response.take(0)?;
        if let Some(user) = existing {
            return Ok(user);
        }

        if find_user_by_email(db, &email).await?.is_some() {
            return Err(Error::InvalidInput {
                reason: "Un compte existe déjà avec cet email. Connecte-toi avec ton mot de passe."
                    .to_string(),
            });
        }

        // Never used to log in; the account only authenticates through Google.
        let placeholder_password =
            password_service::hash_password(&Uuid::new_v4().simple().to_string())?;
        let now = Utc::now();
        let new_user = UserRecord {
            id: None,
            name: profile.name,
            email,
            password: placeholder_password,
            role: Role::Fan,
            role_set: false,
            library: vec![],
            followers: vec![],
            avatar: profile.avatar,
            google_id: Some(profile.provider_id),
            referral_code: new_referral_code(),
            referred_by: None,
            points: 0,
            reset_password_token: None,
            reset_password_expires: None,
            created_at: now.into(),
            updated_at: now.into(),
        };

        let user = insert_user(db, new_user).await?;

        tracing::info!("new social account: {}", user.email);
        Ok(user)
    }

    /// Lets a social-login user pick fan or artist, once.
    pub async fn set_social_role(db: &Surreal<Any>, user_id: &str, role: Role) -> Result<UserRecord> {
        if !role.is_self_assignable() {
            return Err(Error::InvalidRole {
                role: role.to_string(),
            });
        }

        let user = get_user(db, user_id).await?;
        if user.role_set {
            return Err(Error::RoleAlreadySet);
        }

        let mut response = db
            .query("UPDATE $user SET role = $role, role_set = true, updated_at = time::now() RETURN AFTER;")
            .bind(("user", create_user_thing(user_id)))
            .bind(("role", role))
            .await?;
        let updated: Option<UserRecord> = response.take(0)?;

        updated.ok_or_else(|| Error::UserNotFound {
            id: user_id.to_string(),
        })
    }

    async fn store_password(db: &Surreal<Any>, user_id: &str, password: &str) -> Result<()> {
        let hashed_password = password_service::hash_password(password)?;
        db.query("UPDATE $user SET password = $password, updated_at = time::now();")
            .bind(("user", create_user_thing(user_id)))
            .bind(("password", hashed_password))
            .await?
            .check()?;
        Ok(())
    }
}

/// Creates the user; an email taken concurrently is still a conflict.
async fn insert_user(db: &Surreal<Any>, user: UserRecord) -> Result<UserRecord> {
    let email = user.email.clone();
    let created: Option<UserRecord> = db.create("user").content(user).await.map_err(|e| {
        if violates_index(&e, "user_email") {
            Error::EmailAlreadyUsed { email }
        } else {
            Error::from(e)
        }
    })?;

    created.ok_or(Error::DbError("Could not create user".into()))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<()> {
    if lazy_regex::regex_is_match!(r"^[^@\s]+@[^@\s]+\.[^@\s]+$", email) {
        Ok(())
    } else {
        Err(Error::InvalidInput {
            reason: "Adresse email invalide.".to_string(),
        })
    }
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::InvalidInput {
            reason: format!(
                "Le mot de passe doit contenir au moins {MIN_PASSWORD_LEN} caractères."
            ),
        });
    }
    Ok(())
}

fn new_referral_code() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

async fn referral_code_exists(db: &Surreal<Any>, code: &str) -> Result<bool> {
    let mut response = db
        .query("SELECT id FROM user WHERE referral_code = $code LIMIT 1;")
        .bind(("code", code.to_string()))
        .await?;
    let found: Option<RecordId> = response.take(0)?;
    Ok(found.is_some())
}
