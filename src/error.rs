use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Clone, Debug, Serialize, strum_macros::AsRefStr)]
#[serde(tag = "type", content = "data")]
pub enum Error {
    LoginFail,

    // -- Auth errors.
    AuthFailNoAuthToken,
    AuthFailTokenWrongFormat,
    AuthFailInvalidToken,
    AuthFailCtxNotInRequestExt,
    AccessDenied { reason: String },

    // -- Validation errors.
    MissingFields,
    InvalidInput { reason: String },
    InvalidRole { role: String },
    InvalidResetToken,
    InvalidOAuthState,

    // -- Conflicts.
    EmailAlreadyUsed { email: String },
    AlreadyOwned { music_id: String },
    OwnMusicPurchase,
    ReviewAlreadyExists,
    SelfFollow,
    RoleAlreadySet,

    // -- Entitlement.
    PurchaseRequired,

    // -- Not found.
    UserNotFound { id: String },
    ArtistNotFound { id: String },
    MusicNotFound { id: String },
    VideoNotFound { id: String },
    OrderNotFound { token: String },

    // -- Upstream providers.
    PaymentProvider { message: String },
    MediaProvider { message: String },
    MailProvider { message: String },
    IdentityProvider { message: String },

    // -- Internal.
    DbError(String),
    EnvVarError(String),
    TokenCreationError,
    PasswordHashError,
    IoError(String),
}

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        match self {
            Self::LoginFail => write!(fmt, "Email ou mot de passe incorrect."),
            Self::AuthFailNoAuthToken => write!(fmt, "Non autorisé"),
            Self::AuthFailTokenWrongFormat
            | Self::AuthFailInvalidToken
            | Self::AuthFailCtxNotInRequestExt => write!(fmt, "Token invalide"),
            Self::AccessDenied { reason } => write!(fmt, "{reason}"),

            Self::MissingFields => write!(fmt, "Tous les champs sont obligatoires."),
            Self::InvalidInput { reason } => write!(fmt, "{reason}"),
            Self::InvalidRole { role } => write!(fmt, "Rôle invalide : {role}"),
            Self::InvalidResetToken => write!(fmt, "Lien invalide ou expiré."),
            Self::InvalidOAuthState => write!(fmt, "Session de connexion expirée, recommence."),

            Self::EmailAlreadyUsed { .. } => write!(fmt, "Cet email est déjà utilisé."),
            Self::AlreadyOwned { .. } => write!(fmt, "Déjà achetée."),
            Self::OwnMusicPurchase => write!(fmt, "Impossible d’acheter sa propre musique."),
            Self::ReviewAlreadyExists => write!(fmt, "Tu as déjà laissé un avis."),
            Self::SelfFollow => write!(fmt, "Vous ne pouvez pas vous abonner à vous-même."),
            Self::RoleAlreadySet => write!(fmt, "Le rôle a déjà été choisi."),

            Self::PurchaseRequired => {
                write!(fmt, "Tu dois acheter la musique pour laisser un avis.")
            }

            Self::UserNotFound { .. } => write!(fmt, "Utilisateur non trouvé."),
            Self::ArtistNotFound { .. } => write!(fmt, "Artiste non trouvé."),
            Self::MusicNotFound { .. } => write!(fmt, "Musique introuvable."),
            Self::VideoNotFound { .. } => write!(fmt, "Vidéo non trouvée."),
            Self::OrderNotFound { .. } => write!(fmt, "Commande introuvable."),

            Self::PaymentProvider { message }
            | Self::MediaProvider { message }
            | Self::MailProvider { message }
            | Self::IdentityProvider { message } => write!(fmt, "{message}"),

            Self::DbError(_)
            | Self::EnvVarError(_)
            | Self::TokenCreationError
            | Self::PasswordHashError
            | Self::IoError(_) => write!(fmt, "Erreur serveur."),
        }
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status_code, client_error) = self.client_status_and_error();

        if status_code.is_server_error() {
            tracing::error!("{:?}", self);
        }

        let response_body = serde_json::json!({
            "error": client_error.as_ref(),
            "message": self.to_string(),
        });

        (status_code, Json(response_body)).into_response()
    }
}

impl Error {
    pub fn client_status_and_error(&self) -> (StatusCode, ClientError) {
        match self {
            Self::LoginFail => (StatusCode::UNAUTHORIZED, ClientError::LOGIN_FAIL),

            Self::AuthFailNoAuthToken
            | Self::AuthFailTokenWrongFormat
            | Self::AuthFailInvalidToken
            | Self::AuthFailCtxNotInRequestExt => (StatusCode::UNAUTHORIZED, ClientError::NO_AUTH),

            Self::AccessDenied { .. } | Self::PurchaseRequired => {
                (StatusCode::FORBIDDEN, ClientError::FORBIDDEN)
            }

            Self::MissingFields
            | Self::InvalidInput { .. }
            | Self::InvalidRole { .. }
            | Self::InvalidResetToken
            | Self::InvalidOAuthState => (StatusCode::BAD_REQUEST, ClientError::INVALID_PARAMS),

            Self::EmailAlreadyUsed { .. } => (StatusCode::CONFLICT, ClientError::CONFLICT),

            Self::AlreadyOwned { .. }
            | Self::OwnMusicPurchase
            | Self::ReviewAlreadyExists
            | Self::SelfFollow
            | Self::RoleAlreadySet => (StatusCode::BAD_REQUEST, ClientError::CONFLICT),

            Self::UserNotFound { .. }
            | Self::ArtistNotFound { .. }
            | Self::MusicNotFound { .. }
            | Self::VideoNotFound { .. }
            | Self::OrderNotFound { .. } => (StatusCode::NOT_FOUND, ClientError::RESOURCE_NOT_FOUND),

            Self::PaymentProvider { .. }
            | Self::MediaProvider { .. }
            | Self::MailProvider { .. }
            | Self::IdentityProvider { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ClientError::PROVIDER_ERROR,
            ),

            Self::DbError(_)
            | Self::EnvVarError(_)
            | Self::TokenCreationError
            | Self::PasswordHashError
            | Self::IoError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ClientError::SERVICE_ERROR,
            ),
        }
    }
}

#[derive(Debug, strum_macros::AsRefStr)]
#[allow(non_camel_case_types)]
pub enum ClientError {
    LOGIN_FAIL,
    NO_AUTH,
    FORBIDDEN,
    INVALID_PARAMS,
    CONFLICT,
    RESOURCE_NOT_FOUND,
    PROVIDER_ERROR,
    SERVICE_ERROR,
}

impl From<surrealdb::Error> for Error {
    fn from(err: surrealdb::Error) -> Self {
        Error::DbError(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        Error::AuthFailInvalidToken
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(_: bcrypt::BcryptError) -> Self {
        Error::PasswordHashError
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::EnvVarError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err.to_string())
    }
}
