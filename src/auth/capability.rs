//! Role gate shared by the routing middlewares and the services.
//!
//! Every check is a pure function of the role carried by a verified token;
//! there is no per-resource permission table.

use crate::{
    error::{Error, Result},
    middlewares::mw_auth::Ctx,
    models::user::Role,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Any verified identity.
    Authenticated,
    /// Upload media, artist dashboard.
    Artist,
    /// User, music and video moderation, role promotion, stats.
    Admin,
}

impl Capability {
    pub fn allows(&self, role: Role) -> bool {
        match self {
            Capability::Authenticated => true,
            Capability::Artist => role == Role::Artist,
            Capability::Admin => role == Role::Admin,
        }
    }

    fn denial(&self) -> &'static str {
        match self {
            Capability::Authenticated => "Non authentifié",
            Capability::Artist => "Seuls les artistes peuvent accéder à cette ressource.",
            Capability::Admin => "Accès réservé à l’admin.",
        }
    }
}

/// Allows or denies `capability` for the identity behind `ctx`.
pub fn authorize(ctx: &Ctx, capability: Capability) -> Result<()> {
    if capability.allows(ctx.role) {
        Ok(())
    } else {
        tracing::debug!(
            "capability {:?} denied for user {} ({})",
            capability,
            ctx.user_id,
            ctx.role
        );
        Err(Error::AccessDenied {
            reason: capability.denial().to_string(),
        })
    }
}

/// Owner of the resource, or an admin.
pub fn authorize_owner_or_admin(ctx: &Ctx, owner_id: &str) -> Result<()> {
    if ctx.user_id == owner_id || ctx.role == Role::Admin {
        Ok(())
    } else {
        Err(Error::AccessDenied {
            reason: "Non autorisé.".to_string(),
        })
    }
}
