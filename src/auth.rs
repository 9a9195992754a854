//! Identity extraction for requests signed in through the auth service.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::models::config::ServerConfig;
use crate::services::{ServiceError, ServiceResult};

/// Claims carried by the identity cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    pub hub_id: i32,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: usize,
}

impl AuthenticatedUser {
    pub fn from_jwt(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = decode::<AuthenticatedUser>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    pub fn to_jwt(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn has_role(&self, role: &str) -> bool {
        check_role(role, &self.roles)
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = match req.get_identity() {
            Ok(identity) => identity,
            Err(_) => return ready(Err(actix_web::error::ErrorUnauthorized("Unauthorized"))),
        };

        let token = match identity.id() {
            Ok(token) => token,
            Err(_) => return ready(Err(actix_web::error::ErrorUnauthorized("Unauthorized"))),
        };

        let Some(config) = req.app_data::<web::Data<ServerConfig>>() else {
            log::error!("Server configuration is not registered");
            return ready(Err(actix_web::error::ErrorInternalServerError(
                "Missing configuration",
            )));
        };

        match AuthenticatedUser::from_jwt(&token, &config.secret) {
            Ok(user) => ready(Ok(user)),
            Err(err) => {
                log::warn!("Rejected identity token: {err}");
                ready(Err(actix_web::error::ErrorUnauthorized("Unauthorized")))
            }
        }
    }
}

pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role)
}

/// Fails with [`ServiceError::Unauthorized`] unless `user` holds `role`.
pub fn ensure_role(user: &AuthenticatedUser, role: &str) -> ServiceResult<()> {
    if user.has_role(role) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".into(),
            email: "op@example.com".into(),
            hub_id: 3,
            name: "Op".into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            exp: 4_102_444_800,
        }
    }

    #[test]
    fn token_round_trip_keeps_claims() {
        let original = user(&["toguna"]);
        let token = original.to_jwt("secret").expect("encode");
        let decoded = AuthenticatedUser::from_jwt(&token, "secret").expect("decode");
        assert_eq!(decoded, original);
        assert!(AuthenticatedUser::from_jwt(&token, "other").is_err());
    }

    #[test]
    fn roles_are_checked_exactly() {
        let operator = user(&["toguna", "toguna_operator"]);
        assert!(ensure_role(&operator, "toguna").is_ok());
        assert!(matches!(
            ensure_role(&operator, "toguna_director"),
            Err(ServiceError::Unauthorized)
        ));
        assert!(!check_role("toguna_dir", &operator.roles));
    }
}
