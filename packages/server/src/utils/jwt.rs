use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT claims minted by the identity collaborator. The contest core trusts
/// them as-is; it stores no accounts of its own.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Display name
    pub uid: i32,    // Actor ID
    pub role: String,
    /// External rating, feeds the badge tier on the scoreboard.
    #[serde(default)]
    pub rating: Option<i32>,
    pub exp: usize, // Expiration timestamp
}

/// Sign a token the way the identity collaborator would. Used by tests and
/// operational tooling.
pub fn sign(
    secret: &str,
    actor_id: i32,
    display_name: &str,
    role: &str,
    rating: Option<i32>,
) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(7))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: display_name.to_owned(),
        uid: actor_id,
        role: role.to_owned(),
        rating,
        exp: expiration as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a JWT token.
pub fn verify(secret: &str, token: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
