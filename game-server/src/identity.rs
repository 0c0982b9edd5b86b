use game_types::Identity;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IdentityError {
    #[error("Missing caller identity")]
    Missing,
    #[error("Invalid identity token")]
    InvalidToken,
}

/// Parse a caller token.
///
/// Accepted forms:
/// - `<uuid>` or `<uuid>:<display name>` for signed-in users
/// - `guest:<uuid>` for guests
pub fn parse_token(token: &str) -> Result<Identity, IdentityError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(IdentityError::Missing);
    }

    if let Some(guest_id) = token.strip_prefix("guest:") {
        return parse_uuid(guest_id).map(Identity::guest);
    }

    let (id, name) = match token.split_once(':') {
        Some((id, name)) => (id, name.trim()),
        None => (token, ""),
    };
    let id = parse_uuid(id)?;

    Ok(Identity {
        id,
        display_name: (!name.is_empty()).then(|| name.to_string()),
        is_guest: false,
    })
}

/// Resolve the caller from the `Authorization` and `X-Guest-Id` headers.
/// A bearer token wins when both are present.
pub fn resolve_identity(
    authorization: Option<String>,
    guest_id: Option<String>,
) -> Result<Identity, IdentityError> {
    if let Some(header) = authorization {
        let token = header.strip_prefix("Bearer ").unwrap_or(&header);
        return parse_token(token);
    }

    match guest_id {
        Some(id) => parse_uuid(&id).map(Identity::guest),
        None => Err(IdentityError::Missing),
    }
}

fn parse_uuid(value: &str) -> Result<Uuid, IdentityError> {
    Uuid::parse_str(value.trim()).map_err(|_| IdentityError::InvalidToken)
}
