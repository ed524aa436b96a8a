use diesel::pg::PgConnection;
use diesel::prelude::*;
use rand::Rng;
use uuid::Uuid;

use swarsh_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::User;
use crate::schema::users;

const TOKEN_LEN: usize = 5;
const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a short invite token, e.g. `XK7P2`.
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_CHARSET[rng.gen_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}

/// Issue a fresh invite token for `user_id`, overwriting any unconsumed one.
/// At most one live token per user; paired users cannot invite.
pub fn issue_invite(conn: &mut PgConnection, user_id: Uuid) -> AppResult<String> {
    let user: User = users::table
        .find(user_id)
        .first(conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    if user.paired_with.is_some() {
        return Err(AppError::new(ErrorCode::AlreadyPaired, "you are already paired"));
    }

    let token = generate_token();
    diesel::update(users::table.find(user_id))
        .set((
            users::pair_token.eq(&token),
            users::updated_at.eq(chrono::Utc::now()),
        ))
        .execute(conn)?;

    tracing::info!(user_id = %user_id, "invite token issued");

    Ok(token)
}

/// Redeem `token` for `redeemer_id`, linking both users symmetrically.
///
/// The token claim is a conditional update (token matches AND owner still
/// unpaired), so a token is consumed exactly once and a third user can never
/// join an existing pairing. Both sides are written in one transaction.
pub fn redeem_invite(conn: &mut PgConnection, redeemer_id: Uuid, token: &str) -> AppResult<User> {
    conn.transaction::<User, AppError, _>(|conn| {
        let redeemer: User = users::table
            .find(redeemer_id)
            .first(conn)
            .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

        if redeemer.paired_with.is_some() {
            return Err(AppError::new(ErrorCode::AlreadyPaired, "you are already paired"));
        }

        let now = chrono::Utc::now();

        let owner: Option<User> = diesel::update(
            users::table
                .filter(users::pair_token.eq(token))
                .filter(users::paired_with.is_null())
                .filter(users::id.ne(redeemer_id)),
        )
        .set((
            users::pair_token.eq(None::<String>),
            users::paired_with.eq(redeemer_id),
            users::updated_at.eq(now),
        ))
        .get_result(conn)
        .optional()?;

        let owner = owner.ok_or_else(|| {
            AppError::new(ErrorCode::InviteInvalid, "invite token unknown or already consumed")
        })?;

        diesel::update(users::table.find(redeemer_id))
            .set((
                users::paired_with.eq(owner.id),
                users::pair_token.eq(None::<String>),
                users::updated_at.eq(now),
            ))
            .execute(conn)?;

        tracing::info!(inviter = %owner.id, redeemer = %redeemer_id, "couple paired");

        Ok(owner)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token
            .bytes()
            .all(|b| TOKEN_CHARSET.contains(&b)));
    }

    #[test]
    fn tokens_vary() {
        // 36^5 values; two consecutive draws colliding would be remarkable.
        let a = generate_token();
        let b = generate_token();
        let c = generate_token();
        assert!(!(a == b && b == c));
    }
}
