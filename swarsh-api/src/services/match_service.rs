use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use swarsh_shared::errors::AppResult;

use crate::models::{Match, NewMatch, Swipe, SwipeDirection};
use crate::schema::{matches, swipes};

/// Normalize an unordered user pair to its (lo, hi) storage key.
pub fn normalize_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Whether `rows` (the owner's swipes on the actor's photos, newest first)
/// contain a reciprocal like. Only the most recent swipe per photo counts:
/// a like that was later overridden by a pass on the same photo is dead.
pub fn has_reciprocal_like(rows: &[Swipe]) -> bool {
    let mut seen = std::collections::HashSet::new();
    for swipe in rows {
        if seen.insert(swipe.photo_id) && swipe.direction == SwipeDirection::Like.to_string() {
            return true;
        }
    }
    false
}

/// Did `owner` like one of `actor`'s photos?
pub fn reciprocal_like_exists(
    conn: &mut PgConnection,
    owner_id: Uuid,
    actor_id: Uuid,
) -> QueryResult<bool> {
    let rows: Vec<Swipe> = swipes::table
        .filter(swipes::swiper_id.eq(owner_id))
        .filter(swipes::photo_owner_id.eq(actor_id))
        .order(swipes::created_at.desc())
        .load(conn)?;

    Ok(has_reciprocal_like(&rows))
}

/// Create the match for an unordered pair, or return the existing one.
///
/// The pair key is unique, so two concurrent mutual swipes race cleanly:
/// one insert wins, the other hits the conflict and reads the winner's row.
/// Returns the match and whether this call created it.
pub fn create_or_get_match(
    conn: &mut PgConnection,
    photo_id: Uuid,
    user_a: Uuid,
    user_b: Uuid,
) -> AppResult<(Match, bool)> {
    let (user_lo, user_hi) = normalize_pair(user_a, user_b);

    let inserted = diesel::insert_into(matches::table)
        .values(&NewMatch {
            photo_id,
            user_lo,
            user_hi,
        })
        .on_conflict((matches::user_lo, matches::user_hi))
        .do_nothing()
        .execute(conn)?;

    let row: Match = matches::table
        .filter(matches::user_lo.eq(user_lo))
        .filter(matches::user_hi.eq(user_hi))
        .first(conn)?;

    Ok((row, inserted > 0))
}

/// All matches involving `user_id`, newest first.
pub fn matches_for_user(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<Vec<Match>> {
    matches::table
        .filter(matches::user_lo.eq(user_id).or(matches::user_hi.eq(user_id)))
        .order(matches::created_at.desc())
        .load(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn swipe(photo_id: Uuid, direction: SwipeDirection, age_secs: i64) -> Swipe {
        Swipe {
            id: Uuid::new_v4(),
            swiper_id: Uuid::new_v4(),
            photo_id,
            photo_owner_id: Uuid::new_v4(),
            direction: direction.to_string(),
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[test]
    fn pair_normalization_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(normalize_pair(a, b), normalize_pair(b, a));
        let (lo, hi) = normalize_pair(a, b);
        assert!(lo < hi);
    }

    #[test]
    fn no_swipes_means_no_reciprocity() {
        assert!(!has_reciprocal_like(&[]));
    }

    #[test]
    fn latest_like_counts() {
        let photo = Uuid::new_v4();
        let rows = vec![swipe(photo, SwipeDirection::Like, 0)];
        assert!(has_reciprocal_like(&rows));
    }

    #[test]
    fn pass_only_does_not_count() {
        let photo = Uuid::new_v4();
        let rows = vec![swipe(photo, SwipeDirection::Pass, 0)];
        assert!(!has_reciprocal_like(&rows));
    }

    #[test]
    fn most_recent_swipe_wins_per_photo() {
        let photo = Uuid::new_v4();
        // Newest first: a pass overriding an earlier like on the same photo.
        let rows = vec![
            swipe(photo, SwipeDirection::Pass, 0),
            swipe(photo, SwipeDirection::Like, 60),
        ];
        assert!(!has_reciprocal_like(&rows));

        // The reverse: like overriding an earlier pass.
        let rows = vec![
            swipe(photo, SwipeDirection::Like, 0),
            swipe(photo, SwipeDirection::Pass, 60),
        ];
        assert!(has_reciprocal_like(&rows));
    }

    #[test]
    fn stale_like_on_one_photo_still_counts_if_another_photo_likes() {
        let photo_a = Uuid::new_v4();
        let photo_b = Uuid::new_v4();
        let rows = vec![
            swipe(photo_a, SwipeDirection::Pass, 0),
            swipe(photo_b, SwipeDirection::Like, 30),
            swipe(photo_a, SwipeDirection::Like, 60),
        ];
        assert!(has_reciprocal_like(&rows));
    }
}
