/// Free-tier daily swipe allowance.
pub const FREE_DAILY_SWIPES: usize = 10;

/// Whether another swipe is allowed given the number of entries already
/// tracked in today's swiped set. Premium users are exempt from the limit.
pub fn swipe_allowed(count_today: usize, premium: bool) -> bool {
    premium || count_today < FREE_DAILY_SWIPES
}
