use governor::{clock::DefaultClock, state::keyed::HashMapStateStore, Quota, RateLimiter};
use std::{fmt, net::IpAddr, num::NonZeroU32, time::Duration};

type KeyedLimiter = RateLimiter<IpAddr, HashMapStateStore<IpAddr>, DefaultClock>;

/// Per client IP request limiter.
///
/// Allows bursts of `max` requests, replenished evenly over `window`.
pub struct ClientRateLimiter {
    limiter: KeyedLimiter,
}

impl fmt::Debug for ClientRateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRateLimiter").field("tracked_clients", &self.limiter.len()).finish()
    }
}

impl ClientRateLimiter {
    pub fn new(max: NonZeroU32, window: Duration) -> Self {
        let period = window / max.get();
        let quota = Quota::with_period(period).unwrap_or_else(|| Quota::per_second(max)).allow_burst(max);
        Self { limiter: RateLimiter::hashmap(quota) }
    }

    /// Returns true if `client` may be served now, consuming one request.
    pub fn check(&self, client: IpAddr) -> bool {
        self.limiter.check_key(&client).is_ok()
    }

    /// Forgets clients whose quota has fully replenished.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}
