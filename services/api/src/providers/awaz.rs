//! Outbound call scheduling through Awaz.

use super::{UpstreamError, endpoint, post_json};
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use secrecy::SecretString;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// How far in the future a requested call is placed.
pub const CALL_DELAY_MINUTES: i64 = 2;

#[derive(Serialize)]
struct ScheduleCallRequest<'a> {
    agent: &'a str,
    name: &'a str,
    phone: &'a str,
    from: &'a str,
    datetime: String,
}

/// The moment a call requested at `now` should be placed, as an RFC 3339 UTC string.
pub fn call_time(now: DateTime<Utc>) -> String {
    (now + TimeDelta::minutes(CALL_DELAY_MINUTES)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub struct AwazCalls<'a> {
    pub http: &'a reqwest::Client,
    pub api_base: &'a str,
    pub api_key: &'a SecretString,
    pub agent_id: &'a str,
    pub caller_number: &'a str,
}

impl AwazCalls<'_> {
    /// Schedules a call to `phone` and returns the provider's response body.
    pub async fn schedule(&self, name: &str, phone: &str) -> Result<Value, UpstreamError> {
        let datetime = call_time(Utc::now());
        info!(%datetime, "Scheduling outbound call");
        let body = ScheduleCallRequest {
            agent: self.agent_id,
            name,
            phone,
            from: self.caller_number,
            datetime,
        };
        post_json(
            self.http,
            &endpoint(self.api_base, "calls"),
            self.api_key,
            &[],
            &body,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_call_time_is_two_minutes_out() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 59, 30).unwrap();
        assert_eq!(call_time(now), "2024-01-15T11:01:30.000Z");
    }
}
