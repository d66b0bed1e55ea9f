//! Fetches a year of GitHub contributions for the home page graph.
//!
//! One GraphQL request is made per fetch; the response is reshaped into a
//! [`ContributionCalendar`] of weeks and days with each day bucketed into an
//! intensity level from 0 to 4.

use crate::config::GithubConfig;
use crate::log;
use chrono::{DateTime, Months, SecondsFormat, Utc};
use serde::Deserialize;
use std::time::Duration;

/// The GitHub GraphQL endpoint.
pub const ENDPOINT: &str = "https://api.github.com/graphql";

/// Applies to the whole request, connect to last byte.
pub const TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const QUERY: &str = r#"
query($userName: String!, $from: DateTime!) {
  user(login: $userName) {
    contributionsCollection(from: $from) {
      contributionCalendar {
        totalContributions
        weeks {
          contributionDays {
            date
            contributionCount
            contributionLevel
          }
        }
      }
    }
  }
}
"#;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContributionDay {
    /// `YYYY-MM-DD`, as reported by GitHub.
    pub date: String,
    pub count: u32,

    /// 0 (no contributions) to 4 (top quartile).
    pub level: u8,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContributionWeek {
    pub days: Vec<ContributionDay>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContributionCalendar {
    pub total: u32,
    pub weeks: Vec<ContributionWeek>,
}

/// Maps GitHub's `ContributionLevel` enum onto 0-4. Unknown values are 0.
pub fn level(value: &str) -> u8 {
    match value {
        "FIRST_QUARTILE" => 1,
        "SECOND_QUARTILE" => 2,
        "THIRD_QUARTILE" => 3,
        "FOURTH_QUARTILE" => 4,
        _ => 0,
    }
}

#[derive(Deserialize)]
struct Response {
    data: Option<Data>,

    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
struct Data {
    user: Option<User>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct User {
    contributions_collection: Collection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Collection {
    contribution_calendar: Calendar,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Calendar {
    total_contributions: u32,
    weeks: Vec<Week>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Week {
    contribution_days: Vec<Day>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Day {
    date: String,
    contribution_count: u32,
    contribution_level: String,
}

impl From<Calendar> for ContributionCalendar {
    fn from(calendar: Calendar) -> ContributionCalendar {
        ContributionCalendar {
            total: calendar.total_contributions,
            weeks: calendar
                .weeks
                .into_iter()
                .map(|week| ContributionWeek {
                    days: week
                        .contribution_days
                        .into_iter()
                        .map(|day| ContributionDay {
                            level: level(&day.contribution_level),
                            date: day.date,
                            count: day.contribution_count,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Decodes a GraphQL response. Errors reported in the body take precedence
/// over the HTTP status, which in turn takes precedence over a body that
/// isn't JSON.
pub fn decode(status: u16, body: &str) -> Result<ContributionCalendar> {
    let parsed = serde_json::from_str::<Response>(body);
    if let Ok(response) = &parsed {
        if !response.errors.is_empty() {
            let messages: Vec<_> = response.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(Error::Graphql(messages.join("; ")));
        }
    }
    if !(200..300).contains(&status) {
        return Err(Error::Status {
            status,
            body: body.to_owned(),
        });
    }
    parsed?
        .data
        .and_then(|data| data.user)
        .map(|user| ContributionCalendar::from(user.contributions_collection.contribution_calendar))
        .ok_or(Error::MissingUser)
}

/// A blocking client for the contributions query.
pub struct Client {
    client: reqwest::blocking::Client,
    token: String,
}

impl Client {
    pub fn new(token: &str) -> Result<Client> {
        Ok(Client {
            client: reqwest::blocking::Client::builder()
                .timeout(TIMEOUT)
                .user_agent(USER_AGENT)
                .build()?,
            token: token.to_owned(),
        })
    }

    /// Fetches the contributions of `username` made since `from`.
    pub fn fetch(&self, username: &str, from: DateTime<Utc>) -> Result<ContributionCalendar> {
        let request = serde_json::json!({
            "query": QUERY,
            "variables": {
                "userName": username,
                "from": from.to_rfc3339_opts(SecondsFormat::Secs, true),
            },
        });
        let response = self
            .client
            .post(ENDPOINT)
            .bearer_auth(&self.token)
            .json(&request)
            .send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        decode(status, &body)
    }
}

impl GithubConfig {
    /// The contributions of the configured user over the last year. `None`
    /// when credentials are missing or the fetch fails; both are logged.
    pub fn contributions(&self) -> Option<ContributionCalendar> {
        let Some((username, token)) = self.credentials() else {
            log!("github"; "no credentials configured, skipping contributions");
            return None;
        };

        let now = Utc::now();
        let from = now.checked_sub_months(Months::new(12)).unwrap_or(now);
        match Client::new(token).and_then(|client| client.fetch(username, from)) {
            Ok(calendar) => {
                log!("github"; "{} contributions for {}", calendar.total, username);
                Some(calendar)
            }
            Err(e) => {
                log!("github"; "failed to fetch contributions: {}", e);
                None
            }
        }
    }
}

/// The result of a contributions fetch.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the request can't be built or sent, or times out.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Returned for a non-2xx response.
    #[error("api returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Returned when the response lists GraphQL errors.
    #[error("graphql errors: {0}")]
    Graphql(String),

    /// Returned when the response body isn't the expected JSON.
    #[error("failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// Returned when the response has no data for the user.
    #[error("response has no user data")]
    MissingUser,
}
