//! Access log line rendering.
//!
//! `combined` and `common` follow the Apache/Nginx layouts, `json` emits one
//! object per line, and any other value is a pattern of `$variables`.

use std::borrow::Cow;
use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";
const COMMON: &str = "$remote_addr - - [$time_local] \"$request\" $status $body_bytes_sent";
const COMBINED: &str = concat!(
    "$remote_addr - - [$time_local] \"$request\" $status $body_bytes_sent",
    " \"$http_referer\" \"$http_user_agent\""
);

/// One relayed request, filled in as the pipeline runs
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: IpAddr,
    pub time: DateTime<Local>,
    pub method: String,
    /// Path plus query string, as received
    pub uri: String,
    pub http_version: &'static str,
    pub status: u16,
    pub body_bytes: u64,
    pub origin: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Upstream URL that answered, if the request got that far
    pub upstream: Option<String>,
    pub elapsed: Duration,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    remote_addr: IpAddr,
    time: String,
    method: &'a str,
    uri: &'a str,
    http_version: &'a str,
    status: u16,
    body_bytes: u64,
    origin: Option<&'a str>,
    referer: Option<&'a str>,
    user_agent: Option<&'a str>,
    upstream: Option<&'a str>,
    request_time_us: u128,
}

impl AccessLogEntry {
    pub fn new(remote_addr: IpAddr, method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method: method.into(),
            uri: uri.into(),
            http_version: "1.1",
            status: 0,
            body_bytes: 0,
            origin: None,
            referer: None,
            user_agent: None,
            upstream: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => self.render(COMBINED),
            "common" => self.render(COMMON),
            "json" => self.to_json(),
            pattern => self.render(pattern),
        }
    }

    fn to_json(&self) -> String {
        let line = JsonLine {
            remote_addr: self.remote_addr,
            time: self.time.to_rfc3339(),
            method: &self.method,
            uri: &self.uri,
            http_version: self.http_version,
            status: self.status,
            body_bytes: self.body_bytes,
            origin: self.origin.as_deref(),
            referer: self.referer.as_deref(),
            user_agent: self.user_agent.as_deref(),
            upstream: self.upstream.as_deref(),
            request_time_us: self.elapsed.as_micros(),
        };
        serde_json::to_string(&line).unwrap_or_default()
    }

    /// Value of a `$variable`, `None` for names this log does not know
    fn variable(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = match name {
            "remote_addr" => Cow::Owned(self.remote_addr.to_string()),
            "time_local" => Cow::Owned(self.time.format(CLF_TIME).to_string()),
            "time_iso8601" => Cow::Owned(self.time.to_rfc3339()),
            "request" => Cow::Owned(format!(
                "{} {} HTTP/{}",
                self.method, self.uri, self.http_version
            )),
            "request_method" => Cow::Borrowed(self.method.as_str()),
            "request_uri" => Cow::Borrowed(self.uri.as_str()),
            "status" => Cow::Owned(self.status.to_string()),
            "body_bytes_sent" => Cow::Owned(self.body_bytes.to_string()),
            "request_time" => Cow::Owned(format!("{:.3}", self.elapsed.as_secs_f64())),
            "http_origin" => dash(self.origin.as_deref()),
            "http_referer" => dash(self.referer.as_deref()),
            "http_user_agent" => dash(self.user_agent.as_deref()),
            "upstream_url" => dash(self.upstream.as_deref()),
            _ => return None,
        };
        Some(value)
    }

    /// Expand `$name` tokens; unknown names are copied through unchanged.
    fn render(&self, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() + 64);
        let mut rest = pattern;
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            let name = &after[..len];
            match self.variable(name) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push('$');
                    out.push_str(name);
                }
            }
            rest = &after[len..];
        }
        out.push_str(rest);
        out
    }
}

fn dash(value: Option<&str>) -> Cow<'_, str> {
    Cow::Borrowed(value.unwrap_or("-"))
}
