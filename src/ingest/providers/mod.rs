// src/ingest/providers/mod.rs
pub mod bse;
pub mod nse;

use anyhow::{anyhow, Context, Result};
use std::time::Duration;

use crate::ingest::types::RawRecord;

pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) filings-screener/0.1";

/// HTTP client shared by the exchange feeds.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(4))
        .timeout(timeout)
        .build()
        .context("building feed http client")
}

/// Pull the record array out of a feed payload.
///
/// Accepts a top-level array or an object holding the array under one of
/// `keys`. Non-object entries are skipped.
pub(crate) fn records_from_json(body: &str, keys: &[&str]) -> Result<Vec<RawRecord>> {
    let v: serde_json::Value = serde_json::from_str(body).context("parsing feed json")?;
    let arr = match &v {
        serde_json::Value::Array(a) => a,
        serde_json::Value::Object(o) => keys
            .iter()
            .find_map(|k| o.get(*k).and_then(|x| x.as_array()))
            .ok_or_else(|| anyhow!("feed payload has none of {keys:?}"))?,
        _ => return Err(anyhow!("feed payload is neither array nor object")),
    };
    Ok(arr.iter().filter_map(|x| x.as_object().cloned()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_array_or_wrapped_array() {
        let a = records_from_json(r#"[{"symbol":"A"}, 3, {"symbol":"B"}]"#, &["data"]).unwrap();
        assert_eq!(a.len(), 2);
        let b = records_from_json(r#"{"data":[{"symbol":"A"}]}"#, &["data"]).unwrap();
        assert_eq!(b.len(), 1);
        assert!(records_from_json(r#"{"other":[]}"#, &["data"]).is_err());
        assert!(records_from_json("not json", &["data"]).is_err());
    }
}
