extern crate anyhow;
extern crate regex;
extern crate reqwest;
extern crate serde_json;
extern crate std;

pub type HoboDashResult<T> = std::result::Result<T, HoboDashError>;

#[derive(Debug)]
pub enum HoboDashError {
    ContextError(anyhow::Error),
    HttpError(reqwest::Error),
    JsonError(serde_json::Error),
    RegexError(regex::Error),
    Other(String),
}

pub fn make_error(message: &str) -> HoboDashError {
    return HoboDashError::Other(message.to_string());
}

impl std::fmt::Display for HoboDashError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            HoboDashError::ContextError(ref err) => {
                return write!(f, "{:#}", err);
            },
            HoboDashError::HttpError(ref err) => {
                return write!(f, "HTTP Error: {}", err);
            },
            HoboDashError::JsonError(ref err) => {
                return write!(f, "JSON Error: {}", err);
            },
            HoboDashError::RegexError(ref err) => {
                return write!(f, "Regex Error: {}", err);
            },
            HoboDashError::Other(ref message) => {
                return write!(f, "{}", message);
            },
        }
    }
}

impl std::error::Error for HoboDashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            HoboDashError::ContextError(ref err) => Some(&**err),
            HoboDashError::HttpError(ref err) => Some(err),
            HoboDashError::JsonError(ref err) => Some(err),
            HoboDashError::RegexError(ref err) => Some(err),
            HoboDashError::Other(_) => None,
        }
    }
}

impl From<anyhow::Error> for HoboDashError {
    fn from(err: anyhow::Error) -> HoboDashError {
        return HoboDashError::ContextError(err);
    }
}

impl From<reqwest::Error> for HoboDashError {
    fn from(err: reqwest::Error) -> HoboDashError {
        return HoboDashError::HttpError(err);
    }
}

impl From<serde_json::Error> for HoboDashError {
    fn from(err: serde_json::Error) -> HoboDashError {
        return HoboDashError::JsonError(err);
    }
}

impl From<regex::Error> for HoboDashError {
    fn from(err: regex::Error) -> HoboDashError {
        return HoboDashError::RegexError(err);
    }
}

/// What a panel shows: either the rows its pipeline produced, or the reason
/// the pipeline failed. An empty `Rows` is a successful fetch with nothing
/// in the window, not a failure.
#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum PanelOutcome<T> {
    Rows(Vec<T>),
    Failed(String),
}

impl<T> From<HoboDashResult<Vec<T>>> for PanelOutcome<T> {
    fn from(result: HoboDashResult<Vec<T>>) -> PanelOutcome<T> {
        match result {
            Ok(rows) => return PanelOutcome::Rows(rows),
            Err(err) => return PanelOutcome::Failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{make_error, HoboDashResult, PanelOutcome};

    #[test]
    fn ok_result_becomes_rows() {
        let result: HoboDashResult<Vec<u32>> = Ok(vec![]);
        assert_eq!(PanelOutcome::from(result), PanelOutcome::Rows(vec![]));
    }

    #[test]
    fn err_result_becomes_failure_with_reason() {
        let result: HoboDashResult<Vec<u32>> = Err(make_error("connection reset"));
        assert_eq!(PanelOutcome::from(result), PanelOutcome::Failed("connection reset".to_string()));
    }

    #[test]
    fn json_error_is_prefixed() {
        let err: super::HoboDashError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(err.to_string().starts_with("JSON Error: "));
    }
}
