//! Command run requests
//!
//! `send_cmd` and `send_cmd_sequence` carry their options as JSON params:
//!
//! ```json
//! {"sequence": ["POWER", "INPUT_HDMI"], "repeat": 2, "delay": 500, "hold": 0}
//! ```
//!
//! `repeat` counts runs, `delay` and `hold` are milliseconds. Empty strings
//! and `null` mean "not set".

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use rq_core::StatusCode;

/// Request parameter errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Missing parameter '{0}'")]
    MissingParam(&'static str),

    #[error("Invalid value for parameter '{name}': {value}")]
    InvalidParam { name: &'static str, value: String },
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        StatusCode::BadRequest
    }
}

pub type RequestResult<T> = Result<T, RequestError>;

/// How a request is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One command, dispatched once per repeat
    Single,
    /// One command, dispatched continuously for the hold time per repeat
    Hold,
    /// Several commands in order per repeat, each held if a hold time is set
    Sequence,
}

/// What to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Command(String),
    Sequence(Vec<String>),
}

/// A request to run one command or a command sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRequest {
    pub target: Target,
    pub repeat: u32,
    pub delay: Duration,
    pub hold: Duration,
}

impl SequenceRequest {
    /// Run `command` once
    pub fn command(command: impl Into<String>) -> Self {
        Self::new(Target::Command(command.into()))
    }

    /// Run `commands` in order once
    pub fn sequence<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Target::Sequence(commands.into_iter().map(Into::into).collect()))
    }

    fn new(target: Target) -> Self {
        Self {
            target,
            repeat: 1,
            delay: Duration::ZERO,
            hold: Duration::ZERO,
        }
    }

    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat.max(1);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    /// Build the request of a `send_cmd` command from its params
    pub fn from_send_cmd(params: Option<&Value>) -> RequestResult<Self> {
        let command = match param(params, "command") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::String(_)) | None => return Err(RequestError::MissingParam("command")),
            Some(other) => {
                return Err(RequestError::InvalidParam {
                    name: "command",
                    value: other.to_string(),
                })
            }
        };
        Self::command(command).with_options(params)
    }

    /// Build the request of a `send_cmd_sequence` command from its params
    pub fn from_send_cmd_sequence(params: Option<&Value>) -> RequestResult<Self> {
        let sequence = match param(params, "sequence") {
            Some(Value::Array(items)) if !items.is_empty() => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(RequestError::InvalidParam {
                        name: "sequence",
                        value: other.to_string(),
                    }),
                })
                .collect::<RequestResult<Vec<_>>>()?,
            Some(Value::Array(_)) | None => return Err(RequestError::MissingParam("sequence")),
            Some(other) => {
                return Err(RequestError::InvalidParam {
                    name: "sequence",
                    value: other.to_string(),
                })
            }
        };
        Self::sequence(sequence).with_options(params)
    }

    fn with_options(mut self, params: Option<&Value>) -> RequestResult<Self> {
        if let Some(repeat) = number_param(params, "repeat")? {
            if repeat == 0 || repeat > u64::from(u32::MAX) {
                return Err(RequestError::InvalidParam {
                    name: "repeat",
                    value: repeat.to_string(),
                });
            }
            self.repeat = repeat as u32;
        }
        if let Some(delay) = number_param(params, "delay")? {
            self.delay = Duration::from_millis(delay);
        }
        if let Some(hold) = number_param(params, "hold")? {
            self.hold = Duration::from_millis(hold);
        }
        Ok(self)
    }

    /// Commands of one repeat run, in order
    pub fn commands(&self) -> &[String] {
        match &self.target {
            Target::Command(command) => std::slice::from_ref(command),
            Target::Sequence(commands) => commands,
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        match (&self.target, self.hold.is_zero()) {
            (Target::Sequence(_), _) => ExecutionMode::Sequence,
            (Target::Command(_), true) => ExecutionMode::Single,
            (Target::Command(_), false) => ExecutionMode::Hold,
        }
    }

    /// Delay between repeat runs; a request that runs once has none
    pub fn effective_delay(&self) -> Duration {
        if self.repeat <= 1 {
            Duration::ZERO
        } else {
            self.delay
        }
    }
}

fn param<'a>(params: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    params.and_then(|p| p.get(name)).filter(|v| !v.is_null())
}

/// Non-negative integer param, also accepted as a numeric string
fn number_param(params: Option<&Value>, name: &'static str) -> RequestResult<Option<u64>> {
    let invalid = |value: &Value| RequestError::InvalidParam {
        name,
        value: value.to_string(),
    };

    let Some(value) = param(params, name) else {
        return Ok(None);
    };
    match value {
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().parse().map(Some).map_err(|_| invalid(value)),
        Value::Number(n) => match (n.as_u64(), n.as_f64()) {
            (Some(n), _) => Ok(Some(n)),
            (None, Some(f)) if f >= 0.0 && f.fract() == 0.0 => Ok(Some(f as u64)),
            _ => Err(invalid(value)),
        },
        _ => Err(invalid(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let params = json!({"command": "MUTE"});
        let request = SequenceRequest::from_send_cmd(Some(&params)).unwrap();
        assert_eq!(request.commands(), ["MUTE".to_string()]);
        assert_eq!(request.repeat, 1);
        assert_eq!(request.delay, Duration::ZERO);
        assert_eq!(request.hold, Duration::ZERO);
        assert_eq!(request.mode(), ExecutionMode::Single);
    }

    #[test]
    fn test_sequence_options() {
        let params = json!({"sequence": ["A", "B"], "repeat": 2, "delay": 500, "hold": "250"});
        let request = SequenceRequest::from_send_cmd_sequence(Some(&params)).unwrap();
        assert_eq!(request.commands(), ["A".to_string(), "B".to_string()]);
        assert_eq!(request.repeat, 2);
        assert_eq!(request.effective_delay(), Duration::from_millis(500));
        assert_eq!(request.hold, Duration::from_millis(250));
        assert_eq!(request.mode(), ExecutionMode::Sequence);
    }

    #[test]
    fn test_delay_is_ignored_without_repeat() {
        let params = json!({"command": "X", "delay": 1000});
        let request = SequenceRequest::from_send_cmd(Some(&params)).unwrap();
        assert_eq!(request.delay, Duration::from_millis(1000));
        assert_eq!(request.effective_delay(), Duration::ZERO);
    }

    #[test]
    fn test_empty_values_mean_unset() {
        let params = json!({"command": "X", "hold": "", "repeat": null});
        let request = SequenceRequest::from_send_cmd(Some(&params)).unwrap();
        assert_eq!(request.repeat, 1);
        assert_eq!(request.mode(), ExecutionMode::Single);
    }

    #[test]
    fn test_hold_mode() {
        let request = SequenceRequest::command("X").with_hold(Duration::from_millis(1000));
        assert_eq!(request.mode(), ExecutionMode::Hold);
    }

    #[test]
    fn test_missing_target() {
        assert_eq!(
            SequenceRequest::from_send_cmd(None),
            Err(RequestError::MissingParam("command"))
        );
        assert_eq!(
            SequenceRequest::from_send_cmd_sequence(Some(&json!({"sequence": []}))),
            Err(RequestError::MissingParam("sequence"))
        );
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            json!({"command": "X", "repeat": 0}),
            json!({"command": "X", "repeat": -1}),
            json!({"command": "X", "delay": "soon"}),
            json!({"command": "X", "hold": [1]}),
            json!({"command": 5}),
        ];
        for params in cases {
            let err = SequenceRequest::from_send_cmd(Some(&params)).unwrap_err();
            assert_eq!(err.status(), StatusCode::BadRequest, "params: {}", params);
        }

        let err = SequenceRequest::from_send_cmd_sequence(Some(&json!({"sequence": ["A", 1]})))
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidParam { name: "sequence", .. }));
    }
}
