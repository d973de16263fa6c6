//! Wire format between the caller and an isolated worker.
//!
//! One request line goes in on the worker's stdin; one outcome line comes
//! back on its stdout. Floats travel as decimal text so infinities and NaN
//! survive the hop (JSON numbers cannot carry them). Failures carry a kind
//! tag that maps back onto the same `CapabilityError` variant on the
//! caller's side.

use crate::error::CapabilityError;
use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub operation: String,
    pub symbol: String,
    #[serde(with = "float_text::seq")]
    pub operands: Vec<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    DivisionByZero,
    UnimplementedCapability,
    ExitRequested,
    Panicked,
    UnknownSymbol,
    InvalidRequest,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Value {
        #[serde(with = "float_text")]
        value: f64,
    },
    Failure {
        kind: FailureKind,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

impl ExecutionOutcome {
    pub fn from_result(result: Result<f64, CapabilityError>) -> Self {
        match result {
            Ok(value) => ExecutionOutcome::Value { value },
            Err(err) => {
                let (kind, detail) = match &err {
                    CapabilityError::DivisionByZero => (FailureKind::DivisionByZero, None),
                    CapabilityError::UnimplementedCapability(name) => {
                        (FailureKind::UnimplementedCapability, Some(name.clone()))
                    }
                    CapabilityError::ExitRequested => (FailureKind::ExitRequested, None),
                    CapabilityError::Panicked(msg) => (FailureKind::Panicked, Some(msg.clone())),
                    CapabilityError::UnknownSymbol(name) => {
                        (FailureKind::UnknownSymbol, Some(name.clone()))
                    }
                    CapabilityError::InvalidRequest(msg) => {
                        (FailureKind::InvalidRequest, Some(msg.clone()))
                    }
                };
                ExecutionOutcome::Failure {
                    kind,
                    message: err.to_string(),
                    detail,
                }
            }
        }
    }

    /// Rebuild the caller-side result, restoring the original error variant.
    pub fn into_result(self) -> Result<f64, CapabilityError> {
        match self {
            ExecutionOutcome::Value { value } => Ok(value),
            ExecutionOutcome::Failure {
                kind,
                message,
                detail,
            } => {
                let detail = detail.unwrap_or(message);
                Err(match kind {
                    FailureKind::DivisionByZero => CapabilityError::DivisionByZero,
                    FailureKind::UnimplementedCapability => {
                        CapabilityError::UnimplementedCapability(detail)
                    }
                    FailureKind::ExitRequested => CapabilityError::ExitRequested,
                    FailureKind::Panicked => CapabilityError::Panicked(detail),
                    FailureKind::UnknownSymbol => CapabilityError::UnknownSymbol(detail),
                    FailureKind::InvalidRequest => CapabilityError::InvalidRequest(detail),
                })
            }
        }
    }
}

/// Serialize `message` as a single NDJSON line.
pub fn write_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<()> {
    serde_json::to_writer(&mut *writer, message).context("serializing worker message")?;
    writer.write_all(b"\n").context("writing worker message")?;
    writer.flush().context("flushing worker message")?;
    Ok(())
}

/// Read exactly one non-empty NDJSON line from `reader`.
pub fn read_message<R: BufRead, T: DeserializeOwned>(reader: &mut R) -> Result<T> {
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .context("reading worker message")?;
        if read == 0 {
            bail!("channel closed before a message arrived");
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    serde_json::from_str(line.trim()).context("decoding worker message")
}

mod float_text {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<f64>()
            .map_err(|_| D::Error::custom(format!("invalid float text {raw:?}")))
    }

    pub mod seq {
        use serde::ser::SerializeSeq;
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(values.len()))?;
            for value in values {
                seq.serialize_element(&value.to_string())?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<f64>, D::Error> {
            Vec::<String>::deserialize(deserializer)?
                .into_iter()
                .map(|raw| {
                    raw.parse::<f64>()
                        .map_err(|_| D::Error::custom(format!("invalid float text {raw:?}")))
                })
                .collect()
        }
    }
}
