//! Durations as fractional seconds in suite files and reports
//!
//! Output is always a number of seconds. Input also accepts humantime
//! strings (`"4s"`, `"1500ms"`) so suites can be written like `parley.toml`.

use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Seconds {
    Number(f64),
    Text(humantime_serde::Serde<Duration>),
}

impl Seconds {
    fn into_duration<E: serde::de::Error>(self) -> Result<Duration, E> {
        match self {
            Seconds::Number(secs) => Duration::try_from_secs_f64(secs).map_err(E::custom),
            Seconds::Text(duration) => Ok(duration.into_inner()),
        }
    }
}

pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    Seconds::deserialize(deserializer)?.into_duration()
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        duration: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match duration {
            Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<Seconds>::deserialize(deserializer)?
            .map(Seconds::into_duration)
            .transpose()
    }
}
