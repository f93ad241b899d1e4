//! Payload codecs: how a typed payload becomes the string the store keeps,
//! and back.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Turns a payload of type `T` into its stored form.
pub trait PayloadSerializer<T>: Send + Sync {
    fn serialize(&self, payload: &T) -> anyhow::Result<String>;
}

/// Rebuilds a payload of type `T` from its stored form.
pub trait PayloadDeserializer<T>: Send + Sync {
    fn deserialize(&self, payload: &str) -> anyhow::Result<T>;
}

impl<T, F> PayloadSerializer<T> for F
where
    F: Fn(&T) -> anyhow::Result<String> + Send + Sync,
{
    fn serialize(&self, payload: &T) -> anyhow::Result<String> {
        self(payload)
    }
}

impl<T, F> PayloadDeserializer<T> for F
where
    F: Fn(&str) -> anyhow::Result<T> + Send + Sync,
{
    fn deserialize(&self, payload: &str) -> anyhow::Result<T> {
        self(payload)
    }
}

/// serde_json codec, usable for any serde payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T: Serialize> PayloadSerializer<T> for JsonCodec {
    fn serialize(&self, payload: &T) -> anyhow::Result<String> {
        Ok(serde_json::to_string(payload)?)
    }
}

impl<T: DeserializeOwned> PayloadDeserializer<T> for JsonCodec {
    fn deserialize(&self, payload: &str) -> anyhow::Result<T> {
        Ok(serde_json::from_str(payload)?)
    }
}
