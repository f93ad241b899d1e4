//! Payload serialization registry: payload type -> serializer.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;

use super::codec::PayloadSerializer;
use super::error::JobError;

struct SerializerMapping {
    type_name: &'static str,
    /// Holds a `Box<dyn PayloadSerializer<T>>` for the keyed `T`.
    serializer: Box<dyn Any + Send + Sync>,
}

/// Maps a payload's runtime type to the serializer used to persist it.
///
/// Built at startup, read-only afterwards. At most one serializer may be
/// registered per payload type.
#[derive(Default)]
pub struct PayloadSerializers {
    mappings: HashMap<TypeId, SerializerMapping>,
}

impl PayloadSerializers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the serializer for payloads of type `T`.
    pub fn register<T, S>(&mut self, serializer: S) -> Result<(), JobError>
    where
        T: 'static,
        S: PayloadSerializer<T> + 'static,
    {
        let key = TypeId::of::<T>();
        if self.mappings.contains_key(&key) {
            return Err(JobError::DuplicateSerializer {
                type_name: type_name::<T>(),
            });
        }

        let boxed: Box<dyn PayloadSerializer<T>> = Box::new(serializer);
        self.mappings.insert(
            key,
            SerializerMapping {
                type_name: type_name::<T>(),
                serializer: Box::new(boxed),
            },
        );
        Ok(())
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.mappings.contains_key(&TypeId::of::<T>())
    }

    /// Serialize `payload` with the serializer registered for `T`.
    pub fn serialize<T: 'static>(&self, payload: &T) -> Result<String, JobError> {
        let serializer = self
            .mappings
            .get(&TypeId::of::<T>())
            .and_then(|m| m.serializer.downcast_ref::<Box<dyn PayloadSerializer<T>>>())
            .ok_or(JobError::NoSerializer {
                type_name: type_name::<T>(),
            })?;

        serializer
            .serialize(payload)
            .map_err(|e| JobError::Serialization {
                type_name: type_name::<T>(),
                reason: format!("{e:#}"),
            })
    }

    pub fn registered_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.mappings.values().map(|m| m.type_name).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for PayloadSerializers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadSerializers")
            .field("types", &self.registered_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Reminder {
        case_id: u64,
    }

    struct Unregistered;

    #[test]
    fn serializes_registered_type() {
        let mut serializers = PayloadSerializers::new();
        serializers.register::<Reminder, _>(JsonCodec).unwrap();

        let out = serializers.serialize(&Reminder { case_id: 7 }).unwrap();
        assert_eq!(out, r#"{"case_id":7}"#);
    }

    #[test]
    fn unregistered_type_is_a_configuration_error() {
        let serializers = PayloadSerializers::new();
        let err = serializers.serialize(&Unregistered).unwrap_err();
        assert!(matches!(err, JobError::NoSerializer { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn second_serializer_for_same_type_is_rejected() {
        let mut serializers = PayloadSerializers::new();
        serializers.register::<Reminder, _>(JsonCodec).unwrap();

        let err = serializers
            .register::<Reminder, _>(|r: &Reminder| -> anyhow::Result<String> {
                Ok(r.case_id.to_string())
            })
            .unwrap_err();
        assert!(matches!(err, JobError::DuplicateSerializer { .. }));

        // The original mapping stays in place.
        let out = serializers.serialize(&Reminder { case_id: 1 }).unwrap();
        assert_eq!(out, r#"{"case_id":1}"#);
    }

    #[test]
    fn serializer_failure_is_reported_with_type() {
        let mut serializers = PayloadSerializers::new();
        serializers
            .register::<u32, _>(|_: &u32| -> anyhow::Result<String> {
                Err(anyhow::anyhow!("refused"))
            })
            .unwrap();

        let err = serializers.serialize(&5u32).unwrap_err();
        match err {
            JobError::Serialization { type_name, reason } => {
                assert_eq!(type_name, "u32");
                assert!(reason.contains("refused"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
