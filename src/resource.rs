//! Resource payloads and the per-resource type descriptor.
//!
//! The routing layer cannot name the concrete payload type of every resource
//! it dispatches to, so payloads cross the codec core type-erased. The same
//! move the handler layer makes for async functions is made here for data:
//! a blanket impl lifts any serde-capable type into a boxed trait object,
//! and handlers downcast on the way out.

use std::any::Any;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{from_value, to_value, CodecError, Value, ValueRepr};
use crate::error::Error;

/// A value that can cross the wire in either direction.
///
/// Implemented automatically for every `T: Serialize + DeserializeOwned +
/// Send + 'static`; there is never a reason to implement it by hand.
pub trait Payload: Any + Send {
    /// Captures the payload as a wire value tree.
    fn to_wire(&self) -> Result<Value, CodecError>;

    /// Replaces `self` with the payload restored from `value`.
    fn from_wire(&mut self, value: Value, repr: ValueRepr) -> Result<(), CodecError>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl std::fmt::Debug for dyn Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<dyn Payload>")
    }
}

impl<T> Payload for T
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    fn to_wire(&self) -> Result<Value, CodecError> {
        to_value(self)
    }

    fn from_wire(&mut self, value: Value, repr: ValueRepr) -> Result<(), CodecError> {
        *self = from_value(value, repr)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Per-resource capability consumed by the request reader.
pub trait Resource: Send + Sync {
    /// Returns a fresh, zero-valued instance of the resource's payload type.
    ///
    /// Every call must produce an independent value; concurrent decodes each
    /// get their own instance.
    fn new_value(&self) -> Box<dyn Payload>;

    /// Renders the identifier of a populated payload as a string.
    ///
    /// Handing this a payload of the wrong concrete type is a bug at the
    /// call site, reported as [`Error::Contract`].
    fn id(&self, value: &dyn Payload) -> Result<String, Error>;
}

/// Descriptor for resources without body-bound operations.
///
/// Exists so every resource satisfies the capability contract uniformly; the
/// methods are unreachable in normal request flow.
pub struct NotImplemented;

impl Resource for NotImplemented {
    fn new_value(&self) -> Box<dyn Payload> {
        unimplemented!("resource does not support request bodies")
    }

    fn id(&self, _value: &dyn Payload) -> Result<String, Error> {
        unimplemented!("resource does not support request bodies")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq, Serialize)]
    struct Counter {
        n: u32,
    }

    struct Counters;

    impl Resource for Counters {
        fn new_value(&self) -> Box<dyn Payload> {
            Box::new(Counter::default())
        }

        fn id(&self, value: &dyn Payload) -> Result<String, Error> {
            let counter = value
                .as_any()
                .downcast_ref::<Counter>()
                .ok_or_else(|| Error::Contract("expected a Counter".to_owned()))?;
            Ok(counter.n.to_string())
        }
    }

    #[test]
    fn fresh_instances_are_independent() {
        let a = Counters.new_value();
        let mut b = Counters.new_value();
        b.from_wire(
            crate::codec::to_value(&Counter { n: 5 }).unwrap(),
            ValueRepr::Typed,
        )
        .unwrap();

        assert_eq!(a.as_any().downcast_ref::<Counter>(), Some(&Counter { n: 0 }));
        assert_eq!(b.as_any().downcast_ref::<Counter>(), Some(&Counter { n: 5 }));
    }

    #[test]
    fn id_rejects_the_wrong_concrete_type() {
        let not_a_counter: Box<dyn Payload> = Box::new(7u8);
        assert!(matches!(Counters.id(not_a_counter.as_ref()), Err(Error::Contract(_))));

        let counter: Box<dyn Payload> = Box::new(Counter { n: 12 });
        assert_eq!(Counters.id(counter.as_ref()).unwrap(), "12");
    }

    #[test]
    fn into_any_recovers_ownership() {
        let boxed: Box<dyn Payload> = Box::new(Counter { n: 3 });
        let counter = boxed.into_any().downcast::<Counter>().unwrap();
        assert_eq!(*counter, Counter { n: 3 });
    }
}
