//! Arguments: permukaan level job untuk executor
//!
//! Memegang kolaborator read-mostly (resolver, registry, codec) dan
//! melakukan probe kapabilitas sekali saat konstruksi.
//!
//! ```no_run
//! use hermes_args::{ArgumentMap, ArgumentValue, Arguments};
//!
//! let arguments = Arguments::builder().build()?;
//! let wire = arguments.serialize(&[ArgumentValue::from(1), ArgumentMap::new().with("a", 1).into()])?;
//! let values = arguments.deserialize(&wire)?;
//! assert_eq!(values.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::Arc;

use crate::config::ArgumentsConfig;
use crate::core::ArgumentValue;
use crate::error::{
    ArgumentError, CapabilityError, DeserializationError, SerializationError,
};
use crate::protocol::{Deserializer, JsonCodec, SafeCodec, Serializer, WireNode};
use crate::registry::{CustomRegistry, InMemoryLocator, ReferenceResolver};

/// Marshaling argument job, aman dibagikan antar thread
#[derive(Clone)]
pub struct Arguments {
    resolver: Arc<dyn ReferenceResolver>,
    registry: Arc<CustomRegistry>,
    codec: Arc<dyn SafeCodec>,
    config: ArgumentsConfig,
}

impl Arguments {
    pub fn builder() -> ArgumentsBuilder {
        ArgumentsBuilder::default()
    }

    #[inline(always)]
    pub fn config(&self) -> &ArgumentsConfig {
        &self.config
    }

    #[inline(always)]
    pub fn registry(&self) -> &CustomRegistry {
        &self.registry
    }

    /// Serialize argument list sebelum enqueue
    pub fn serialize(&self, values: &[ArgumentValue]) -> Result<Vec<WireNode>, SerializationError> {
        let nodes = self.serializer().serialize(values)?;
        log::debug!("serialized {} job argument(s)", nodes.len());
        Ok(nodes)
    }

    /// Deserialize argument list setelah dequeue
    pub fn deserialize(&self, nodes: &[WireNode]) -> Result<Vec<ArgumentValue>, DeserializationError> {
        let values = self.deserializer().deserialize(nodes)?;
        log::debug!("deserialized {} job argument(s)", values.len());
        Ok(values)
    }

    /// Serialize lalu dump ke teks untuk disimpan di backend queue
    pub fn serialize_json(&self, values: &[ArgumentValue]) -> Result<String, ArgumentError> {
        let nodes = self.serialize(values)?;
        let text = self
            .codec
            .dump(&WireNode::List(nodes))
            .map_err(|source| SerializationError::Dump {
                context: "arguments".to_string(),
                source,
            })?;
        Ok(text)
    }

    /// Safe-load teks dari backend queue lalu deserialize
    pub fn deserialize_json(&self, text: &str) -> Result<Vec<ArgumentValue>, ArgumentError> {
        let node = self
            .codec
            .safe_load(text)
            .map_err(DeserializationError::Parse)?;

        match node.as_list() {
            Some(nodes) => Ok(self.deserialize(nodes)?),
            None => Err(DeserializationError::Unrecognized {
                marker: format!("top-level {}", node.kind_name()),
            }
            .into()),
        }
    }

    fn serializer(&self) -> Serializer<'_> {
        Serializer::new(
            self.resolver.as_ref(),
            &self.registry,
            self.codec.as_ref(),
            self.config.max_depth,
        )
    }

    fn deserializer(&self) -> Deserializer<'_> {
        Deserializer::new(
            self.resolver.as_ref(),
            &self.registry,
            self.codec.as_ref(),
            self.config.max_depth,
        )
    }
}

/// Builder untuk `Arguments`
#[derive(Default)]
pub struct ArgumentsBuilder {
    resolver: Option<Arc<dyn ReferenceResolver>>,
    registry: Option<Arc<CustomRegistry>>,
    codec: Option<Arc<dyn SafeCodec>>,
    config: ArgumentsConfig,
}

impl ArgumentsBuilder {
    pub fn resolver<R: ReferenceResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn shared_resolver(mut self, resolver: Arc<dyn ReferenceResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn registry(mut self, registry: CustomRegistry) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    pub fn shared_registry(mut self, registry: Arc<CustomRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn codec<C: SafeCodec + 'static>(mut self, codec: C) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    pub fn config(mut self, config: ArgumentsConfig) -> Self {
        self.config = config;
        self
    }

    /// Bangun `Arguments`
    ///
    /// # Errors
    ///
    /// `CapabilityError::NotImplemented` jika codec tidak mendukung safe load.
    pub fn build(self) -> Result<Arguments, CapabilityError> {
        let codec: Arc<dyn SafeCodec> = match self.codec {
            Some(codec) => codec,
            None => Arc::new(JsonCodec::new()),
        };
        if !codec.supports_safe_load() {
            log::error!("{} codec does not support safe load", codec.name());
            return Err(CapabilityError::NotImplemented {
                codec: codec.name(),
            });
        }

        let config = self.config;
        let resolver: Arc<dyn ReferenceResolver> = match self.resolver {
            Some(resolver) => resolver,
            None => Arc::new(InMemoryLocator::new(config.app.as_str())),
        };
        let registry = self.registry.unwrap_or_default();

        Ok(Arguments {
            resolver,
            registry,
            codec,
            config,
        })
    }
}
