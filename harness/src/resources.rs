//! Resource specifications
//!
//! Plain parameter types handed to a [`ResourceProvisioner`](crate::traits::ResourceProvisioner).
//! Defaults mirror what the emulator needs for throwaway test fixtures:
//! minimal provisioned throughput, full projections, an inline Python handler.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of the function provisioned with every session
pub const GENERIC_EMPTY_FUNCTION: &str = "generic_empty_lambda";

/// Read and write capacity used for tables and global indexes
pub const TEST_THROUGHPUT: ProvisionedThroughput = ProvisionedThroughput { read: 2, write: 2 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    Hash,
    Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySchemaElement {
    pub attribute_name: String,
    pub key_type: KeyType,
}

/// Build a key schema from a hash key and an optional range key
pub fn key_schema(hash_attr: &str, range_attr: Option<&str>) -> Vec<KeySchemaElement> {
    let mut schema = vec![KeySchemaElement {
        attribute_name: hash_attr.to_string(),
        key_type: KeyType::Hash,
    }];
    if let Some(range) = range_attr {
        schema.push(KeySchemaElement {
            attribute_name: range.to_string(),
            key_type: KeyType::Range,
        });
    }
    schema
}

/// Scalar attribute types usable in key schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    #[serde(rename = "S")]
    String,
    #[serde(rename = "N")]
    Number,
    #[serde(rename = "B")]
    Binary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub attribute_name: String,
    pub attribute_type: AttributeType,
}

pub fn attribute_definition(name: &str, attribute_type: AttributeType) -> AttributeDefinition {
    AttributeDefinition {
        attribute_name: name.to_string(),
        attribute_type,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedThroughput {
    pub read: u64,
    pub write: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    All,
    KeysOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSecondaryIndex {
    pub index_name: String,
    pub key_schema: Vec<KeySchemaElement>,
    pub throughput: ProvisionedThroughput,
    pub projection: Projection,
}

pub fn global_secondary_index(name: &str, hash_attr: &str, range_attr: Option<&str>) -> GlobalSecondaryIndex {
    GlobalSecondaryIndex {
        index_name: name.to_string(),
        key_schema: key_schema(hash_attr, range_attr),
        throughput: TEST_THROUGHPUT,
        projection: Projection::All,
    }
}

/// Local indexes always carry a range key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSecondaryIndex {
    pub index_name: String,
    pub key_schema: Vec<KeySchemaElement>,
    pub projection: Projection,
}

pub fn local_secondary_index(name: &str, hash_attr: &str, range_attr: &str) -> LocalSecondaryIndex {
    LocalSecondaryIndex {
        index_name: name.to_string(),
        key_schema: key_schema(hash_attr, Some(range_attr)),
        projection: Projection::All,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub table_name: String,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub key_schema: Vec<KeySchemaElement>,
    pub throughput: ProvisionedThroughput,
    pub global_indexes: Vec<GlobalSecondaryIndex>,
    pub local_indexes: Vec<LocalSecondaryIndex>,
    pub ttl_attribute: Option<String>,
}

impl TableSpec {
    /// Table keyed on a single string hash attribute
    pub fn new(table_name: &str, hash_attr: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            attribute_definitions: vec![attribute_definition(hash_attr, AttributeType::String)],
            key_schema: key_schema(hash_attr, None),
            throughput: TEST_THROUGHPUT,
            global_indexes: Vec::new(),
            local_indexes: Vec::new(),
            ttl_attribute: None,
        }
    }

    /// Add a string range key to the primary key
    pub fn range_key(mut self, range_attr: &str) -> Self {
        self.attribute_definitions
            .push(attribute_definition(range_attr, AttributeType::String));
        self.key_schema.retain(|k| k.key_type == KeyType::Hash);
        self.key_schema.push(KeySchemaElement {
            attribute_name: range_attr.to_string(),
            key_type: KeyType::Range,
        });
        self
    }

    pub fn attribute(mut self, definition: AttributeDefinition) -> Self {
        self.attribute_definitions.push(definition);
        self
    }

    pub fn global_index(mut self, index: GlobalSecondaryIndex) -> Self {
        self.global_indexes.push(index);
        self
    }

    pub fn local_index(mut self, index: LocalSecondaryIndex) -> Self {
        self.local_indexes.push(index);
        self
    }

    /// Enable time-to-live on the given attribute after creation
    pub fn ttl(mut self, attribute: &str) -> Self {
        self.ttl_attribute = Some(attribute.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub function_name: String,
    /// Body of the Python `handler(event, context)` function
    pub handler_body: String,
    pub handler: String,
    pub runtime: String,
    pub role: String,
    pub publish: bool,
}

impl FunctionSpec {
    pub fn python(function_name: &str, handler_body: &str) -> Self {
        Self {
            function_name: function_name.to_string(),
            handler_body: handler_body.to_string(),
            handler: "handler.handler".to_string(),
            runtime: "python3.6".to_string(),
            role: "test".to_string(),
            publish: true,
        }
    }

    /// Function returning an empty object, provisioned with every session
    pub fn generic_empty() -> Self {
        Self::python(GENERIC_EMPTY_FUNCTION, "return {}")
    }

    /// File name inside the deployment package
    pub fn source_file_name(&self) -> &'static str {
        "handler.py"
    }

    /// Full contents of the handler source file
    pub fn handler_source(&self) -> String {
        format!("def handler(event, context):\n  {}\n", self.handler_body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSpec {
    pub bucket_name: String,
}

impl BucketSpec {
    pub fn new(bucket_name: &str) -> Self {
        Self {
            bucket_name: bucket_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub bucket_name: String,
    pub key: String,
    pub content: Vec<u8>,
}

impl ObjectSpec {
    pub fn new(bucket_name: &str, key: &str, content: impl Into<Vec<u8>>) -> Self {
        Self {
            bucket_name: bucket_name.to_string(),
            key: key.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSpec {
    pub queue_name: String,
    pub attributes: HashMap<String, String>,
}

impl QueueSpec {
    pub fn new(queue_name: &str) -> Self {
        Self {
            queue_name: queue_name.to_string(),
            attributes: HashMap::new(),
        }
    }

    pub fn attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSpec {
    pub topic_name: String,
    pub attributes: HashMap<String, String>,
}

impl TopicSpec {
    pub fn new(topic_name: &str) -> Self {
        Self {
            topic_name: topic_name.to_string(),
            attributes: HashMap::new(),
        }
    }

    pub fn attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    pub instance_type: String,
    pub min_count: u32,
    pub max_count: u32,
}

impl Default for InstanceSpec {
    fn default() -> Self {
        Self {
            instance_type: "t2.medium".to_string(),
            min_count: 1,
            max_count: 1,
        }
    }
}
