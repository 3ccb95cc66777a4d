extern crate csv;
#[macro_use]
extern crate serde;
#[macro_use]
extern crate log;

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io;
use std::sync::Arc;

pub mod catalog;
pub mod config;
pub mod database;
pub mod parser;
pub mod query;
pub mod table;
pub mod testutil;

pub use query::{Atom, ComparisonAtom, ComparisonOp, Head, Query, RelationalAtom, SumAggregate, Term};

/// Custom error type.
#[derive(Debug, Clone, PartialEq)]
pub enum MinibaseError {
    /// IO Errors.
    IOError(String),
    /// Schema file or engine configuration is unusable.
    ConfigurationError(String),
    /// A data row does not match its relation's declared types.
    DataFormatError(String),
    /// A label, alias or variable could not be found.
    ResolutionError(String),
    /// Validation errors.
    ValidationError(String),
    /// Query text does not match the grammar.
    ParseError(String),
    /// Execution errors.
    ExecutionError(String),
}

impl fmt::Display for MinibaseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                MinibaseError::ConfigurationError(s) => format!("Configuration Error: {}", s),
                MinibaseError::DataFormatError(s) => format!("Data Format Error: {}", s),
                MinibaseError::ResolutionError(s) => format!("Resolution Error: {}", s),
                MinibaseError::ValidationError(s) => format!("Validation Error: {}", s),
                MinibaseError::ParseError(s) => format!("Parse Error: {}", s),
                MinibaseError::ExecutionError(s) => format!("Execution Error: {}", s),
                MinibaseError::IOError(s) => s.to_string(),
            }
        )
    }
}

impl From<io::Error> for MinibaseError {
    fn from(error: io::Error) -> Self {
        MinibaseError::IOError(error.to_string())
    }
}

impl From<csv::Error> for MinibaseError {
    fn from(error: csv::Error) -> Self {
        if error.is_io_error() {
            MinibaseError::IOError(error.to_string())
        } else {
            MinibaseError::DataFormatError(error.to_string())
        }
    }
}

impl From<serde_json::Error> for MinibaseError {
    fn from(error: serde_json::Error) -> Self {
        MinibaseError::ConfigurationError(error.to_string())
    }
}

impl Error for MinibaseError {}

/// Handle schemas.
///
/// A schema is an ordered list of `alias.column` attributes together with the
/// aliases it was built from. A scan produces a schema with a single alias;
/// every join appends the right side's aliases to the group, so a column can
/// be resolved either by its full label or by its bare name against the whole
/// group.
#[derive(PartialEq, Clone, Debug)]
pub struct TableSchema {
    /// Attributes of the schema.
    attributes: Vec<Attribute>,
    /// Aliases contributing columns to this schema, in join order.
    group: Vec<String>,
    /// Mapping from `alias.column` label to its first position in the schema.
    name_map: HashMap<String, usize>,
    /// Mapping from bare column name to its first position in the schema.
    column_map: HashMap<String, usize>,
}

impl TableSchema {
    /// Create a new schema.
    ///
    /// # Arguments
    ///
    /// * `attributes` - Attributes of the schema in the order that they are in the schema.
    pub fn new(attributes: Vec<Attribute>) -> Self {
        let mut name_map = HashMap::new();
        let mut column_map = HashMap::new();
        let mut group: Vec<String> = Vec::new();
        for (i, attr) in attributes.iter().enumerate() {
            name_map.entry(attr.name().to_string()).or_insert(i);
            column_map.entry(attr.column().to_string()).or_insert(i);
            if !group.iter().any(|g| g == attr.table()) {
                group.push(attr.table().to_string());
            }
        }
        Self {
            attributes,
            group,
            name_map,
            column_map,
        }
    }

    /// Create a new schema for one alias with the given column names and dtypes.
    ///
    /// # Arguments
    ///
    /// * `table` - Alias qualifying every column.
    /// * `names` - Column names of the new schema.
    /// * `dtypes` - Dtypes of the new schema.
    pub fn from_vecs(table: &str, names: Vec<&str>, dtypes: Vec<DataType>) -> Self {
        let mut attrs = Vec::new();
        for (name, dtype) in names.iter().zip(dtypes.iter()) {
            attrs.push(Attribute::new(table, name, *dtype));
        }
        TableSchema::new(attrs)
    }

    /// Get the attribute from the given index.
    ///
    /// # Arguments
    ///
    /// * `i` - Index of the attribute to look for.
    pub fn get_attribute(&self, i: usize) -> Option<&Attribute> {
        self.attributes.get(i)
    }

    /// Get the index of a fully qualified `alias.column` label.
    ///
    /// # Arguments
    ///
    /// * `name` - Label to get the index for.
    pub fn get_field_index(&self, name: &str) -> Option<&usize> {
        self.name_map.get(name)
    }

    /// Get the index of the first column with the given bare name, searching
    /// every alias of the join group.
    pub fn get_column_index(&self, column: &str) -> Option<&usize> {
        self.column_map.get(column)
    }

    /// Check if the label is in the schema.
    pub fn contains(&self, name: &str) -> bool {
        self.name_map.contains_key(name)
    }

    /// Check if any alias of the group has a column with this bare name.
    pub fn contains_column(&self, column: &str) -> bool {
        self.column_map.contains_key(column)
    }

    /// Get an iterator of the attributes.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// Aliases this schema was built from.
    pub fn group(&self) -> &[String] {
        &self.group
    }

    /// Merge two schemas into one.
    ///
    /// The other schema is appended to the current schema. Labels keep their
    /// own alias; the group membership becomes the union of both groups.
    ///
    /// # Arguments
    ///
    /// * `other` - Other schema to add to current schema.
    pub fn merge(&self, other: &Self) -> Self {
        let mut attrs = self.attributes.clone();
        attrs.append(&mut other.attributes.clone());
        let mut merged = Self::new(attrs);
        let mut group = self.group.clone();
        for alias in other.group.iter() {
            if !group.contains(alias) {
                group.push(alias.clone());
            }
        }
        merged.group = group;
        merged
    }

    /// Returns the length of the schema.
    pub fn size(&self) -> usize {
        self.attributes.len()
    }
}

/// Handle attributes. Pairs an `alias.column` label with the dtype.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct Attribute {
    /// Full label, `alias.column`.
    pub name: String,
    /// Alias the column belongs to.
    pub table: String,
    /// Bare column name.
    pub column: String,
    /// Attribute dtype.
    pub dtype: DataType,
}

impl Attribute {
    /// Create a new attribute for the given alias, column and dtype.
    ///
    /// # Arguments
    ///
    /// * `table` - Alias of the table holding the column.
    /// * `column` - Name of the column.
    /// * `dtype` - Dtype of the attribute.
    pub fn new(table: &str, column: &str, dtype: DataType) -> Self {
        Self {
            name: format!("{}.{}", table, column),
            table: table.to_string(),
            column: column.to_string(),
            dtype,
        }
    }

    /// Returns the label of the attribute.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the alias of the attribute.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the bare column name of the attribute.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns the dtype of the attribute.
    pub fn dtype(&self) -> &DataType {
        &self.dtype
    }
}

/// Enumerate the supported dtypes.
#[derive(PartialEq, Eq, Serialize, Deserialize, Clone, Copy, Debug)]
pub enum DataType {
    Int,
    String,
}

impl DataType {
    /// Parses a column type name as written in the schema file.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(DataType::Int),
            "string" => Some(DataType::String),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "int"),
            DataType::String => write!(f, "string"),
        }
    }
}

/// For each of the dtypes, make sure that there is a corresponding field type.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, PartialOrd, Ord, Clone, Hash)]
pub enum Field {
    IntField(i64),
    StringField(String),
}

impl Field {
    /// Returns the dtype this field belongs to.
    pub fn dtype(&self) -> DataType {
        match self {
            Field::IntField(_) => DataType::Int,
            Field::StringField(_) => DataType::String,
        }
    }

    /// Coerces a raw text field to the given dtype.
    ///
    /// Surrounding whitespace is ignored and a string wrapped in single quotes
    /// loses its quotes.
    pub fn parse(raw: &str, dtype: DataType) -> Result<Self, MinibaseError> {
        let raw = raw.trim();
        match dtype {
            DataType::Int => raw.parse::<i64>().map(Field::IntField).map_err(|_| {
                MinibaseError::DataFormatError(format!("Expected an int, found {:?}", raw))
            }),
            DataType::String => {
                let unquoted = if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
                    &raw[1..raw.len() - 1]
                } else {
                    raw
                };
                Ok(Field::StringField(unquoted.to_string()))
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::IntField(x) => write!(f, "{}", x),
            Field::StringField(x) => write!(f, "'{}'", x),
        }
    }
}

/// Tuple type.
///
/// Values are positionally aligned with the attributes of `schema`. Equality
/// and hashing only look at the values.
#[derive(Debug, Clone)]
pub struct Tuple {
    /// Tuple data.
    pub field_vals: Vec<Field>,
    /// Schema labelling each value.
    schema: Arc<TableSchema>,
}

impl Tuple {
    /// Create a new tuple with the given data.
    ///
    /// # Arguments
    ///
    /// * `field_vals` - Field values of the tuple.
    /// * `schema` - Schema of the tuple, one attribute per value.
    pub fn new(field_vals: Vec<Field>, schema: Arc<TableSchema>) -> Self {
        debug_assert_eq!(field_vals.len(), schema.size());
        Self { field_vals, schema }
    }

    /// Get the field at index.
    ///
    /// # Arguments
    ///
    /// * `i` - Index of the field.
    pub fn get_field(&self, i: usize) -> Option<&Field> {
        self.field_vals.get(i)
    }

    /// Returns an iterator over the field values.
    pub fn field_vals(&self) -> impl Iterator<Item = &Field> {
        self.field_vals.iter()
    }

    /// Returns the schema of the tuple.
    pub fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    /// Return the length of the tuple.
    pub fn size(&self) -> usize {
        self.field_vals.len()
    }

    /// Append another tuple with self, labelling the result with `schema`.
    ///
    /// # Arguments
    ///
    /// * `other` - Other tuple to append.
    /// * `schema` - Merged schema of both tuples.
    pub fn merge(&self, other: &Self, schema: Arc<TableSchema>) -> Self {
        let mut fields = self.field_vals.clone();
        fields.append(&mut other.field_vals.clone());
        Self::new(fields, schema)
    }
}

impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.field_vals == other.field_vals
    }
}

impl Eq for Tuple {}

impl Hash for Tuple {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.field_vals.hash(state);
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vals: Vec<String> = self.field_vals.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", vals.join(", "))
    }
}
