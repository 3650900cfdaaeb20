//! Tool catalog and invoker.
//!
//! The catalog is the registry of every remotely callable operation and every
//! read-only resource this server exposes. It is built once during startup,
//! wrapped in an `Arc`, and shared read-only across transports and worker
//! threads; registration after startup is not supported.
//!
//! Invocation goes through [`Catalog::invoke`]: the raw JSON arguments are
//! bound against the declared parameter schema (unknown names rejected,
//! defaults injected, values coerced to their declared primitive type) before
//! the handler runs. Handlers never see unvalidated input.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Primitive types a tool parameter or return value can declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    Number,
    Text,
    Boolean,
    Sequence,
    Mapping,
}

impl ParamType {
    /// JSON Schema type name used in `tools/list` responses.
    pub fn json_name(self) -> &'static str {
        match self {
            ParamType::Number => "number",
            ParamType::Text => "string",
            ParamType::Boolean => "boolean",
            ParamType::Sequence => "array",
            ParamType::Mapping => "object",
        }
    }
}

/// A single declared parameter: name, primitive type, and an optional
/// default. A parameter without a default is required.
#[derive(Clone, Debug)]
pub struct ParamSpec {
    pub name: String,
    pub ty: ParamType,
    pub description: String,
    pub default: Option<Value>,
}

/// Declarative description of one tool: its name, parameter list, and
/// declared return type. Built with the chained constructors below, then
/// registered together with its handler.
#[derive(Clone, Debug)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
    pub returns: ParamType,
}

impl ToolSpec {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params: Vec::new(),
            returns: ParamType::Text,
        }
    }

    /// Declare a required parameter.
    pub fn required(mut self, name: &str, ty: ParamType, description: &str) -> Self {
        self.params.push(ParamSpec {
            name: name.to_string(),
            ty,
            description: description.to_string(),
            default: None,
        });
        self
    }

    /// Declare an optional parameter with a default used when the caller
    /// omits it.
    pub fn optional(mut self, name: &str, ty: ParamType, description: &str, default: Value) -> Self {
        self.params.push(ParamSpec {
            name: name.to_string(),
            ty,
            description: description.to_string(),
            default: Some(default),
        });
        self
    }

    /// Declare the return type.
    pub fn returns(mut self, ty: ParamType) -> Self {
        self.returns = ty;
        self
    }

    /// JSON Schema for the parameter list, in the camelCase shape MCP
    /// clients expect under `inputSchema`.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.params {
            let mut prop = Map::new();
            prop.insert("type".to_string(), json!(param.ty.json_name()));
            prop.insert("description".to_string(), json!(param.description));
            if let Some(default) = &param.default {
                prop.insert("default".to_string(), default.clone());
            } else {
                required.push(json!(param.name));
            }
            properties.insert(param.name.clone(), Value::Object(prop));
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// One-line human-readable signature, used in the startup capability
    /// summary: `add(a: number, b: number) -> number`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty.json_name()))
            .collect();
        format!(
            "{}({}) -> {}",
            self.name,
            params.join(", "),
            self.returns.json_name()
        )
    }
}

/// A read-only resource: a parameterless producer re-evaluated on every read.
#[derive(Clone, Debug)]
pub struct ResourceSpec {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

/// Failure of a single invocation, resolved at the operation boundary and
/// returned to the transport as an ordinary result value.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    Validation(String),
    #[error("missing required argument '{0}'")]
    MissingArgument(String),
    #[error("{0}")]
    Computation(String),
    #[error("{0}")]
    External(String),
}

impl ToolError {
    /// Stable kind tag surfaced alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Validation(_) => "ValidationError",
            ToolError::MissingArgument(_) => "MissingArgumentError",
            ToolError::Computation(_) => "ComputationError",
            ToolError::External(_) => "ExternalError",
        }
    }
}

/// Startup configuration error. Fatal: the process must not start serving
/// with an inconsistent catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate tool name '{0}'")]
    DuplicateTool(String),
    #[error("tool '{0}' declares parameter '{1}' twice")]
    DuplicateParam(String, String),
    #[error("duplicate resource uri '{0}'")]
    DuplicateResource(String),
    #[error("tool '{0}' failed to initialize: {1}")]
    ToolInit(String, String),
}

/// Arguments after binding: every declared parameter is present, either as
/// the coerced caller value or as its default.
#[derive(Clone, Debug, Default)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn number(&self, name: &str) -> Result<f64, ToolError> {
        self.get(name)
            .and_then(Value::as_f64)
            .ok_or_else(|| ToolError::Validation(format!("argument '{name}' must be a number")))
    }

    /// A number that must be a whole value (no fractional part).
    pub fn integer(&self, name: &str) -> Result<i64, ToolError> {
        let n = self.number(name)?;
        if n.fract() != 0.0 {
            return Err(ToolError::Validation(format!(
                "argument '{name}' must be an integer"
            )));
        }
        Ok(n as i64)
    }

    pub fn text(&self, name: &str) -> Result<&str, ToolError> {
        self.get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::Validation(format!("argument '{name}' must be a string")))
    }

    pub fn boolean(&self, name: &str) -> Result<bool, ToolError> {
        self.get(name)
            .and_then(Value::as_bool)
            .ok_or_else(|| ToolError::Validation(format!("argument '{name}' must be a boolean")))
    }

    #[cfg(test)]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self(Map::new()),
        }
    }
}

/// Tool body. Simple tools wrap a synchronous closure via [`handler`]; the
/// network tools use [`async_handler`].
pub type ToolHandler = Arc<dyn Fn(Arguments) -> BoxFuture<'static, Result<Value, ToolError>> + Send + Sync>;

/// Resource body: parameterless, produces the resource text on every read.
pub type ResourceProducer = Arc<dyn Fn() -> Result<String, ToolError> + Send + Sync>;

/// Wrap a synchronous tool body into a [`ToolHandler`].
pub fn handler<F>(f: F) -> ToolHandler
where
    F: Fn(&Arguments) -> Result<Value, ToolError> + Send + Sync + 'static,
{
    Arc::new(move |args| {
        let out = f(&args);
        async move { out }.boxed()
    })
}

/// Wrap an asynchronous tool body into a [`ToolHandler`].
pub fn async_handler<F, Fut>(f: F) -> ToolHandler
where
    F: Fn(Arguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    Arc::new(move |args| f(args).boxed())
}

struct ToolEntry {
    spec: ToolSpec,
    handler: ToolHandler,
}

struct ResourceEntry {
    spec: ResourceSpec,
    producer: ResourceProducer,
}

/// Registry of all tools and resources. Immutable once startup completes.
pub struct Catalog {
    tools: HashMap<String, ToolEntry>,
    tool_order: Vec<String>,
    resources: HashMap<String, ResourceEntry>,
    resource_order: Vec<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            tool_order: Vec::new(),
            resources: HashMap::new(),
            resource_order: Vec::new(),
        }
    }

    /// Register a tool. Duplicate tool names and duplicate parameter names
    /// within a spec are configuration errors.
    pub fn register_tool(&mut self, spec: ToolSpec, handler: ToolHandler) -> Result<(), CatalogError> {
        for (i, param) in spec.params.iter().enumerate() {
            if spec.params[..i].iter().any(|p| p.name == param.name) {
                return Err(CatalogError::DuplicateParam(
                    spec.name.clone(),
                    param.name.clone(),
                ));
            }
        }
        if self.tools.contains_key(&spec.name) {
            return Err(CatalogError::DuplicateTool(spec.name.clone()));
        }
        self.tool_order.push(spec.name.clone());
        self.tools
            .insert(spec.name.clone(), ToolEntry { spec, handler });
        Ok(())
    }

    /// Register a resource. Duplicate URIs are configuration errors.
    pub fn register_resource(
        &mut self,
        spec: ResourceSpec,
        producer: ResourceProducer,
    ) -> Result<(), CatalogError> {
        if self.resources.contains_key(&spec.uri) {
            return Err(CatalogError::DuplicateResource(spec.uri.clone()));
        }
        self.resource_order.push(spec.uri.clone());
        self.resources
            .insert(spec.uri.clone(), ResourceEntry { spec, producer });
        Ok(())
    }

    /// Tool specs in registration order.
    pub fn tools(&self) -> impl Iterator<Item = &ToolSpec> {
        self.tool_order.iter().filter_map(|name| {
            self.tools.get(name).map(|entry| &entry.spec)
        })
    }

    /// Resource specs in registration order.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceSpec> {
        self.resource_order.iter().filter_map(|uri| {
            self.resources.get(uri).map(|entry| &entry.spec)
        })
    }

    /// Invoke a tool by name with raw caller-supplied arguments.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let entry = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::Validation(format!("unknown tool '{name}'")))?;
        let bound = bind_arguments(&entry.spec, args)?;
        (entry.handler)(bound).await
    }

    /// Read a resource by URI, re-running its producer.
    pub fn read_resource(&self, uri: &str) -> Result<(&ResourceSpec, String), ToolError> {
        let entry = self
            .resources
            .get(uri)
            .ok_or_else(|| ToolError::Validation(format!("unknown resource '{uri}'")))?;
        let text = (entry.producer)()?;
        Ok((&entry.spec, text))
    }
}

/// Bind raw caller arguments against a tool's declared parameters.
///
/// Policy: unknown argument names are rejected, not dropped; missing
/// parameters fall back to their default or fail with
/// [`ToolError::MissingArgument`]; supplied values are coerced to the
/// declared primitive type.
fn bind_arguments(spec: &ToolSpec, raw: Value) -> Result<Arguments, ToolError> {
    let supplied = match raw {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => {
            return Err(ToolError::Validation(
                "arguments must be a JSON object".to_string(),
            ));
        }
    };

    for key in supplied.keys() {
        if !spec.params.iter().any(|p| p.name == *key) {
            return Err(ToolError::Validation(format!("unknown argument '{key}'")));
        }
    }

    let mut bound = Map::new();
    for param in &spec.params {
        match supplied.get(&param.name) {
            Some(value) => {
                bound.insert(param.name.clone(), coerce(param, value)?);
            }
            None => match &param.default {
                Some(default) => {
                    bound.insert(param.name.clone(), default.clone());
                }
                None => return Err(ToolError::MissingArgument(param.name.clone())),
            },
        }
    }
    Ok(Arguments(bound))
}

/// Coerce one supplied value to a parameter's declared type.
///
/// Numbers additionally accept numeric strings, booleans additionally accept
/// the strings "true"/"false". Everything else must arrive as the matching
/// JSON type.
fn coerce(param: &ParamSpec, value: &Value) -> Result<Value, ToolError> {
    let coerced = match (param.ty, value) {
        (ParamType::Number, Value::Number(_)) => value.as_f64().map(|n| json!(n)),
        (ParamType::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(|n| json!(n)),
        (ParamType::Text, Value::String(_)) => Some(value.clone()),
        (ParamType::Boolean, Value::Bool(_)) => Some(value.clone()),
        (ParamType::Boolean, Value::String(s)) => match s.as_str() {
            "true" => Some(json!(true)),
            "false" => Some(json!(false)),
            _ => None,
        },
        (ParamType::Sequence, Value::Array(_)) => Some(value.clone()),
        (ParamType::Mapping, Value::Object(_)) => Some(value.clone()),
        _ => None,
    };
    coerced.ok_or_else(|| {
        ToolError::Validation(format!(
            "argument '{}' must be a {}",
            param.name,
            param.ty.json_name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_spec() -> ToolSpec {
        ToolSpec::new("pair", "test tool")
            .required("a", ParamType::Number, "first")
            .optional("b", ParamType::Number, "second", json!(2.0))
            .returns(ParamType::Number)
    }

    fn sum_handler() -> ToolHandler {
        handler(|args| {
            let a = args.number("a")?;
            let b = args.number("b")?;
            Ok(json!(a + b))
        })
    }

    #[test]
    fn binds_supplied_and_default_values() {
        let args = bind_arguments(&pair_spec(), json!({"a": 3})).unwrap();
        assert_eq!(args.number("a").unwrap(), 3.0);
        assert_eq!(args.number("b").unwrap(), 2.0);
    }

    #[test]
    fn missing_required_argument_is_reported_by_name() {
        let err = bind_arguments(&pair_spec(), json!({})).unwrap_err();
        assert_eq!(err.kind(), "MissingArgumentError");
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn unknown_argument_is_rejected() {
        let err = bind_arguments(&pair_spec(), json!({"a": 1, "extra": true})).unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        assert!(err.to_string().contains("extra"));
    }

    #[test]
    fn numeric_strings_coerce_to_numbers() {
        let args = bind_arguments(&pair_spec(), json!({"a": "3.5"})).unwrap();
        assert_eq!(args.number("a").unwrap(), 3.5);
    }

    #[test]
    fn non_numeric_string_fails_coercion() {
        let err = bind_arguments(&pair_spec(), json!({"a": "three"})).unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }

    #[test]
    fn non_finite_numeric_string_fails_coercion() {
        let err = bind_arguments(&pair_spec(), json!({"a": "NaN"})).unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }

    #[test]
    fn coercion_matrix_covers_all_primitive_types() {
        let spec = ToolSpec::new("kinds", "test tool")
            .required("n", ParamType::Number, "")
            .required("t", ParamType::Text, "")
            .required("f", ParamType::Boolean, "")
            .required("s", ParamType::Sequence, "")
            .required("m", ParamType::Mapping, "");
        let args = bind_arguments(
            &spec,
            json!({"n": 1, "t": "x", "f": "true", "s": [1, 2], "m": {"k": 1}}),
        )
        .unwrap();
        assert_eq!(args.number("n").unwrap(), 1.0);
        assert_eq!(args.text("t").unwrap(), "x");
        assert!(args.boolean("f").unwrap());
        assert!(args.get("s").unwrap().is_array());
        assert!(args.get("m").unwrap().is_object());

        for (name, bad) in [
            ("n", json!(true)),
            ("t", json!(5)),
            ("f", json!("yes")),
            ("s", json!("not a list")),
            ("m", json!([1])),
        ] {
            let mut raw = json!({"n": 1, "t": "x", "f": true, "s": [], "m": {}});
            raw[name] = bad;
            let err = bind_arguments(&spec, raw).unwrap_err();
            assert_eq!(err.kind(), "ValidationError", "param {name}");
        }
    }

    #[test]
    fn integer_accessor_rejects_fractional_values() {
        let args = Arguments::from_value(json!({"count": 2.5}));
        assert_eq!(args.integer("count").unwrap_err().kind(), "ValidationError");
        let args = Arguments::from_value(json!({"count": 4.0}));
        assert_eq!(args.integer("count").unwrap(), 4);
    }

    #[test]
    fn duplicate_tool_registration_fails() {
        let mut catalog = Catalog::new();
        catalog.register_tool(pair_spec(), sum_handler()).unwrap();
        let err = catalog.register_tool(pair_spec(), sum_handler()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTool(name) if name == "pair"));
    }

    #[test]
    fn duplicate_parameter_name_fails() {
        let spec = ToolSpec::new("twice", "test tool")
            .required("a", ParamType::Number, "")
            .required("a", ParamType::Text, "");
        let err = Catalog::new().register_tool(spec, sum_handler()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateParam(_, _)));
    }

    #[test]
    fn duplicate_resource_uri_fails() {
        let spec = ResourceSpec {
            uri: "data://x".to_string(),
            name: "x".to_string(),
            description: String::new(),
            mime_type: "application/json".to_string(),
        };
        let producer: ResourceProducer = Arc::new(|| Ok("{}".to_string()));
        let mut catalog = Catalog::new();
        catalog.register_resource(spec.clone(), producer.clone()).unwrap();
        let err = catalog.register_resource(spec, producer).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateResource(_)));
    }

    #[tokio::test]
    async fn invoke_binds_then_runs_handler() {
        let mut catalog = Catalog::new();
        catalog.register_tool(pair_spec(), sum_handler()).unwrap();
        let out = catalog.invoke("pair", json!({"a": 40})).await.unwrap();
        assert_eq!(out, json!(42.0));
    }

    #[tokio::test]
    async fn invoke_unknown_tool_is_a_validation_error() {
        let catalog = Catalog::new();
        let err = catalog.invoke("nope", json!({})).await.unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }

    #[test]
    fn input_schema_lists_required_and_defaults() {
        let schema = pair_spec().input_schema();
        assert_eq!(schema["required"], json!(["a"]));
        assert_eq!(schema["properties"]["b"]["default"], json!(2.0));
        assert_eq!(schema["properties"]["a"]["type"], json!("number"));
    }

    #[test]
    fn signature_is_human_readable() {
        assert_eq!(pair_spec().signature(), "pair(a: number, b: number) -> number");
    }
}
