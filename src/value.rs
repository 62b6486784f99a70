//! Argument and parameter values.
//!
//! A `Value` is anything a client can hand to a link: primitives, nested
//! lists and maps, nested builders (`Chain`, `Partial`), or an explicitly
//! named `Param`. Links decide per variant whether a value is bound as a
//! parameter or rendered as literal text.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::chain::Chain;
use crate::params::Param;
use crate::partial::Partial;

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Chain(Box<Chain>),
    Partial(Rc<Partial>),
    Param(Box<Param>),
}

impl Value {
    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for values rendered in place rather than bound (`Chain`, `Partial`).
    pub fn is_builder(&self) -> bool {
        matches!(self, Value::Chain(_) | Value::Partial(_))
    }

    /// Get type name for debugging/error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Chain(_) => "chain",
            Value::Partial(_) => "partial",
            Value::Param(_) => "param",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! int_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

int_from!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Str(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, T: Into<Value>> From<BTreeMap<K, T>> for Value {
    fn from(v: BTreeMap<K, T>) -> Self {
        Value::Map(v.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<Chain> for Value {
    fn from(v: Chain) -> Self {
        Value::Chain(Box::new(v))
    }
}

impl From<&Chain> for Value {
    fn from(v: &Chain) -> Self {
        Value::Chain(Box::new(v.clone()))
    }
}

impl From<Rc<Partial>> for Value {
    fn from(v: Rc<Partial>) -> Self {
        Value::Partial(v)
    }
}

impl From<&Rc<Partial>> for Value {
    fn from(v: &Rc<Partial>) -> Self {
        Value::Partial(Rc::clone(v))
    }
}

impl From<Param> for Value {
    fn from(v: Param) -> Self {
        Value::Param(Box::new(v))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Positional and keyword arguments for a link call.
///
/// Keyword arguments are kept sorted by key so that every consumer iterates
/// them deterministically.
#[derive(Debug, Clone, Default)]
pub struct Args {
    pub positional: Vec<Value>,
    pub keyword: BTreeMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn push(&mut self, value: impl Into<Value>) {
        self.positional.push(value.into());
    }

    /// Set a keyword argument, replacing any previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.keyword.insert(key.into(), value.into());
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.push(value);
        self
    }

    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Remove and return a keyword argument.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.keyword.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

impl<T: Into<Value>> From<Vec<T>> for Args {
    fn from(values: Vec<T>) -> Self {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            keyword: BTreeMap::new(),
        }
    }
}

/// Build an [`Args`] from positional values and optional `key = value` pairs.
///
/// ```ignore
/// let a = args!["n", 1];
/// let b = args!["n"; labels = "Person", age = 42];
/// let c = args![; min_hops = 1, max_hops = 3];
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($arg:expr),* $(,)? $(; $($key:ident = $val:expr),* $(,)?)?) => {{
        #[allow(unused_mut)]
        let mut args = $crate::Args::new();
        $( args.push($arg); )*
        $( $( args.insert(stringify!($key), $val); )* )?
        args
    }};
}
