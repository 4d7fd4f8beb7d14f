//! Host collaborator contract
//!
//! The console never owns the item/logic/scheduler data model. It borrows
//! handles from the running host for the duration of a single command.
//! Everything the console needs from the host is expressed here as
//! object-safe traits so the graph can be injected at construction and
//! faked in tests.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;

use crate::error::HostError;

/// Shared handle to an item in the host object graph
pub type ItemRef = Arc<dyn ItemHandle>;

/// Shared handle to a logic
pub type LogicRef = Arc<dyn LogicHandle>;

/// Shared handle to an in-memory log
pub type LogRef = Arc<dyn LogHandle>;

/// A typed item value
#[derive(Debug, Clone, PartialEq)]
pub enum ItemValue {
    Bool(bool),
    Num(f64),
    Str(String),
}

impl ItemValue {
    /// Coerce a raw string to the given item type (`bool`, `num` or `str`).
    ///
    /// Returns `None` when the raw text cannot be represented in the type,
    /// or when the type name itself is unknown.
    pub fn parse(item_type: &str, raw: &str) -> Option<ItemValue> {
        match item_type {
            "bool" => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(ItemValue::Bool(true)),
                "false" | "0" | "no" | "off" => Some(ItemValue::Bool(false)),
                _ => None,
            },
            "num" => raw.trim().parse::<f64>().ok().map(ItemValue::Num),
            "str" => Some(ItemValue::Str(raw.to_string())),
            _ => None,
        }
    }

    /// Name of the type this value carries
    pub fn type_name(&self) -> &'static str {
        match self {
            ItemValue::Bool(_) => "bool",
            ItemValue::Num(_) => "num",
            ItemValue::Str(_) => "str",
        }
    }
}

impl fmt::Display for ItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemValue::Bool(b) => write!(f, "{}", b),
            ItemValue::Num(n) => write!(f, "{}", n),
            ItemValue::Str(s) => write!(f, "{}", s),
        }
    }
}

/// One entry of an in-memory log
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: OffsetDateTime,
    pub level: String,
    pub message: String,
}

/// A single addressable data point of the host
///
/// Reads and writes are split into explicit operations; the write carries
/// the caller identity and the connection source so the host can attribute
/// the change.
pub trait ItemHandle: Send + Sync {
    /// Full dotted path of the item
    fn id(&self) -> &str;

    /// Item type (`bool`, `num`, `str`), or `None` for structural items
    fn item_type(&self) -> Option<&str>;

    /// Current value; `None` for untyped items
    fn value(&self) -> Option<ItemValue>;

    /// Set the value from raw text, attributed to `caller` and `source`
    fn write_value(&self, raw: &str, caller: &str, source: &str) -> Result<(), HostError>;

    /// Time since the last change
    fn age(&self) -> Duration;

    /// Timestamp of the last change
    fn last_change(&self) -> OffsetDateTime;

    /// Identity the last change is attributed to
    fn changed_by(&self) -> String;

    /// Value before the last change; `None` for untyped items
    fn prev_value(&self) -> Option<ItemValue>;

    /// Time the previous value had been current
    fn prev_age(&self) -> Duration;

    /// Timestamp of the change before the last one
    fn prev_change(&self) -> OffsetDateTime;

    /// Configuration attributes in declaration order
    fn config(&self) -> Vec<(String, String)>;

    /// Names of logics triggered by this item
    fn logic_triggers(&self) -> Vec<String>;

    /// Names of methods triggered by this item
    fn method_triggers(&self) -> Vec<String>;

    /// Direct children of this item
    fn children(&self) -> Vec<ItemRef>;
}

/// A host-scheduled user-defined executable unit
pub trait LogicHandle: Send + Sync {
    fn name(&self) -> &str;
    fn enabled(&self) -> bool;
    fn enable(&self);
    fn disable(&self);

    /// Run the logic, attributed to `by`
    fn trigger(&self, by: &str);

    /// Recompile the logic's executable body
    fn reload(&self);
}

/// A named in-memory log of the host
pub trait LogHandle: Send + Sync {
    fn name(&self) -> &str;

    /// Drop all entries older than `before`
    fn clean(&self, before: OffsetDateTime);

    /// The most recent `n` entries, oldest first
    fn last(&self, n: usize) -> Vec<LogEntry>;
}

/// Read/write capability over the host object graph
///
/// One handle is shared by every console session; the host's own mutation
/// entrypoints provide whatever locking the graph needs.
pub trait HostApi: Send + Sync {
    /// Host product version, shown in the connection greeting
    fn version(&self) -> String;

    /// Current host time
    fn now(&self) -> OffsetDateTime;

    /// Time since the host process started
    fn runtime(&self) -> Duration;

    /// Exact-path item lookup
    fn item(&self, path: &str) -> Option<ItemRef>;

    /// Items without a parent, sorted case-insensitively by path
    fn first_level_items(&self) -> Vec<ItemRef>;

    /// Every item, sorted case-insensitively by path
    fn all_items(&self) -> Vec<ItemRef>;

    /// Pattern match over item paths: `*` is a path wildcard, a pattern
    /// containing `:` selects by config attribute (`attr:value`, empty
    /// value meaning attribute presence). Matches are sorted
    /// case-insensitively by path.
    fn match_items(&self, pattern: &str) -> Vec<ItemRef>;

    /// All logic names, sorted case-insensitively
    fn logic_names(&self) -> Vec<String>;

    /// Lookup a logic by name
    fn logic(&self, name: &str) -> Option<LogicRef>;

    /// All scheduler task names in registration order
    fn scheduler_task_names(&self) -> Vec<String>;

    /// Next run time of a scheduler task, if one is planned
    fn next_run(&self, name: &str) -> Option<OffsetDateTime>;

    /// Key/value pairs of one task's internal descriptor
    fn task_detail(&self, name: &str) -> Option<Vec<(String, String)>>;

    /// The host's default in-memory log
    fn default_log(&self) -> LogRef;

    /// Lookup a named in-memory log
    fn log(&self, name: &str) -> Option<LogRef>;

    /// Names of the host's live threads
    fn thread_names(&self) -> Vec<String>;
}
