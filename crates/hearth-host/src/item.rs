//! Items: addressable named data points with value history

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use time::OffsetDateTime;

use hearth_core::{HostError, ItemHandle, ItemRef, ItemValue};

/// Mutable part of an item, guarded as one unit so a value write and its
/// history rotation are atomic
struct ItemState {
    value: Option<ItemValue>,
    last_change: OffsetDateTime,
    changed_by: String,
    prev_value: Option<ItemValue>,
    prev_change: OffsetDateTime,
}

pub(crate) struct MemoryItem {
    path: String,
    item_type: Option<String>,
    config: Vec<(String, String)>,
    logic_triggers: Vec<String>,
    method_triggers: Vec<String>,
    state: Mutex<ItemState>,
    children: RwLock<Vec<Arc<MemoryItem>>>,
}

impl MemoryItem {
    pub(crate) fn new(
        path: String,
        item_type: Option<String>,
        initial: Option<ItemValue>,
        config: Vec<(String, String)>,
        logic_triggers: Vec<String>,
        method_triggers: Vec<String>,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            path,
            item_type,
            config,
            logic_triggers,
            method_triggers,
            state: Mutex::new(ItemState {
                value: initial.clone(),
                last_change: now,
                changed_by: "Init".to_string(),
                prev_value: initial,
                prev_change: now,
            }),
            children: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn add_child(&self, child: Arc<MemoryItem>) {
        self.children
            .write()
            .expect("item children lock poisoned")
            .push(child);
    }

    /// Does this item carry the given config attribute (optionally with a
    /// specific value)?
    pub(crate) fn config_matches(&self, attr: &str, want: &str) -> bool {
        self.config
            .iter()
            .any(|(k, v)| k == attr && (want.is_empty() || v == want))
    }

    fn age_since(ts: OffsetDateTime) -> Duration {
        let secs = (OffsetDateTime::now_utc() - ts).whole_seconds().max(0);
        Duration::from_secs(secs as u64)
    }
}

impl ItemHandle for MemoryItem {
    fn id(&self) -> &str {
        &self.path
    }

    fn item_type(&self) -> Option<&str> {
        self.item_type.as_deref()
    }

    fn value(&self) -> Option<ItemValue> {
        self.state
            .lock()
            .expect("item state lock poisoned")
            .value
            .clone()
    }

    fn write_value(&self, raw: &str, caller: &str, source: &str) -> Result<(), HostError> {
        let Some(item_type) = self.item_type.as_deref() else {
            return Err(HostError::UntypedItem {
                path: self.path.clone(),
            });
        };

        let value = ItemValue::parse(item_type, raw).ok_or_else(|| HostError::InvalidValue {
            path: self.path.clone(),
            item_type: item_type.to_string(),
            raw: raw.to_string(),
        })?;

        let mut state = self.state.lock().expect("item state lock poisoned");
        state.prev_value = state.value.take();
        state.prev_change = state.last_change;
        state.value = Some(value);
        state.last_change = OffsetDateTime::now_utc();
        state.changed_by = format!("{}:{}", caller, source);

        tracing::debug!(item = %self.path, caller, source, "item value changed");
        Ok(())
    }

    fn age(&self) -> Duration {
        let state = self.state.lock().expect("item state lock poisoned");
        Self::age_since(state.last_change)
    }

    fn last_change(&self) -> OffsetDateTime {
        self.state
            .lock()
            .expect("item state lock poisoned")
            .last_change
    }

    fn changed_by(&self) -> String {
        self.state
            .lock()
            .expect("item state lock poisoned")
            .changed_by
            .clone()
    }

    fn prev_value(&self) -> Option<ItemValue> {
        self.state
            .lock()
            .expect("item state lock poisoned")
            .prev_value
            .clone()
    }

    fn prev_age(&self) -> Duration {
        let state = self.state.lock().expect("item state lock poisoned");
        let secs = (state.last_change - state.prev_change).whole_seconds().max(0);
        Duration::from_secs(secs as u64)
    }

    fn prev_change(&self) -> OffsetDateTime {
        self.state
            .lock()
            .expect("item state lock poisoned")
            .prev_change
    }

    fn config(&self) -> Vec<(String, String)> {
        self.config.clone()
    }

    fn logic_triggers(&self) -> Vec<String> {
        self.logic_triggers.clone()
    }

    fn method_triggers(&self) -> Vec<String> {
        self.method_triggers.clone()
    }

    fn children(&self) -> Vec<ItemRef> {
        self.children
            .read()
            .expect("item children lock poisoned")
            .iter()
            .map(|c| Arc::clone(c) as ItemRef)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed_item() -> MemoryItem {
        MemoryItem::new(
            "kitchen.light".to_string(),
            Some("bool".to_string()),
            Some(ItemValue::Bool(false)),
            vec![("knx_group".to_string(), "1/2/3".to_string())],
            vec![],
            vec![],
        )
    }

    #[test]
    fn test_write_rotates_history() {
        let item = typed_item();
        item.write_value("on", "CLI", "127.0.0.1:9999").unwrap();

        assert_eq!(item.value(), Some(ItemValue::Bool(true)));
        assert_eq!(item.prev_value(), Some(ItemValue::Bool(false)));
        assert_eq!(item.changed_by(), "CLI:127.0.0.1:9999");
    }

    #[test]
    fn test_write_bad_value() {
        let item = typed_item();
        let err = item.write_value("purple", "CLI", "src").unwrap_err();
        assert!(matches!(err, HostError::InvalidValue { .. }));
        // Value untouched on failure.
        assert_eq!(item.value(), Some(ItemValue::Bool(false)));
    }

    #[test]
    fn test_write_untyped_item() {
        let item = MemoryItem::new("env".to_string(), None, None, vec![], vec![], vec![]);
        let err = item.write_value("1", "CLI", "src").unwrap_err();
        assert!(matches!(err, HostError::UntypedItem { .. }));
    }

    #[test]
    fn test_config_matches() {
        let item = typed_item();
        assert!(item.config_matches("knx_group", ""));
        assert!(item.config_matches("knx_group", "1/2/3"));
        assert!(!item.config_matches("knx_group", "4/5/6"));
        assert!(!item.config_matches("unit", ""));
    }
}
