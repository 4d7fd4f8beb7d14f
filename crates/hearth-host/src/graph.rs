//! The in-memory host graph

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use time::OffsetDateTime;

use hearth_core::{HostApi, ItemRef, ItemValue, LogRef, LogicRef};

use crate::definition::HostDefinition;
use crate::item::MemoryItem;
use crate::log::MemoryLog;
use crate::logic::MemoryLogic;
use crate::scheduler::Scheduler;

/// Name of the log every host carries
const DEFAULT_LOG: &str = "default";

pub struct MemoryHost {
    version: String,
    started: Instant,
    items: DashMap<String, Arc<MemoryItem>>,
    logics: DashMap<String, Arc<MemoryLogic>>,
    scheduler: Scheduler,
    logs: DashMap<String, Arc<MemoryLog>>,
    default_log: Arc<MemoryLog>,
    threads: RwLock<Vec<String>>,
}

impl MemoryHost {
    /// Build a host graph from a definition
    pub fn from_definition(def: &HostDefinition) -> Self {
        let default_log = Arc::new(MemoryLog::new(DEFAULT_LOG.to_string()));
        let logs: DashMap<String, Arc<MemoryLog>> = DashMap::new();
        logs.insert(DEFAULT_LOG.to_string(), Arc::clone(&default_log));
        for name in &def.logs {
            logs.insert(name.clone(), Arc::new(MemoryLog::new(name.clone())));
        }

        let items: DashMap<String, Arc<MemoryItem>> = DashMap::new();
        for item_def in &def.items {
            let initial = item_def.item_type.as_deref().map(|ty| {
                item_def
                    .value
                    .as_deref()
                    .and_then(|raw| ItemValue::parse(ty, raw))
                    .unwrap_or_else(|| zero_value(ty))
            });
            let item = Arc::new(MemoryItem::new(
                item_def.path.clone(),
                item_def.item_type.clone(),
                initial,
                item_def
                    .config
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
                item_def.logic_triggers.clone(),
                item_def.method_triggers.clone(),
            ));
            items.insert(item_def.path.clone(), item);
        }

        // Link the tree: each item becomes a child of the item one path
        // segment up, when that item exists.
        for entry in items.iter() {
            if let Some((parent_path, _)) = entry.key().rsplit_once('.') {
                if let Some(parent) = items.get(parent_path) {
                    parent.add_child(Arc::clone(entry.value()));
                }
            }
        }

        let now = OffsetDateTime::now_utc();
        let scheduler = Scheduler::new();
        let logics: DashMap<String, Arc<MemoryLogic>> = DashMap::new();
        for logic_def in &def.logics {
            let logic = Arc::new(MemoryLogic::new(
                logic_def.name.clone(),
                logic_def.enabled,
                Arc::clone(&default_log),
            ));
            logics.insert(logic_def.name.clone(), logic);
            if let Some(secs) = logic_def.schedule_secs {
                scheduler.register(
                    &logic_def.name,
                    Some(now + Duration::from_secs(secs)),
                    vec![("cycle".to_string(), format!("{}", secs))],
                );
            }
        }

        for task_def in &def.tasks {
            scheduler.register(
                &task_def.name,
                task_def.next_secs.map(|s| now + Duration::from_secs(s)),
                task_def
                    .detail
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            );
        }

        Self {
            version: def
                .version
                .clone()
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            started: Instant::now(),
            items,
            logics,
            scheduler,
            logs,
            default_log,
            threads: RwLock::new(def.threads.clone()),
        }
    }

    /// The demonstration graph
    pub fn sample() -> Self {
        Self::from_definition(&HostDefinition::sample())
    }

    /// Report a host thread as live
    pub fn register_thread(&self, name: &str) {
        self.threads
            .write()
            .expect("thread registry lock poisoned")
            .push(name.to_string());
    }

    /// Register a scheduler task
    pub fn register_task(
        &self,
        name: &str,
        next: Option<OffsetDateTime>,
        detail: Vec<(String, String)>,
    ) {
        self.scheduler.register(name, next, detail);
    }
}

fn zero_value(item_type: &str) -> ItemValue {
    match item_type {
        "bool" => ItemValue::Bool(false),
        "num" => ItemValue::Num(0.0),
        _ => ItemValue::Str(String::new()),
    }
}

/// Glob-style match with `*` standing for any run of characters
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0usize, 0usize);
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < text.len() {
        if pi < pattern.len() && (pattern[pi] == text[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < pattern.len() && pattern[pi] == '*' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if let Some((star_pi, star_ti)) = backtrack {
            pi = star_pi + 1;
            ti = star_ti + 1;
            backtrack = Some((star_pi, star_ti + 1));
        } else {
            return false;
        }
    }
    while pi < pattern.len() && pattern[pi] == '*' {
        pi += 1;
    }
    pi == pattern.len()
}

fn sort_items(mut items: Vec<ItemRef>) -> Vec<ItemRef> {
    items.sort_by_key(|i| i.id().to_lowercase());
    items
}

impl HostApi for MemoryHost {
    fn version(&self) -> String {
        self.version.clone()
    }

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn runtime(&self) -> Duration {
        self.started.elapsed()
    }

    fn item(&self, path: &str) -> Option<ItemRef> {
        self.items.get(path).map(|i| Arc::clone(i.value()) as ItemRef)
    }

    fn first_level_items(&self) -> Vec<ItemRef> {
        sort_items(
            self.items
                .iter()
                .filter(|e| !e.key().contains('.'))
                .map(|e| Arc::clone(e.value()) as ItemRef)
                .collect(),
        )
    }

    fn all_items(&self) -> Vec<ItemRef> {
        sort_items(
            self.items
                .iter()
                .map(|e| Arc::clone(e.value()) as ItemRef)
                .collect(),
        )
    }

    fn match_items(&self, pattern: &str) -> Vec<ItemRef> {
        if let Some((attr, want)) = pattern.split_once(':') {
            return sort_items(
                self.items
                    .iter()
                    .filter(|e| e.value().config_matches(attr.trim(), want.trim()))
                    .map(|e| Arc::clone(e.value()) as ItemRef)
                    .collect(),
            );
        }
        if pattern.contains('*') {
            return sort_items(
                self.items
                    .iter()
                    .filter(|e| wildcard_match(pattern, e.key()))
                    .map(|e| Arc::clone(e.value()) as ItemRef)
                    .collect(),
            );
        }
        self.item(pattern).into_iter().collect()
    }

    fn logic_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.logics.iter().map(|e| e.key().clone()).collect();
        names.sort_by_key(|n| n.to_lowercase());
        names
    }

    fn logic(&self, name: &str) -> Option<LogicRef> {
        self.logics
            .get(name)
            .map(|l| Arc::clone(l.value()) as LogicRef)
    }

    fn scheduler_task_names(&self) -> Vec<String> {
        self.scheduler.task_names()
    }

    fn next_run(&self, name: &str) -> Option<OffsetDateTime> {
        self.scheduler.next_run(name)
    }

    fn task_detail(&self, name: &str) -> Option<Vec<(String, String)>> {
        self.scheduler.detail(name)
    }

    fn default_log(&self) -> LogRef {
        Arc::clone(&self.default_log) as LogRef
    }

    fn log(&self, name: &str) -> Option<LogRef> {
        self.logs.get(name).map(|l| Arc::clone(l.value()) as LogRef)
    }

    fn thread_names(&self) -> Vec<String> {
        self.threads
            .read()
            .expect("thread registry lock poisoned")
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> MemoryHost {
        MemoryHost::sample()
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("kitchen.*", "kitchen.light"));
        assert!(wildcard_match("*.temperature", "env.core.temperature"));
        assert!(wildcard_match("*", "anything.at.all"));
        assert!(wildcard_match("env.*.temperature", "env.core.temperature"));
        assert!(!wildcard_match("kitchen.*", "env.core"));
        assert!(!wildcard_match("kitchen", "kitchen.light"));
    }

    #[test]
    fn test_all_items_sorted_case_insensitively() {
        let host = host();
        let ids: Vec<String> = host.all_items().iter().map(|i| i.id().to_string()).collect();
        let mut sorted = ids.clone();
        sorted.sort_by_key(|s| s.to_lowercase());
        assert_eq!(ids, sorted);
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_first_level_items() {
        let host = host();
        let ids: Vec<String> = host
            .first_level_items()
            .iter()
            .map(|i| i.id().to_string())
            .collect();
        assert_eq!(ids, vec!["env", "kitchen"]);
    }

    #[test]
    fn test_children_linked() {
        let host = host();
        let kitchen = host.item("kitchen").expect("kitchen exists");
        let mut child_ids: Vec<String> =
            kitchen.children().iter().map(|c| c.id().to_string()).collect();
        child_ids.sort();
        assert_eq!(child_ids, vec!["kitchen.light", "kitchen.temperature"]);
    }

    #[test]
    fn test_match_items_wildcard() {
        let host = host();
        let ids: Vec<String> = host
            .match_items("kitchen.*")
            .iter()
            .map(|i| i.id().to_string())
            .collect();
        assert_eq!(ids, vec!["kitchen.light", "kitchen.temperature"]);
    }

    #[test]
    fn test_match_items_attribute() {
        let host = host();
        let ids: Vec<String> = host
            .match_items("unit:celsius")
            .iter()
            .map(|i| i.id().to_string())
            .collect();
        assert_eq!(ids, vec!["env.core.temperature", "kitchen.temperature"]);

        let present: Vec<String> = host
            .match_items("knx_group:")
            .iter()
            .map(|i| i.id().to_string())
            .collect();
        assert_eq!(present, vec!["kitchen.light"]);
    }

    #[test]
    fn test_match_items_exact() {
        let host = host();
        let matches = host.match_items("kitchen.light");
        assert_eq!(matches.len(), 1);
        assert!(host.match_items("kitchen.sink").is_empty());
    }

    #[test]
    fn test_logic_schedule_registered_as_task() {
        let host = host();
        let names = host.scheduler_task_names();
        assert_eq!(
            names,
            vec!["night_scene", "watchdog", "series_cleanup", "item_watch"]
        );
        assert!(host.next_run("night_scene").is_some());
        assert!(host.next_run("series_cleanup").is_some());
    }

    #[test]
    fn test_logs() {
        let host = host();
        assert_eq!(host.default_log().name(), "default");
        assert!(host.log("env").is_some());
        assert!(host.log("nope").is_none());
    }

    #[test]
    fn test_zero_value_fallback() {
        let def: HostDefinition = toml::from_str(
            r#"
            [[items]]
            path = "bare"
            type = "num"
            "#,
        )
        .unwrap();
        let host = MemoryHost::from_definition(&def);
        let item = host.item("bare").unwrap();
        assert_eq!(item.value(), Some(ItemValue::Num(0.0)));
    }
}
