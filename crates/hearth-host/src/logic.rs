//! Logics: triggerable, enable-able user-defined units

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use hearth_core::LogicHandle;

use crate::log::MemoryLog;

pub(crate) struct MemoryLogic {
    name: String,
    enabled: AtomicBool,
    /// Bumped on reload, standing in for bytecode regeneration
    generation: AtomicU64,
    trigger_count: AtomicU64,
    host_log: Arc<MemoryLog>,
}

impl MemoryLogic {
    pub(crate) fn new(name: String, enabled: bool, host_log: Arc<MemoryLog>) -> Self {
        Self {
            name,
            enabled: AtomicBool::new(enabled),
            generation: AtomicU64::new(0),
            trigger_count: AtomicU64::new(0),
            host_log,
        }
    }

    #[cfg(test)]
    pub(crate) fn trigger_count(&self) -> u64 {
        self.trigger_count.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl LogicHandle for MemoryLogic {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
        tracing::info!(logic = %self.name, "logic enabled");
    }

    fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        tracing::info!(logic = %self.name, "logic disabled");
    }

    fn trigger(&self, by: &str) {
        self.trigger_count.fetch_add(1, Ordering::SeqCst);
        self.host_log
            .append("INFO", &format!("logic {} triggered by {}", self.name, by));
        tracing::info!(logic = %self.name, by, "logic triggered");
    }

    fn reload(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        tracing::info!(logic = %self.name, "logic reloaded");
    }
}
