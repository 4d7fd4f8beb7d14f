//! Scheduler task registry
//!
//! Tasks keep their registration order; listing commands re-sort as they
//! need to.

use std::collections::HashMap;
use std::sync::RwLock;

use time::OffsetDateTime;

struct TaskEntry {
    next: Option<OffsetDateTime>,
    detail: Vec<(String, String)>,
}

#[derive(Default)]
pub(crate) struct Scheduler {
    inner: RwLock<SchedulerState>,
}

#[derive(Default)]
struct SchedulerState {
    order: Vec<String>,
    tasks: HashMap<String, TaskEntry>,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(
        &self,
        name: &str,
        next: Option<OffsetDateTime>,
        detail: Vec<(String, String)>,
    ) {
        let mut state = self.inner.write().expect("scheduler lock poisoned");
        if !state.tasks.contains_key(name) {
            state.order.push(name.to_string());
        }
        state.tasks.insert(name.to_string(), TaskEntry { next, detail });
    }

    /// Task names in registration order
    pub(crate) fn task_names(&self) -> Vec<String> {
        self.inner
            .read()
            .expect("scheduler lock poisoned")
            .order
            .clone()
    }

    pub(crate) fn next_run(&self, name: &str) -> Option<OffsetDateTime> {
        self.inner
            .read()
            .expect("scheduler lock poisoned")
            .tasks
            .get(name)
            .and_then(|t| t.next)
    }

    pub(crate) fn detail(&self, name: &str) -> Option<Vec<(String, String)>> {
        self.inner
            .read()
            .expect("scheduler lock poisoned")
            .tasks
            .get(name)
            .map(|t| t.detail.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_order_preserved() {
        let scheduler = Scheduler::new();
        scheduler.register("zeta", None, vec![]);
        scheduler.register("alpha", None, vec![]);
        scheduler.register("mid", None, vec![]);

        assert_eq!(scheduler.task_names(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_reregistration_keeps_position() {
        let scheduler = Scheduler::new();
        scheduler.register("a", None, vec![]);
        scheduler.register("b", None, vec![]);
        scheduler.register("a", None, vec![("cycle".into(), "60".into())]);

        assert_eq!(scheduler.task_names(), vec!["a", "b"]);
        assert_eq!(
            scheduler.detail("a").unwrap(),
            vec![("cycle".to_string(), "60".to_string())]
        );
    }

    #[test]
    fn test_next_run_lookup() {
        let scheduler = Scheduler::new();
        let at = OffsetDateTime::now_utc();
        scheduler.register("timed", Some(at), vec![]);
        scheduler.register("dormant", None, vec![]);

        assert_eq!(scheduler.next_run("timed"), Some(at));
        assert_eq!(scheduler.next_run("dormant"), None);
        assert_eq!(scheduler.next_run("missing"), None);
    }
}
