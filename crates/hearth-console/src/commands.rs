//! Built-in command set
//!
//! Contracts and user-visible texts follow the host's established console
//! surface: listing commands sort case-insensitively by path/name, every
//! scheduled time is rendered with the fixed timestamp format, and all
//! mutating commands are gated on `updates_allowed`.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use time::OffsetDateTime;

use hearth_core::time::{format_duration, format_timestamp};
use hearth_core::{HostApi, ItemRef, ItemValue, LogRef};

use crate::dispatch::{CommandContext, Reply};
use crate::registry::{CommandHandler, CommandRegistry};

/// Register the built-in command set on a registry
pub fn register_builtins(registry: &Arc<CommandRegistry>) {
    registry.register("cl", Arc::new(cli_cl), Some("cl [log]: clean (memory) log"));
    registry.register("la", Arc::new(cli_la), Some("la: list all items (with values)"));
    registry.register(
        "update",
        Arc::new(cli_update),
        Some("update [item] = [value]: update the specified item with the specified value"),
    );
    registry.register("up", Arc::new(cli_update), Some("up: alias for update"));
    registry.register(
        "ls",
        Arc::new(cli_ls),
        Some("ls: list the first level items\nls [item]: list item and every child item (with values)"),
    );
    registry.register("lo", Arc::new(cli_lo), Some("lo: list all logics and next execution time"));
    registry.register("lt", Arc::new(cli_lt), Some("lt: list current thread names"));
    registry.register("tr", Arc::new(cli_tr), Some("tr [logic]: trigger logic"));
    registry.register("rl", Arc::new(cli_rl), Some("rl [logic]: reload logic"));
    registry.register("rr", Arc::new(cli_rr), Some("rr [logic]: reload and run logic"));
    registry.register("rt", Arc::new(cli_rt), Some("rt: return runtime"));
    registry.register("dump", Arc::new(cli_dump), Some("dump [item]: dump details about given item"));
    registry.register("sl", Arc::new(cli_sl), Some("sl: list all scheduler tasks by name"));
    registry.register("st", Arc::new(cli_st), Some("st: list all scheduler tasks by execution time"));
    registry.register("si", Arc::new(cli_si), Some("si [task]: show details for given task"));
    registry.register("ld", Arc::new(cli_ld), Some("ld [log]: log dump of (memory) log"));
    registry.register("el", Arc::new(cli_el), Some("el [logic]: enables logic"));
    registry.register("dl", Arc::new(cli_dl), Some("dl [logic]: disables logic"));

    let help = make_help(registry);
    registry.register("help", Arc::clone(&help), None);
    registry.register("h", help, None);
}

/// `help` needs the registry itself; held weakly so the registry does not
/// keep itself alive through its own entry
fn make_help(registry: &Arc<CommandRegistry>) -> CommandHandler {
    let registry = Arc::downgrade(registry);
    Arc::new(move |reply, _ctx| {
        if let Some(registry) = registry.upgrade() {
            for usage in registry.usages() {
                reply.push(&usage);
                reply.push("\n");
            }
        }
        reply.push("quit: quit the session\n");
        reply.push("q: alias for quit\n");
        Ok(())
    })
}

fn push_item_line(reply: &mut Reply, item: &ItemRef) {
    match (item.item_type(), item.value()) {
        (Some(_), Some(value)) => reply.push(&format!("{} = {}\n", item.id(), value)),
        _ => reply.push(&format!("{}\n", item.id())),
    }
}

fn display_value(value: Option<ItemValue>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "None".to_string())
}

/// `la` - list all items with values
fn cli_la(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    reply.push("Items:\n======\n");
    for item in ctx.host.all_items() {
        push_item_line(reply, &item);
    }
    Ok(())
}

/// `ls` - list first-level items, pattern matches, or one item's subtree
fn cli_ls(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    reply.push("Items:\n======\n");
    let arg = ctx.arg.as_str();

    if arg.is_empty() {
        for item in ctx.host.first_level_items() {
            reply.push(&format!("{}\n", item.id()));
        }
        return Ok(());
    }

    if arg.contains('*') || arg.contains(':') {
        let items = ctx.host.match_items(arg);
        if items.is_empty() {
            reply.push(&format!("Could not find path: {}\n", arg));
            return Ok(());
        }
        for item in items {
            push_item_line(reply, &item);
        }
        return Ok(());
    }

    match ctx.host.item(arg) {
        Some(item) => push_item_tree(reply, &item),
        None => reply.push(&format!("Could not find path: {}\n", arg)),
    }
    Ok(())
}

fn push_item_tree(reply: &mut Reply, item: &ItemRef) {
    push_item_line(reply, item);
    let mut children = item.children();
    children.sort_by_key(|c| c.id().to_lowercase());
    for child in children {
        push_item_tree(reply, &child);
    }
}

/// `update`/`up` - set an item value by pattern
fn cli_update(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    if !ctx.updates_allowed {
        reply.push("Updating items is not allowed.\n");
        return Ok(());
    }

    let (path, value) = match ctx.arg.split_once('=') {
        Some((path, value)) => (path.trim(), value.trim()),
        None => ("", ""),
    };
    if value.is_empty() {
        reply.push("You have to specify an item value. Syntax: up item = value\n");
        return Ok(());
    }

    let items = ctx.host.match_items(path);
    if items.is_empty() {
        reply.push(&format!(
            "Could not find any item with given pattern: '{}'\n",
            path
        ));
        return Ok(());
    }
    for item in items {
        if item.item_type().is_none() {
            reply.push(&format!(
                "Could not find item with a valid type specified: '{}'\n",
                path
            ));
            return Ok(());
        }
        item.write_value(value, "CLI", &ctx.source)?;
    }
    Ok(())
}

/// `lo` - list logics with enable state and next execution time
fn cli_lo(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    reply.push("Logics:\n");
    for name in ctx.host.logic_names() {
        let mut notes = Vec::new();
        if let Some(logic) = ctx.host.logic(&name) {
            if !logic.enabled() {
                notes.push("disabled".to_string());
            }
        }
        if let Some(next) = ctx.host.next_run(&name) {
            notes.push(format!("scheduled for {}", format_timestamp(next)));
        }
        reply.push(&name);
        if !notes.is_empty() {
            reply.push(&format!(" ({})", notes.join(", ")));
        }
        reply.push("\n");
    }
    Ok(())
}

/// `lt` - list live thread names
fn cli_lt(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    let names = ctx.host.thread_names();
    reply.push(&format!("{} Threads:\n", names.len()));
    for name in names {
        reply.push(&format!("{}\n", name));
    }
    Ok(())
}

/// `tr` - trigger a logic
fn cli_tr(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    if !ctx.updates_allowed {
        reply.push("Logic triggering is not allowed.\n");
        return Ok(());
    }
    let name = ctx.arg.as_str();
    if name.is_empty() {
        reply.push("Please name logic to trigger\n");
        return Ok(());
    }
    match ctx.host.logic(name) {
        Some(logic) => {
            logic.trigger("CLI");
            reply.push(&format!("Logic '{}' triggered.\n", name));
        }
        None => reply.push(&format!("Logic '{}' not found.\n", name)),
    }
    Ok(())
}

/// `rl` - reload a logic
fn cli_rl(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    if !ctx.updates_allowed {
        reply.push("Logic triggering is not allowed.\n");
        return Ok(());
    }
    let name = ctx.arg.as_str();
    if name.is_empty() {
        reply.push("Please name logic to reload\n");
        return Ok(());
    }
    match ctx.host.logic(name) {
        Some(logic) => {
            logic.reload();
            reply.push(&format!("Logic '{}' reloaded.\n", name));
        }
        None => reply.push(&format!("Logic '{}' not found.\n", name)),
    }
    Ok(())
}

/// `rr` - reload, then trigger a logic
fn cli_rr(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    if !ctx.updates_allowed {
        reply.push("Logic triggering is not allowed.\n");
        return Ok(());
    }
    let name = ctx.arg.as_str();
    if name.is_empty() {
        reply.push("Please name logic to reload and trigger\n");
        return Ok(());
    }
    match ctx.host.logic(name) {
        Some(logic) => {
            logic.reload();
            logic.trigger("CLI");
            reply.push(&format!("Logic '{}' reloaded and triggered.\n", name));
        }
        None => reply.push(&format!("Logic '{}' not found.\n", name)),
    }
    Ok(())
}

/// `el` - enable a logic
fn cli_el(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    if !ctx.updates_allowed {
        reply.push("Logic triggering is not allowed.\n");
        return Ok(());
    }
    match ctx.host.logic(&ctx.arg) {
        Some(logic) => logic.enable(),
        None => reply.push(&format!("Logic '{}' not found.\n", ctx.arg)),
    }
    Ok(())
}

/// `dl` - disable a logic
fn cli_dl(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    if !ctx.updates_allowed {
        reply.push("Logic triggering is not allowed.\n");
        return Ok(());
    }
    match ctx.host.logic(&ctx.arg) {
        Some(logic) => logic.disable(),
        None => reply.push(&format!("Logic '{}' not found.\n", ctx.arg)),
    }
    Ok(())
}

/// `rt` - host process runtime
fn cli_rt(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    reply.push(&format!("Runtime: {}\n", format_duration(ctx.host.runtime())));
    Ok(())
}

/// `dump` - structured detail block per matched item
fn cli_dump(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    let arg = ctx.arg.as_str();
    let items = if arg.contains('*') || arg.contains(':') {
        ctx.host.match_items(arg)
    } else {
        ctx.host.item(arg).into_iter().collect()
    };

    if items.is_empty() {
        reply.push("Nothing found\n");
        return Ok(());
    }
    for item in items {
        let Some(item_type) = item.item_type() else {
            continue;
        };
        reply.push(&format!("Item {} {{\n", item.id()));
        reply.push(&format!("  type = {}\n", item_type));
        reply.push(&format!("  value = {}\n", display_value(item.value())));
        reply.push(&format!("  age = {}\n", format_duration(item.age())));
        reply.push(&format!(
            "  last_change = {}\n",
            format_timestamp(item.last_change())
        ));
        reply.push(&format!("  changed_by = {}\n", item.changed_by()));
        reply.push(&format!(
            "  previous_value = {}\n",
            display_value(item.prev_value())
        ));
        reply.push(&format!(
            "  previous_age = {}\n",
            format_duration(item.prev_age())
        ));
        reply.push(&format!(
            "  previous_change = {}\n",
            format_timestamp(item.prev_change())
        ));
        reply.push("  config = {\n");
        for (key, value) in item.config() {
            reply.push(&format!("    {} = {}\n", key, value));
        }
        reply.push("  }\n");
        reply.push("  logics = [\n");
        for trigger in item.logic_triggers() {
            reply.push(&format!("    {}\n", trigger));
        }
        reply.push("  ]\n");
        reply.push("  triggers = [\n");
        for trigger in item.method_triggers() {
            reply.push(&format!("    {}\n", trigger));
        }
        reply.push("  ]\n");
        reply.push("}\n");
    }
    Ok(())
}

/// Scheduler tasks that are not logics and have a planned run, in
/// registration order
fn scheduled_tasks(host: &Arc<dyn HostApi>) -> Vec<(String, OffsetDateTime)> {
    let logic_names: HashSet<String> = host.logic_names().into_iter().collect();
    host.scheduler_task_names()
        .into_iter()
        .filter(|name| !logic_names.contains(name))
        .filter_map(|name| host.next_run(&name).map(|next| (name, next)))
        .collect()
}

/// `sl` - scheduler tasks by name
fn cli_sl(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    let tasks = scheduled_tasks(&ctx.host);
    reply.push(&format!("{} scheduler tasks:\n", tasks.len()));
    for (name, next) in tasks {
        reply.push(&format!(
            "{} (scheduled for {})\n",
            name,
            format_timestamp(next)
        ));
    }
    Ok(())
}

/// `st` - scheduler tasks by execution time, ascending and stable
fn cli_st(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    let mut tasks = scheduled_tasks(&ctx.host);
    tasks.sort_by_key(|(_, next)| *next);
    reply.push(&format!("{} scheduler tasks by time:\n", tasks.len()));
    for (name, next) in tasks {
        reply.push(&format!("{} {}\n", format_timestamp(next), name));
    }
    Ok(())
}

/// `si` - one task's internal descriptor
fn cli_si(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    match ctx.host.task_detail(&ctx.arg) {
        None => reply.push(&format!("Scheduler task '{}' not found\n", ctx.arg)),
        Some(detail) => {
            reply.push(&format!("Task {} {{\n", ctx.arg));
            for (key, value) in detail {
                reply.push(&format!("  {} = {}\n", key, value));
            }
            reply.push("}\n");
        }
    }
    Ok(())
}

/// Resolve the log named in the argument, or the default log for a blank
/// argument. A miss is reported to the session.
fn resolve_log(reply: &mut Reply, ctx: &CommandContext) -> Option<LogRef> {
    if ctx.arg.is_empty() {
        return Some(ctx.host.default_log());
    }
    match ctx.host.log(&ctx.arg) {
        Some(log) => Some(log),
        None => {
            reply.push(&format!("Log '{}' does not exist\n", ctx.arg));
            None
        }
    }
}

/// `cl` - clear an in-memory log
fn cli_cl(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    if let Some(log) = resolve_log(reply, ctx) {
        log.clean(ctx.host.now());
    }
    Ok(())
}

/// `ld` - dump the last entries of an in-memory log
fn cli_ld(reply: &mut Reply, ctx: &CommandContext) -> Result<()> {
    if let Some(log) = resolve_log(reply, ctx) {
        reply.push(&format!("Log dump of '{}':\n", log.name()));
        for entry in log.last(10) {
            reply.push(&format!(
                "{} {} {}\n",
                format_timestamp(entry.time),
                entry.level,
                entry.message
            ));
        }
    }
    Ok(())
}
