//! Built-in rule library.
//!
//! Fixed at compile time and loaded when `enable_builtin_rules` is set.
//! Order is hardware, system, network; the orchestrator preserves it.

use sysgraph_core::Severity;

use crate::schema::{Action, Condition, Operator, Rule};

/// Thirty days, in seconds.
const UPTIME_LIMIT_SECS: f64 = 2_592_000.0;

fn builtin(
    id: &str,
    name: &str,
    category: &str,
    description: &str,
    severity: Severity,
    condition: Condition,
    message: &str,
) -> Rule {
    Rule::new(id, name, category, severity)
        .with_description(description)
        .with_condition(condition)
        .with_action(Action::create_issue(severity, message))
}

pub fn hardware_rules() -> Vec<Rule> {
    vec![
        builtin(
            "hw_cpu_high_usage",
            "CPU usage high",
            "hardware",
            "CPU usage above 90%",
            Severity::High,
            Condition::new("hardware.cpu.usage_percent", Operator::Gt, 90.0),
            "CPU usage is too high and may degrade system performance",
        ),
        builtin(
            "hw_memory_high_usage",
            "Memory usage high",
            "hardware",
            "Memory usage above 90%",
            Severity::High,
            Condition::new("hardware.memory.usage_percent", Operator::Gt, 90.0),
            "Memory usage is too high, the system may slow down",
        ),
        builtin(
            "hw_disk_full",
            "Disk space low",
            "hardware",
            "Disk usage above 95%",
            Severity::Critical,
            Condition::new("hardware.disks[*].usage_percent", Operator::Gt, 95.0),
            "Disk space is critically low and needs cleaning up immediately",
        ),
        builtin(
            "hw_cpu_temperature_high",
            "CPU temperature high",
            "hardware",
            "CPU temperature above 80°C",
            Severity::High,
            Condition::new("hardware.cpu.temperature", Operator::Gt, 80.0),
            "CPU temperature is too high, check the cooling system",
        ),
    ]
}

pub fn system_rules() -> Vec<Rule> {
    vec![
        builtin(
            "sys_uptime_too_long",
            "Uptime too long",
            "system",
            "System uptime above 30 days",
            Severity::Medium,
            Condition::new("system.system_info.uptime", Operator::Gt, UPTIME_LIMIT_SECS),
            "System has been running for a long time, a restart is recommended to reclaim memory",
        ),
        builtin(
            "sys_too_many_processes",
            "Too many processes",
            "system",
            "More than 200 active processes",
            Severity::Medium,
            Condition::new("system.processes", Operator::Count, 200.0),
            "Too many processes are running, consider closing unneeded programs",
        ),
        builtin(
            "sys_high_cpu_process",
            "High CPU process",
            "system",
            "A single process uses more than 80% CPU",
            Severity::Medium,
            Condition::new("system.processes[*].cpu_percent", Operator::Gt, 80.0),
            "A process with high CPU usage was detected",
        ),
    ]
}

pub fn network_rules() -> Vec<Rule> {
    vec![
        builtin(
            "net_no_connectivity",
            "No network connectivity",
            "network",
            "Every connectivity probe failed",
            Severity::Critical,
            Condition::check("network.connectivity", Operator::AllFalse, "is_reachable"),
            "Network connectivity is down, no probed host is reachable",
        ),
        builtin(
            "net_high_latency",
            "Network latency high",
            "network",
            "Average latency above 200ms",
            Severity::Medium,
            Condition::new("network.connectivity[*].latency", Operator::AvgGt, 200.0),
            "Network latency is too high and may hurt network performance",
        ),
        builtin(
            "net_no_active_interface",
            "No active network interface",
            "network",
            "No network interface is up",
            Severity::Critical,
            Condition::check("network.interfaces", Operator::NoneTrue, "is_up"),
            "No network interface is up, networking is unavailable",
        ),
    ]
}

/// Every built-in rule, in declaration order.
pub fn all_builtin_rules() -> Vec<Rule> {
    let mut rules = hardware_rules();
    rules.extend(system_rules());
    rules.extend(network_rules());
    rules
}
