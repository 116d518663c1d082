//! Dependency graph construction and wavefront scheduling (component H).
//!
//! A process "depends on" another if it reads a signal the other writes.
//! Scheduling proceeds in waves: every process with no unscheduled
//! dependency runs next, in declaration order within its wave, until every
//! process has been placed or no process is ready (a cycle).

use std::collections::{HashMap, HashSet};

use crate::sem::{
    context::Context,
    error::SemError,
    instance::{Instance, InstanceLocation, Usage},
};

pub fn build_schedule(ctx: &Context) -> Result<Vec<InstanceLocation>, SemError> {
    let processes = process_locations(ctx);
    let writers = collect_writers(ctx, &processes)?;
    check_orphans(ctx, &processes, &writers)?;
    let deps = build_dependencies(ctx, &processes, &writers);
    wavefront_schedule(ctx, &processes, deps)
}

fn process_locations(ctx: &Context) -> Vec<InstanceLocation> {
    ctx.instances
        .iter()
        .enumerate()
        .filter_map(|(i, instance)| matches!(instance, Instance::Process(_)).then_some(InstanceLocation(i)))
        .collect()
}

fn process_usage(ctx: &Context, location: InstanceLocation) -> HashMap<InstanceLocation, Usage> {
    match ctx.get(location) {
        Instance::Process(p) => p.usage.clone(),
        _ => HashMap::new(),
    }
}

fn collect_writers(ctx: &Context, processes: &[InstanceLocation]) -> Result<HashMap<InstanceLocation, InstanceLocation>, SemError> {
    let mut writers: HashMap<InstanceLocation, InstanceLocation> = HashMap::new();
    for &proc_loc in processes {
        for (target, usage) in process_usage(ctx, proc_loc) {
            if usage.is_read() {
                continue;
            }
            if let Some(&existing) = writers.get(&target) {
                if existing != proc_loc {
                    let name = ctx.get(target).name().unwrap_or("<signal>").to_string();
                    return Err(SemError::MultipleWriters {
                        name,
                        at: ctx.get(target).token().clone(),
                        writers: vec![ctx.get(existing).token().clone(), ctx.get(proc_loc).token().clone()],
                    });
                }
            }
            writers.insert(target, proc_loc);
        }
    }
    Ok(writers)
}

/// A signal with no writer among elaborated processes is orphaned unless it
/// belongs to a bus exposed at a program boundary, where an external writer
/// is assumed.
fn check_orphans(
    ctx: &Context,
    processes: &[InstanceLocation],
    writers: &HashMap<InstanceLocation, InstanceLocation>,
) -> Result<(), SemError> {
    for &proc_loc in processes {
        for (target, usage) in process_usage(ctx, proc_loc) {
            if usage.is_write() {
                continue;
            }
            let Instance::Signal(signal) = ctx.get(target) else { continue };
            if writers.contains_key(&target) {
                continue;
            }
            if let Instance::Bus(bus) = ctx.get(signal.bus) {
                if bus.exposed {
                    continue;
                }
            }
            return Err(SemError::OrphanSignal { name: signal.name.clone(), at: signal.token.clone() });
        }
    }
    Ok(())
}

fn build_dependencies(
    ctx: &Context,
    processes: &[InstanceLocation],
    writers: &HashMap<InstanceLocation, InstanceLocation>,
) -> HashMap<InstanceLocation, HashSet<InstanceLocation>> {
    let mut deps: HashMap<InstanceLocation, HashSet<InstanceLocation>> = HashMap::new();
    for &proc_loc in processes {
        deps.entry(proc_loc).or_default();
    }
    for &proc_loc in processes {
        for (target, usage) in process_usage(ctx, proc_loc) {
            if usage.is_write() {
                continue;
            }
            if let Some(&writer) = writers.get(&target) {
                if writer != proc_loc {
                    deps.get_mut(&proc_loc).unwrap().insert(writer);
                }
            }
        }
    }
    deps
}

fn wavefront_schedule(
    ctx: &Context,
    processes: &[InstanceLocation],
    deps: HashMap<InstanceLocation, HashSet<InstanceLocation>>,
) -> Result<Vec<InstanceLocation>, SemError> {
    let mut scheduled = Vec::with_capacity(processes.len());
    let mut remaining: HashSet<InstanceLocation> = processes.iter().copied().collect();

    while !remaining.is_empty() {
        let ready: Vec<InstanceLocation> = processes
            .iter()
            .copied()
            .filter(|p| remaining.contains(p) && deps[p].iter().all(|dependency| !remaining.contains(dependency)))
            .collect();

        if ready.is_empty() {
            let stuck = processes.iter().copied().find(|p| remaining.contains(p)).expect("remaining is non-empty");
            let name = ctx.get(stuck).name().unwrap_or("<process>").to_string();
            return Err(SemError::CircularDependency { name, at: ctx.get(stuck).token().clone() });
        }

        for p in &ready {
            remaining.remove(p);
        }
        scheduled.extend(ready);
    }

    Ok(scheduled)
}
