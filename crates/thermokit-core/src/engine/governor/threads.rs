use std::env;
use tracing::warn;

/// Environment variables whose presence means the process runs under a batch scheduler.
const SCHEDULER_JOB_VARS: [&str; 4] = ["SLURM_JOB_ID", "PBS_JOBID", "SGE_JOB_ID", "LSB_JOBID"];
/// Core allocations reported by the common schedulers, in lookup order.
const SCHEDULER_CORE_VARS: [&str; 5] = [
    "SLURM_CPUS_PER_TASK",
    "SLURM_CPUS_ON_NODE",
    "NCPUS",
    "NSLOTS",
    "LSB_DJOB_NUMPROC",
];

/// What the process knows about the machine and the job it runs in.
pub trait JobEnvironment: Send + Sync {
    fn physical_cores(&self) -> usize;

    /// Cores allocated by a batch scheduler, if one reports them.
    fn scheduler_cores(&self) -> Option<usize>;

    /// Memory allocated by a batch scheduler, in MB.
    fn scheduler_memory_mb(&self) -> Option<u64>;

    fn under_scheduler(&self) -> bool;

    /// Total physical memory, in MB.
    fn system_memory_mb(&self) -> Option<u64>;

    /// Largest thread count that will not oversubscribe the allocation.
    fn safe_max_threads(&self) -> usize {
        self.scheduler_cores()
            .unwrap_or_else(|| self.physical_cores())
            .max(1)
    }
}

/// Reads the live process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemJobEnvironment;

impl JobEnvironment for SystemJobEnvironment {
    fn physical_cores(&self) -> usize {
        num_cpus::get_physical()
    }

    fn scheduler_cores(&self) -> Option<usize> {
        SCHEDULER_CORE_VARS
            .iter()
            .find_map(|var| env_number::<usize>(var))
            .filter(|&n| n > 0)
    }

    fn scheduler_memory_mb(&self) -> Option<u64> {
        if let Some(per_node) = env_number::<u64>("SLURM_MEM_PER_NODE") {
            return Some(per_node);
        }
        let per_cpu = env_number::<u64>("SLURM_MEM_PER_CPU")?;
        let cpus = self.scheduler_cores().unwrap_or(1) as u64;
        Some(per_cpu * cpus)
    }

    fn under_scheduler(&self) -> bool {
        SCHEDULER_JOB_VARS.iter().any(|var| env::var_os(var).is_some())
    }

    fn system_memory_mb(&self) -> Option<u64> {
        let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
        parse_meminfo_total(&meminfo)
    }
}

fn env_number<T: std::str::FromStr>(var: &str) -> Option<T> {
    env::var(var).ok()?.trim().parse().ok()
}

/// `MemTotal:       16318480 kB` → 15936 MB.
pub(crate) fn parse_meminfo_total(meminfo: &str) -> Option<u64> {
    let line = meminfo.lines().find(|l| l.starts_with("MemTotal:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb / 1024)
}

/// Thread counts for the two nested levels of parallelism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadBudget {
    /// Total threads granted to this invocation.
    pub total: usize,
    /// Files processed concurrently.
    pub outer: usize,
    /// Threads each file may use for its own scan.
    pub inner: usize,
}

impl ThreadBudget {
    /// Splits `total` threads between `file_count` concurrent files and their scans.
    pub fn split(total: usize, file_count: usize) -> Self {
        let total = total.max(1);
        let outer = total.min(file_count.max(1));
        let inner = (total / outer).max(1);
        Self {
            total,
            outer,
            inner,
        }
    }
}

/// Outcome of reconciling a requested thread count with the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadDecision {
    pub threads: usize,
    /// Human-readable account of the decision, always present.
    pub notice: String,
    pub downgraded: bool,
}

/// Caps `requested` at the safe maximum; an absent request takes the maximum.
pub fn reconcile_threads(requested: Option<usize>, env: &dyn JobEnvironment) -> ThreadDecision {
    let safe_max = env.safe_max_threads();
    let source = if env.scheduler_cores().is_some() {
        "scheduler-allocated cores"
    } else {
        "physical cores"
    };
    match requested {
        Some(n) if n > safe_max => {
            let notice = format!(
                "Requested {n} threads exceeds the {safe_max} {source}; using {safe_max} threads"
            );
            warn!("{notice}");
            ThreadDecision {
                threads: safe_max,
                notice,
                downgraded: true,
            }
        }
        Some(n) => ThreadDecision {
            threads: n.max(1),
            notice: format!("Using {} of {safe_max} {source}", n.max(1)),
            downgraded: false,
        },
        None => ThreadDecision {
            threads: safe_max,
            notice: format!("Using all {safe_max} {source}"),
            downgraded: false,
        },
    }
}
