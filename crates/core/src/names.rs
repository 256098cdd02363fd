//! Metric names and cache classes emitted by the simulator's metrics collector

/// Cycles per instruction, reported per compute unit
pub const CU_CPI: &str = "cu_CPI";
/// Instructions retired, reported per compute unit
pub const CU_INST_COUNT: &str = "cu_inst_count";
/// Busy time of the kernel-time counter
pub const KERNEL_TIME: &str = "kernel_time";

/// Read request served from the cache
pub const READ_HIT: &str = "read-hit";
/// Read request that missed
pub const READ_MISS: &str = "read-miss";
/// Read request merged into an outstanding miss
pub const READ_MSHR_HIT: &str = "read-mshr-hit";
/// Write request served from the cache
pub const WRITE_HIT: &str = "write-hit";
/// Write request merged into an outstanding miss
pub const WRITE_MSHR_HIT: &str = "write-mshr-hit";

/// TLB lookup hit
pub const TLB_HIT: &str = "hit";
/// TLB lookup miss
pub const TLB_MISS: &str = "miss";

/// Private per-compute-unit vector cache
pub const L1V_CACHE: &str = "L1VCache";
/// Shared second-level cache
pub const L2_CACHE: &str = "L2Cache";
/// Per-compute-unit vector TLB
pub const L1V_TLB: &str = "L1VTLB";

/// Metrics listed by the per-class cache report
pub const CACHE_REPORT_METRICS: [&str; 4] = [READ_HIT, READ_MSHR_HIT, WRITE_HIT, WRITE_MSHR_HIT];
