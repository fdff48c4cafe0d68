pub mod stage1_validate;
pub mod stage2_combine;
pub mod stage3_stability;
pub mod stage4_batch;
pub mod stage5_report;

/// Words per scored subset unless overridden on the command line.
pub const DEFAULT_SUBSET_SIZE: usize = 7;
