// Threshold policy for the kill loop

/// Whether another process should be terminated.
///
/// Force mode always says yes; otherwise only while usage is strictly
/// above the limit. Called again after every termination.
pub const fn should_terminate(total_mb: u64, limit_mb: u64, force: bool) -> bool {
    force || total_mb > limit_mb
}
