use std::time::Instant;

/// Runs backend work inline on the UI thread and logs how long it took.
pub fn run_blocking<F, T>(label: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let started = Instant::now();
    let result = f();
    log::debug!("{label} finished in {:?}", started.elapsed());
    result
}
