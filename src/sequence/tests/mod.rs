mod operation;

/// Installs a fmt subscriber honouring `RUST_LOG`; repeated calls are no-ops.
pub(crate) fn trace() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
