/// Intercept messages using the `log` crate and print them to STDERR, with `info` as the default
/// level. Override with `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn setup() {
    use env_logger::{Builder, Env};
    // Tests and long-lived backends may race to set this up; whoever's first wins.
    let _ = Builder::from_env(Env::default().default_filter_or("info")).try_init();
}
