use std::any::Any;

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    // RUST_LOG=sensordump_core=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

/// Routes panics from the capture thread through tracing so the last
/// progress lines and the panic end up in the same log stream.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let current = std::thread::current();
        let thread = current.name().unwrap_or("capture");
        let message = panic_message(info.payload());

        match info.location() {
            Some(loc) => tracing::error!(
                thread,
                file = loc.file(),
                line = loc.line(),
                "capture aborted: {message}"
            ),
            None => tracing::error!(thread, "capture aborted: {message}"),
        }

        if std::env::var_os("RUST_BACKTRACE").is_some() {
            default_hook(info);
        }
    }));
}

pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
