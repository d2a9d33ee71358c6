use tokio::runtime::Runtime;
use tollgate::{Gateway, GatewayError};
use tracing_subscriber::EnvFilter;

use crate::prelude::*;

#[derive(Debug, clap::Parser)]
#[command(version, author, about)]
struct Opts {
    /// Log filter, using env_logger-like syntax
    #[arg(long, env = "RUST_LOG")]
    log_filter: Option<String>,

    /// Log request traffic and default to a more detailed log filter
    #[arg(short, long, env, global = true)]
    verbose: bool,

    /// Hint for the number of threads to use
    #[arg(short = 'j', long, env)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Register commands and serve interactions until interrupted
    Serve(crate::bot::BotOpts),
    /// Print version information and exit
    Version,
}

macro_rules! init_error {
    ($($args:tt)*) => ({
        ::tracing::error!($($args)*);
        ::std::process::exit(1);
    })
}

const ENV_FILES: [&str; 3] = [
    ".env.local",
    if cfg!(debug_assertions) {
        ".env.dev"
    } else {
        ".env.prod"
    },
    ".env",
];

fn fmt_layer<S>() -> tracing_subscriber::fmt::Layer<S> { tracing_subscriber::fmt::layer() }

fn load_env() -> Result {
    for path in ENV_FILES {
        match dotenvy::from_filename(path) {
            Ok(p) => trace!("Loaded env from {p:?}"),
            Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => (),
            Err(e) => return Err(e).with_context(|| format!("Error loading env from {path:?}")),
        }
    }

    Ok(())
}

#[instrument(name = "init_logger", skip(log_filter))]
fn init_subscriber(log_filter: &str) {
    let filter = EnvFilter::try_new(log_filter)
        .unwrap_or_else(|e| init_error!("Invalid log filter {log_filter:?}: {e}"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer())
        .try_init()
        .unwrap_or_else(|e| init_error!("Error initializing logger: {e}"));
}

fn build_runtime(threads: Option<usize>) -> Runtime {
    let mut builder = tokio::runtime::Builder::new_multi_thread();

    if let Some(threads) = threads {
        builder
            .worker_threads(threads)
            .max_blocking_threads(threads * 2);
    }

    builder
        .enable_all()
        .build()
        .unwrap_or_else(|e| init_error!("Async runtime setup error: {e}"))
}

fn install_panic_hook() {
    fn payload_str(payload: &(dyn std::any::Any + Send)) -> &str {
        payload
            .downcast_ref::<&'static str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("Box<dyn Any>")
    }

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_hook(info);

        let thread = std::thread::current();
        let location = info.location().map_or_else(String::new, ToString::to_string);

        error!(
            name = thread.name(),
            payload = payload_str(info.payload()),
            %location,
            "Thread panicked!"
        );
    }));
}

#[inline]
pub fn main() {
    let tmp_logger =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(fmt_layer()));
    let span = error_span!("boot").entered();

    load_env().unwrap_or_else(|e| init_error!("Error loading .env files: {e:?}"));

    let opts: Opts = clap::Parser::parse();
    drop(span);
    let span = error_span!("boot", ?opts).entered();

    let default_filter = if opts.verbose { "debug" } else { "info" };
    init_subscriber(opts.log_filter.as_deref().unwrap_or(default_filter));

    drop((span, tmp_logger));

    let rt = build_runtime(opts.threads);
    install_panic_hook();

    std::process::exit(match rt.block_on(run(opts)) {
        Ok(()) => 0,
        Err(e) => {
            error!("{e:?}");
            1
        },
    });
}

fn version_lines() -> Vec<String> {
    vec![
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        format!("tollgate {}", tollgate::VERSION),
        format!("serenity {}", env!("TOLLGATE_BOT_SERENITY_VERSION")),
        format!("axum {}", env!("TOLLGATE_BOT_AXUM_VERSION")),
        format!("tokio {}", env!("TOLLGATE_BOT_TOKIO_VERSION")),
        format!(
            "target {}/{}",
            std::env::consts::OS,
            std::env::consts::ARCH
        ),
    ]
}

fn print_version() {
    for line in version_lines() {
        println!("{line}");
    }
}

/// Resolves with the first termination signal received
#[cfg(unix)]
fn stop_signal() -> Result<impl Future<Output = Result<Option<impl fmt::Debug>>>> {
    use futures_util::stream::FuturesUnordered;
    use tokio::signal::unix::SignalKind;

    let mut stream = [
        SignalKind::hangup(),
        SignalKind::interrupt(),
        SignalKind::quit(),
        SignalKind::terminate(),
    ]
    .into_iter()
    .map(|k| {
        tokio::signal::unix::signal(k)
            .with_context(|| format!("Error hooking signal {k:?}"))
            .map(|mut s| async move {
                s.recv().await;
                Result::<_>::Ok(k)
            })
    })
    .collect::<Result<FuturesUnordered<_>>>()?;

    Ok(async move { stream.next().await.transpose() })
}

/// Resolves with the first termination signal received
#[cfg(not(unix))]
fn stop_signal() -> Result<impl Future<Output = Result<Option<impl fmt::Debug>>>> {
    struct CtrlC;

    impl fmt::Debug for CtrlC {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str("^C") }
    }

    Ok(tokio::signal::ctrl_c()
        .map_ok(|()| Some(CtrlC))
        .map_err(Into::into))
}

enum StopType<S> {
    Signal(S),
    Closed(Result<(), GatewayError>),
}

#[inline]
#[instrument(level = "error", skip(opts))]
async fn run(opts: Opts) -> Result {
    let Opts {
        log_filter: _,
        verbose,
        threads: _,
        command,
    } = opts;

    let bot = match command {
        Command::Serve(bot) => bot,
        Command::Version => {
            print_version();
            return Ok(());
        },
    };

    let registry = crate::bot::registry(bot.guild())?;
    let config = bot.into_config(verbose)?;
    let gateway = Gateway::new(config, registry)
        .await
        .context("Error starting gateway")?;

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = gateway.run(async move {
        stop_rx.await.ok();
    });
    tokio::pin!(server);

    let ret = tokio::select! {
        s = stop_signal()? => StopType::Signal(s),
        r = &mut server => StopType::Closed(r),
    };

    match ret {
        StopType::Signal(Ok(Some(s))) => {
            warn!("{s:?} received, shutting down...");
            drop(stop_tx);
            server.await.context("Error during graceful shutdown")
        },
        StopType::Signal(Ok(None)) => Err(anyhow!("Unexpected error from signal handler")),
        StopType::Signal(Err(e)) => Err(e),
        StopType::Closed(Ok(())) => Err(anyhow!("Server stopped unexpectedly")),
        StopType::Closed(Err(e)) => Err(e).context("Fatal server error occurred"),
    }
}

#[cfg(test)]
mod tests {
    use super::version_lines;

    #[test]
    fn version_lists_libraries() {
        let lines = version_lines();

        assert_eq!(lines[0], concat!("tollgate-bot ", env!("CARGO_PKG_VERSION")));
        for lib in ["tollgate ", "serenity ", "axum ", "tokio ", "target "] {
            assert!(lines.iter().any(|l| l.starts_with(lib)), "{lib:?} missing: {lines:?}");
        }
        assert!(lines[2]["serenity ".len()..].starts_with("0.12."), "{lines:?}");
    }
}
