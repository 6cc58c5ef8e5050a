use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use life_engine::factory::DEFAULT_ALIVE_RATIO;

/// Default cadence of both the simulation tick and the subscriber push.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(500);

/// Tunables shared by every session and subscription.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How often each session advances one generation.
    pub tick_period: Duration,
    /// How often each subscription pushes a frame.
    pub push_period: Duration,
    /// Alive probability used when a create request does not name one.
    pub default_alive_ratio: f64,
    /// Upper bound on `width * height` for a new session.
    pub max_grid_cells: usize,
    /// Upper bound on `cols * rows` for a subscription.
    pub max_viewport_cells: usize,
    /// Close sessions nobody has watched for this long. `None` keeps every
    /// session running until it is closed explicitly.
    pub idle_ttl: Option<Duration>,
    /// How often the idle reaper scans the store.
    pub reap_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_PERIOD,
            push_period: DEFAULT_PERIOD,
            default_alive_ratio: DEFAULT_ALIVE_RATIO,
            max_grid_cells: 64 * 1024 * 1024,
            max_viewport_cells: 2048 * 2048,
            idle_ttl: None,
            reap_interval: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub sessions: SessionConfig,
}

#[derive(Debug, Parser)]
#[command(
    name = "life-server",
    version,
    about = "Shared Game of Life server with live windowed subscriptions"
)]
pub struct Cli {
    /// Address to bind the HTTP/WebSocket listener to.
    #[arg(long, env = "LIFE_LISTEN_ADDR", default_value = "0.0.0.0:50051")]
    pub listen_addr: String,

    /// Simulation tick period in milliseconds.
    #[arg(long, env = "LIFE_TICK_MS", default_value_t = 500)]
    pub tick_ms: u64,

    /// Subscriber push period in milliseconds.
    #[arg(long, env = "LIFE_PUSH_MS", default_value_t = 500)]
    pub push_ms: u64,

    /// Alive probability for newly seeded grids.
    #[arg(long, env = "LIFE_ALIVE_RATIO", default_value_t = DEFAULT_ALIVE_RATIO)]
    pub alive_ratio: f64,

    /// Largest grid (width * height) a client may request.
    #[arg(long, env = "LIFE_MAX_GRID_CELLS", default_value_t = 64 * 1024 * 1024)]
    pub max_grid_cells: usize,

    /// Largest viewport (cols * rows) a subscriber may request.
    #[arg(long, env = "LIFE_MAX_VIEWPORT_CELLS", default_value_t = 2048 * 2048)]
    pub max_viewport_cells: usize,

    /// Close sessions without subscribers after this many seconds. 0 disables.
    #[arg(long, env = "LIFE_IDLE_TTL_SECS", default_value_t = 0)]
    pub idle_ttl_secs: u64,

    /// Interval between idle-session scans.
    #[arg(long, env = "LIFE_REAP_INTERVAL_SECS", default_value_t = 30)]
    pub reap_interval_secs: u64,
}

impl TryFrom<Cli> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let listen_addr: SocketAddr = cli
            .listen_addr
            .parse()
            .with_context(|| format!("invalid listen address: {}", cli.listen_addr))?;
        if cli.tick_ms == 0 || cli.push_ms == 0 {
            bail!("tick and push periods must be at least 1 ms");
        }
        if !(0.0..=1.0).contains(&cli.alive_ratio) {
            bail!("alive ratio must be within [0, 1] (got {})", cli.alive_ratio);
        }
        if cli.reap_interval_secs == 0 {
            bail!("reap interval must be at least 1 s");
        }
        Ok(ServerConfig {
            listen_addr,
            sessions: SessionConfig {
                tick_period: Duration::from_millis(cli.tick_ms),
                push_period: Duration::from_millis(cli.push_ms),
                default_alive_ratio: cli.alive_ratio,
                max_grid_cells: cli.max_grid_cells,
                max_viewport_cells: cli.max_viewport_cells,
                idle_ttl: (cli.idle_ttl_secs > 0).then(|| Duration::from_secs(cli.idle_ttl_secs)),
                reap_interval: Duration::from_secs(cli.reap_interval_secs),
            },
        })
    }
}
