use clap::Parser;

#[derive(Debug, Parser)]
pub struct Config {
    #[clap(long, env, default_value_t = String::from("127.0.0.1"))]
    pub host: String,
    #[clap(short, long, env, default_value_t = 7205)]
    pub port: u16,

    /// Set to "development" to show full error messages in responses.
    #[clap(long, env, default_value_t = String::from("production"))]
    pub env: String,

    #[clap(long = "db", env)]
    pub database_url: String,

    #[clap(long, env, default_value_t = 16)]
    pub database_connections: usize,

    #[clap(long, env)]
    pub honeycomb_team: Option<String>,
    #[clap(long, env, default_value_t = String::from("dev"))]
    pub honeycomb_dataset: String,

    #[clap(long, env)]
    pub jaeger_endpoint: Option<String>,

    /// A base64 key of at least 64 bytes, used to sign session cookies.
    #[clap(long, env)]
    pub cookie_key: String,

    #[clap(long, env, default_value_t = String::from("sid"))]
    pub session_cookie_name: String,

    #[clap(long, env, default_value_t = 30)]
    pub session_expire_days: i64,
}
