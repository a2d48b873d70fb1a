use clap::Parser;

/// Command-line and environment configuration for the todo server.
#[derive(Debug, Clone, Parser)]
#[command(name = "todo-server", about = "HTTP API for a single todo list")]
pub struct ServerConfig {
    /// Address to bind.
    #[arg(long, env = "TODO_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind.
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
