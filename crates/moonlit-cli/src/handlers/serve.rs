//! Serve command handler.

use anyhow::Result;
use moonlit_server::start_server;

use crate::commands::ServeArgs;

/// Run the companion backend until Ctrl-C.
pub async fn execute(args: &ServeArgs) -> Result<()> {
    let config = args.to_config();

    println!();
    println!("  moonlit server starting...");
    println!("  Local:   http://{}:{}", config.host, config.port);
    println!(
        "  Model:   {} via {}",
        config.ollama_model, config.ollama_url
    );
    match &config.static_dir {
        Some(dir) if dir.join("index.html").exists() => {
            println!("  UI:      {}", dir.display());
        }
        Some(dir) => {
            println!("  UI:      not built ({} has no index.html)", dir.display());
        }
        None => println!("  UI:      disabled (--api-only)"),
    }
    println!();

    start_server(config).await
}
